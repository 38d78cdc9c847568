use crate::config::ManagerConfig;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Toml},
    Figment,
};

pub struct ConfigLoader;

impl ConfigLoader {
    /// Loads manager configuration by merging TOML and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed, or
    /// if the merged configuration violates policy bounds.
    pub fn load() -> Result<ManagerConfig> {
        let config: ManagerConfig = Figment::new()
            .merge(Toml::file("config/Manager.toml"))
            .merge(Env::prefixed("VAULT_"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }

    /// Loads manager configuration with a specific profile.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration files cannot be read or parsed, or
    /// if the merged configuration violates policy bounds.
    pub fn load_with_profile(profile: &str) -> Result<ManagerConfig> {
        let config: ManagerConfig = Figment::new()
            .merge(Toml::file("config/Manager.toml"))
            .merge(Toml::file(format!("config/Manager.{profile}.toml")))
            .merge(Env::prefixed("VAULT_"))
            .extract()?;

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    const BASE_TOML: &str = r#"
        base_asset = "USDC"
        self_address = "0xmanager"
        owner = "0xowner"
        admin = "0xadmin"
        min_initial_deposit = 1000
        rebalance_cooldown_secs = 86400
        rebalance_fee_bps = 500

        [fee]
        rate_bps = 300
        min_profit_threshold = 10
        recipient = "0xtreasury"
    "#;

    #[test]
    fn load_merges_file_and_env_overrides() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Manager.toml", BASE_TOML)?;
            jail.set_env("VAULT_ADMIN", "0xrotated");

            let config = ConfigLoader::load().expect("merged config loads");
            assert_eq!(config.base_asset, "USDC");
            assert_eq!(config.admin, "0xrotated");
            assert_eq!(config.fee.rate_bps, 300);
            assert_eq!(config.rebalance_cooldown_secs, 86400);
            Ok(())
        });
    }

    #[test]
    fn profile_file_overrides_the_base_file() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file("config/Manager.toml", BASE_TOML)?;
            jail.create_file("config/Manager.staging.toml", "rebalance_fee_bps = 250")?;

            let config = ConfigLoader::load_with_profile("staging").expect("profile loads");
            assert_eq!(config.rebalance_fee_bps, 250);
            assert_eq!(config.fee.rate_bps, 300);
            Ok(())
        });
    }

    #[test]
    fn load_rejects_a_fee_rate_above_the_cap() {
        Jail::expect_with(|jail| {
            jail.create_dir("config")?;
            jail.create_file(
                "config/Manager.toml",
                &BASE_TOML.replace("rate_bps = 300", "rate_bps = 5000"),
            )?;

            assert!(ConfigLoader::load().is_err());
            Ok(())
        });
    }
}
