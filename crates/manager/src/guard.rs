use vault_manager_core::error::ManagerError;

/// Capability check invoked at the top of every state-changing operation.
///
/// One owner and one admin per instance; there is no delegation.
#[derive(Debug, Clone)]
pub struct RoleGate {
    owner: String,
    admin: String,
}

impl RoleGate {
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // String cannot be used in const fn
    pub fn new(owner: String, admin: String) -> Self {
        Self { owner, admin }
    }

    /// # Errors
    /// `Unauthorized` unless `caller` is the owner.
    pub fn ensure_owner(&self, caller: &str) -> Result<(), ManagerError> {
        if caller == self.owner {
            Ok(())
        } else {
            Err(ManagerError::Unauthorized {
                caller: caller.to_string(),
                required: "owner",
            })
        }
    }

    /// # Errors
    /// `Unauthorized` unless `caller` is the admin.
    pub fn ensure_admin(&self, caller: &str) -> Result<(), ManagerError> {
        if caller == self.admin {
            Ok(())
        } else {
            Err(ManagerError::Unauthorized {
                caller: caller.to_string(),
                required: "admin",
            })
        }
    }

    /// # Errors
    /// `Unauthorized` unless `caller` is the owner or the admin.
    pub fn ensure_owner_or_admin(&self, caller: &str) -> Result<(), ManagerError> {
        if caller == self.owner || caller == self.admin {
            Ok(())
        } else {
            Err(ManagerError::Unauthorized {
                caller: caller.to_string(),
                required: "owner or admin",
            })
        }
    }
}
