pub mod guard;
pub mod ledger;
pub mod whitelist;

pub use guard::RoleGate;
pub use ledger::PositionLedger;
pub use whitelist::VenueWhitelist;
