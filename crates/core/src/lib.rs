pub mod batch;
pub mod config;
pub mod config_loader;
pub mod error;
pub mod events;
pub mod fees;
pub mod position;
pub mod traits;

pub use batch::{TransferStep, VaultAction, VaultBatch};
pub use config::{FeeConfig, ManagerConfig};
pub use config_loader::ConfigLoader;
pub use error::{ErrorKind, ManagerError};
pub use events::{DepositReceipt, LedgerEvent, RebalanceReceipt, SwapSummary, WithdrawReceipt};
pub use fees::{fee_split, FeeLedger, FeePolicy, FeeSplit, BPS_DENOMINATOR, MAX_FEE_BPS};
pub use position::Position;
pub use traits::{BatchExecutor, LiquidityVenue, VaultVenue};
