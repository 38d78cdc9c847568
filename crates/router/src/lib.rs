pub mod router;

pub use router::{SwapRouter, SLIPPAGE_TOLERANCE_BPS, STABLE_BIAS_BPS, SWAP_DEADLINE_SECS};
