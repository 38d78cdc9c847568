pub mod executor;

pub use executor::AtomicExecutor;
