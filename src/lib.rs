pub mod data;
pub mod error;
pub mod io;
pub mod miner;
pub mod pattern;
pub mod store;

pub use data::{Item, Count, Tid, Transaction, Database, VerticalDatabase, Tidset, MinSupport, FrequentItem, FrequentItems};
pub use error::MineError;
pub use miner::{Miner, ClosedMiner, MinerConfig, MiningResult, MiningStatistics, CancellationToken, StopReason, mine_closed_patterns};
pub use pattern::Pattern;
pub use store::ClosedPatternStore;

/// Objects that can be recorded in the log
pub trait Loggable {
    fn log( &self, message: &str, level: tracing::Level );
}
