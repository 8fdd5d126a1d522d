//! # Parallel Module
//!
//! Coordinamento dell'esecuzione parallela, separato in sottomoduli:
//! - `partition`: Suddivisione round-robin dei job in shard
//! - `worker`: Esecuzione sequenziale dei job di uno shard
//! - `completion`: Contatore degli shard in corso e callback di fine
//! - `coordinator`: Avvio concorrente degli shard e propagazione errori fatali
//! - `progress_tracker`: Progress condiviso tra gli shard

pub mod completion;
pub mod coordinator;
pub mod partition;
pub mod progress_tracker;
pub mod worker;

pub use completion::CompletionState;
pub use coordinator::{Coordinator, RunSummary};
pub use partition::{partition, Shard};
pub use progress_tracker::ProgressTracker;
pub use worker::{ShardSummary, WorkerExecutor};
