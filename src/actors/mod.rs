pub mod refresh_worker;

pub use refresh_worker::{RefreshCounters, RefreshMessage, RefreshStats, RefreshWorker, RefreshWorkerArgs};
