//! The background synchronization engine.

pub mod enrich;
pub mod interval;
pub mod job;
pub mod runner;

pub use enrich::{EnrichmentPipeline, PipelineReport};
pub use interval::{IntervalPolicy, ScheduleRequest};
pub use job::{SyncDeps, SyncJob};
pub use runner::{SyncLoopHandle, TimerScheduler, spawn_sync_loop};
