//! Background Tasks Module
//!
//! Contains the cache warming scheduler: proactive population of known-hot
//! keys at startup and on a recurring interval.

mod sources;
mod warmer;

pub use sources::{QuerySource, ReferenceDataSource};
pub use warmer::{
    spawn_warming_task, CacheWarmer, SourceOutcome, WarmEntry, WarmReport, WarmSource,
};
