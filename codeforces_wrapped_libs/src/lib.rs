pub mod api;
pub mod cache;
pub mod codeforces;
pub mod stats;
pub mod wrapped;

pub use cache::{CacheKey, ResponseCache};
pub use stats::{StatsAggregator, WrappedStats};
pub use wrapped::{WrappedError, WrappedGenerator};
