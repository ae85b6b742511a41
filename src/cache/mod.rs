// Request cache module

mod entry;
mod key;
mod stats;
mod store;
mod ttl;

pub use entry::CacheEntry;
pub use key::CacheKey;
pub use stats::CacheStats;
pub use store::{Lookup, RequestCache};
pub use ttl::{TtlClass, TtlPolicy};
