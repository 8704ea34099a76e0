pub mod hash_cache;
pub mod pattern_cache;

pub use hash_cache::HashCache;
pub use pattern_cache::PatternCache;
