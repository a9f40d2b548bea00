pub mod column_stats;
pub mod envelope;
pub mod ordered;
pub mod store;
