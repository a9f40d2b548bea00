pub mod aggregator;
pub mod correlation;
pub mod statistics;
