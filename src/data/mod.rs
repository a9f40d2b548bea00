pub mod catalog;
pub mod dataset;
pub mod datetime;
pub mod loader;
pub mod parser;
pub mod schema;
pub mod value;
