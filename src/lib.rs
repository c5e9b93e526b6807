pub mod cache;
pub mod chart;
pub mod config;
pub mod error;
pub mod fetch;
pub mod output;
pub mod pipeline;
pub mod series;
pub mod sources;
pub mod table;

pub use error::{Error, Result};
