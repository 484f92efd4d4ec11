pub mod catalog;
pub mod check;
pub mod config;
pub mod error;
pub mod recency;
pub mod resolve;
pub mod target;
pub mod timeutil;

pub use error::{Error, Result};
