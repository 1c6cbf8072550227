pub mod app;
pub mod constants;
pub mod domain;
pub mod error;
pub mod infra;
pub mod logging;
pub mod pipeline;

pub use error::{PrepError, Result};
