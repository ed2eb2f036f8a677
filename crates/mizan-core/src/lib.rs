pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod risk;
pub mod types;

pub use error::{AssessError, AssessResult};
pub use types::*;
