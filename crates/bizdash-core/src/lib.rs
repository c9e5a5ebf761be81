pub mod cache;
pub mod calendar;
pub mod config;
pub mod error;
pub mod io;
pub mod parse;
pub mod paths;
pub mod record;
pub mod repository;
pub mod store;
pub mod summary;
pub mod types;
pub mod week;

pub use error::{DashError, Result};
