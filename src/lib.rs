mod error;
pub use error::*;

pub mod api;
pub mod cli;
pub mod crypto;
pub mod database;
pub mod memory;
pub mod models;
pub mod service;
pub mod store;
