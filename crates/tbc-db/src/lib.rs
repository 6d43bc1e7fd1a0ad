//! TBC Database Library
//!
//! PostgreSQL repositories for users, podcasts and sermons.

pub mod db;

pub use db::*;
