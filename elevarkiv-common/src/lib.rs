//! # Elevarkiv Common Library
//!
//! Shared code for the elevarkiv services including:
//! - Error types
//! - Configuration loading
//! - School-year calculations (audit-log partition boundaries)
//! - Database initialization

pub mod config;
pub mod db;
pub mod error;
pub mod school_year;

pub use error::{Error, Result};
pub use school_year::{current_school_year, school_year_for};
