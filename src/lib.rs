//! Learning-progress tracker for technologies.
//!
//! The [`store::TechnologyStore`] owns the collection of [`models::Technology`]
//! records, persists it through [`db::Storage`] after every change, and
//! imports or exports it as JSON.

pub mod config;
pub mod db;
pub mod error;
pub mod ids;
pub mod models;
pub mod render;
pub mod store;
pub mod validation;
