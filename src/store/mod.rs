//! Persisted per-email results.

pub mod results;

pub use results::ResultStore;
