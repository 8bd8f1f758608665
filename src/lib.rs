//! `mailbrief` — extract text from email attachments and summarize each
//! message.
//!
//! This crate provides the core library: reading `.eml` messages, routing
//! every attachment through a format-detecting extraction pipeline,
//! summarizing the result, and persisting one JSON record per email.

pub mod config;
pub mod error;
pub mod extract;
pub mod model;
pub mod parser;
pub mod process;
pub mod store;
pub mod summarize;
