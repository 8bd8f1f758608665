//! Core data model: raw attachments, parsed emails, extraction results, and
//! persisted records.

pub mod attachment;
pub mod extraction;
pub mod mail;
pub mod record;
