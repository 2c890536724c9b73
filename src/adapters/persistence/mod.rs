//! Persistence adapters. Contact storage.

pub mod contacts_json;

pub use contacts_json::JsonContactDirectory;
