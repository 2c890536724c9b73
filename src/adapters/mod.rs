//! Infrastructure adapters. Implement outbound ports.
//!
//! Telegram, grammar services, filesystem, terminal. Map errors to DomainError.

pub mod delivery;
pub mod dictation;
pub mod grammar;
pub mod persistence;
pub mod telegram;
pub mod ui;
