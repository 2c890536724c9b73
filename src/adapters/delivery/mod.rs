//! Delivery adapters that do not need Telegram.

pub mod dry_run;

pub use dry_run::DryRunGateway;
