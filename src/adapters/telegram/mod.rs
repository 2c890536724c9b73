//! Telegram adapters (grammers). Auth and delivery share one client.

pub mod auth_adapter;
pub mod client;
pub mod session;

pub use auth_adapter::GrammersAuthAdapter;
pub use client::GrammersDeliveryGateway;
