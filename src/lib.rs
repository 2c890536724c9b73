//! tg-dictate: dictate, correct, and send Telegram messages with Hexagonal Architecture.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod shared;
pub mod usecases;
