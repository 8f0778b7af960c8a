pub mod ack;
pub mod adapter;
pub mod admin;
pub mod commands;
pub mod error;
pub mod handler;
pub mod send;

pub use adapter::DiscordAdapter;
pub use error::DiscordError;
