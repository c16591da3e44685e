pub mod api;
pub mod message;
pub mod signature;
pub mod webhook;
