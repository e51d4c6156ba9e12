//! API route handlers

pub mod events;
pub mod health;
pub mod items;
pub mod payloads;
