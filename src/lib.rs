// Lorecache - client-side caching core for the card gallery web app

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod logging;
pub mod offline;
