pub mod client;
pub mod model;

pub use client::PocketClient;
