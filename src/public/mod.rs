//! Public (unauthenticated) Mercado Bitcoin data API client.

mod client;
mod types;

pub use client::PublicClient;
pub use types::DaySummary;
