//! HTTP API client for the flows service

mod client;
mod flows;
mod retry;

pub use client::*;
pub use flows::*;
pub use retry::*;
