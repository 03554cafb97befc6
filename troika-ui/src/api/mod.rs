//! Backend access for the dashboard views

pub mod client;
pub mod download;

pub use client::*;
pub use download::trigger_download;
