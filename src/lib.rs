//! Library crate for ping-sweep-rs exposing reusable modules.
pub mod client;
pub mod error;
pub mod netdetect;
pub mod probe;
pub mod server;
pub mod sweep;
pub mod types;
pub mod view;
