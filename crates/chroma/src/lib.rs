//! callnotes Chroma integration
//!
//! Thin HTTP client for a running Chroma server and a launcher for a local one

mod client;
mod launcher;
mod types;

pub use client::ChromaClient;
pub use launcher::{ServerLauncher, INSTALL_HINTS};
pub use types::{Collection, GetRequest, GetResponse, Include, Metadata, Record};
