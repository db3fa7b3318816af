//! svcbind SDK - Rust Client Library
//!
//! Calls methods of a service exposed through `svcbind-api-rpc` and fetches
//! its signature document.
//!
//! # Example
//!
//! ```no_run
//! use serde::{Deserialize, Serialize};
//! use svcbind_sdk::ServiceClient;
//!
//! #[derive(Serialize, Deserialize)]
//! struct Echo {
//!     message: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ServiceClient::connect("http://127.0.0.1:2000").await?;
//!
//!     let reply: Echo = client
//!         .invoke("echo", &Echo { message: "hi".to_string() })
//!         .await?;
//!     println!("{}", reply.message);
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;

pub use client::{ServiceClient, DEFAULT_SIGNATURE_METHOD};
pub use error::{Result, SdkError};
