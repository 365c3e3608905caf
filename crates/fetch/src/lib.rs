// ABOUTME: Main library entry point for fetching boon pages and image assets.
// ABOUTME: Re-exports the public API: Client, ClientBuilder, FetchError, ErrorCode, ImageResolver.

//! Fetching for the boon compendium.
//!
//! This crate fetches source wiki pages over HTTP and downloads the images
//! their tables reference, at most once per canonical image URL.
//!
//! # Example
//!
//! ```no_run
//! use compendium_fetch::{Client, FetchError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), FetchError> {
//!     let client = Client::builder().build()?;
//!     let page = client
//!         .fetch_page("https://hades.fandom.com/wiki/Zeus/Boons_(Hades)")
//!         .await?;
//!     println!("{} bytes", page.len());
//!     Ok(())
//! }
//! ```

pub mod assets;
pub mod client;
pub mod error;
pub mod options;
pub mod resource;

pub use crate::assets::{
    plan_requests, AssetOutcome, AssetRequest, ImageResolver, DEFAULT_CONCURRENCY,
};
pub use crate::client::Client;
pub use crate::error::{ErrorCode, FetchError, OP_FETCH_IMAGE, OP_FETCH_PAGE};
pub use crate::options::{ClientBuilder, Options, DEFAULT_USER_AGENT};
