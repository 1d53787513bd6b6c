//! Client for the imgcdn image caching service
//!
//! Asks the service to materialize size variants of a source image and
//! picks the variant matching a requested size label.
//!
//! # Example
//!
//! ```no_run
//! use imgcdn_client::ImgcdnClient;
//!
//! # async fn example() {
//! let client = ImgcdnClient::new("http://localhost:8080", "123456789");
//!
//! // Returns the display URL for the large variant, or None if the
//! // image could not be cached
//! let url = client
//!     .display_url(
//!         "https://images.pexels.com/photos/1089930/pexels-photo-1089930.jpeg",
//!         "large",
//!     )
//!     .await;
//!
//! match url {
//!     Some(url) => println!("<img src=\"{}\">", url),
//!     None => println!("Image not available"),
//! }
//! # }
//! ```

mod client;
mod error;
mod types;

pub use client::{select_variant, ImgcdnClient};
pub use error::{ImgcdnError, Result};
pub use types::CacheUrlResponse;
