//! HTTP map matching against a Mapbox-compatible Map Matching API.
//!
//! [`HttpMapMatcher`] implements [`trailsnap_core::MapMatcher`] by issuing one
//! `GET` request per drawn path and decoding the first matching of the
//! response. Requests are never retried: every failure is classified as a
//! [`trailsnap_core::MatchError`] and returned to the caller.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//! use geo::Coord;
//! use trailsnap_core::{DrawnPath, MapMatcher, MatchRequest, Profile};
//! use trailsnap_data::matching::{HttpMapMatcher, HttpMapMatcherConfig};
//!
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! let config = HttpMapMatcherConfig::new("pk.example-token")
//!     .with_timeout(Duration::from_secs(10));
//! let matcher = HttpMapMatcher::with_config(config)?;
//!
//! let path = DrawnPath::new(vec![
//!     Coord { x: 76.9, y: 43.24 },
//!     Coord { x: 76.91, y: 43.25 },
//! ])?;
//! let route = matcher
//!     .match_path(&MatchRequest::new(path, Profile::Driving))
//!     .await?;
//! println!("{} s", route.duration.as_secs());
//! # Ok(())
//! # }
//! ```

mod client;
mod response;

#[doc(hidden)]
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use client::{DEFAULT_USER_AGENT, HttpMapMatcher, HttpMapMatcherConfig, HttpMatcherBuildError};
