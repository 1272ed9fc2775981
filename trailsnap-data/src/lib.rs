//! Adapters connecting the trailsnap pipeline to external services.
//!
//! Responsibilities:
//! - Implement [`trailsnap_core::MapMatcher`] over HTTP.
//! - Decode service payloads into core types.
//!
//! Boundaries:
//! - Do not encode pipeline rules (live in `trailsnap-core` and
//!   `trailsnap-session`).
//! - Never log or surface the access token.

#![forbid(unsafe_code)]

pub mod matching;

pub use matching::{
    DEFAULT_USER_AGENT, HttpMapMatcher, HttpMapMatcherConfig, HttpMatcherBuildError,
};
