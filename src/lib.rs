//! Facade crate for the trailsnap route-snapping toolkit.
//!
//! This crate re-exports the core domain types and exposes the HTTP matcher
//! and the session task behind feature flags.

#![forbid(unsafe_code)]

pub use trailsnap_core::{
    AlertSink, DrawStyle, DrawnFeature, DrawnFeatures, DrawnPath, ExtractionError, FeatureId,
    InstructionPanel, LineLayer, MapMatcher, MapSurface, MatchError, MatchRequest, MatchedRoute,
    Profile, ROUTE_OVERLAY_ID, RouteLayerManager, RouteLineStyle, SurfaceError, TextRegion,
    ViewportReconciler,
};

#[cfg(feature = "test-support")]
pub use trailsnap_core::test_support;

#[cfg(feature = "http")]
pub use trailsnap_data::{HttpMapMatcher, HttpMapMatcherConfig, HttpMatcherBuildError};

#[cfg(feature = "session")]
pub use trailsnap_session::{
    EventSender, SessionBuilder, SessionConfig, SessionError, SessionEvent, SessionHandle,
    SessionParts,
};
