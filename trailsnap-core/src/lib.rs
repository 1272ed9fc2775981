//! Core domain types for the trailsnap map-matching pipeline.
//!
//! A user draws a path on a map; the path is snapped onto the road network by
//! a map-matching service and the snapped route is rendered as a single line
//! overlay while a centre marker follows the viewport. This crate holds the
//! renderer-agnostic pieces of that pipeline:
//!
//! - [`draw`] extracts the active drawn path from the drawing tool's features.
//! - [`matching`] builds match requests and defines the [`MapMatcher`] seam.
//! - [`overlay`] replaces the rendered route idempotently on a [`MapSurface`].
//! - [`instructions`] renders the trip summary into a [`TextRegion`].
//! - [`viewport`] keeps the marker pinned during zoom gestures.
//!
//! Map rendering, network transport and UI chrome are external collaborators
//! expressed as traits, so the crate has no I/O of its own.

#![forbid(unsafe_code)]

pub mod alert;
pub mod draw;
pub mod instructions;
pub mod matching;
pub mod overlay;
pub mod style;
pub mod viewport;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use alert::AlertSink;
pub use draw::{DrawnFeature, DrawnFeatures, DrawnPath, ExtractionError, FeatureId};
pub use instructions::{InstructionPanel, TextRegion};
pub use matching::{
    DEFAULT_RADIUS_METRES, MATCHING_ERRORS_DOC_URL, MapMatcher, MatchError, MatchRequest,
    MatchRequestError, MatchedRoute, Profile, ProfileParseError,
};
pub use overlay::{LineLayer, MapSurface, ROUTE_OVERLAY_ID, RouteLayerManager, SurfaceError};
pub use style::{DrawStyle, RouteLineStyle};
pub use viewport::{RECENTER_DEBOUNCE, ViewportReconciler, ZoomPhase};
