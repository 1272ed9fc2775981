//! Events consumed by a session.

use geo::Coord;
use trailsnap_core::{DrawnFeature, FeatureId};

/// An input from the drawing tool or the map viewport.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// Features were drawn.
    DrawCreate(Vec<DrawnFeature>),
    /// Existing features were edited.
    DrawUpdate(Vec<DrawnFeature>),
    /// Features were deleted.
    DrawDelete(Vec<FeatureId>),
    /// A zoom gesture started.
    ZoomStart,
    /// A zoom gesture ended.
    ZoomEnd,
    /// One zoom animation frame.
    Zoom,
    /// The viewport centre moved.
    Move(Coord<f64>),
}

#[derive(Debug)]
pub(crate) enum Command {
    Event(SessionEvent),
    Settle(tokio::sync::oneshot::Sender<()>),
    Shutdown,
}
