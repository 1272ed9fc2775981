//! Marker reconciliation against viewport pan and zoom.
//!
//! Zooming around a point other than the exact centre shifts the reported
//! centre while the gesture runs. [`ViewportReconciler`] ignores `move` events
//! during a zoom gesture so the marker stays on its anchor, and schedules one
//! debounced re-centre towards the anchor once `zoom` events go quiet.
//!
//! The reconciler is clock-agnostic: callers pass the current [`Instant`] and
//! poll [`ViewportReconciler::take_due_recenter`] when the deadline from
//! [`ViewportReconciler::recenter_deadline`] passes.

use std::time::{Duration, Instant};

use geo::Coord;

/// Quiescence window for `zoom` events before re-centring.
pub const RECENTER_DEBOUNCE: Duration = Duration::from_millis(70);

/// Gesture state of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZoomPhase {
    /// No zoom gesture is running; moves track the centre.
    #[default]
    Idle,
    /// A zoom gesture is running; moves are ignored.
    ZoomActive,
}

/// Tracks the marker, the anchor it is pinned to, and the pending re-centre.
///
/// # Examples
/// ```
/// use std::time::{Duration, Instant};
/// use geo::Coord;
/// use trailsnap_core::ViewportReconciler;
///
/// let start = Coord { x: 76.889709, y: 43.238949 };
/// let mut viewport = ViewportReconciler::new(start);
///
/// viewport.on_zoom_start();
/// assert_eq!(viewport.on_move(Coord { x: 76.9, y: 43.3 }), None);
/// viewport.on_zoom_end();
/// assert_eq!(viewport.marker(), start);
///
/// let now = Instant::now();
/// viewport.on_zoom(now);
/// assert_eq!(viewport.take_due_recenter(now), None);
/// assert_eq!(viewport.take_due_recenter(now + Duration::from_millis(70)), Some(start));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ViewportReconciler {
    phase: ZoomPhase,
    anchor: Coord<f64>,
    marker: Coord<f64>,
    debounce: Duration,
    deadline: Option<Instant>,
}

impl ViewportReconciler {
    /// Start idle with marker and anchor at `center`.
    #[must_use]
    pub const fn new(center: Coord<f64>) -> Self {
        Self {
            phase: ZoomPhase::Idle,
            anchor: center,
            marker: center,
            debounce: RECENTER_DEBOUNCE,
            deadline: None,
        }
    }

    /// Override the quiescence window.
    #[must_use]
    pub const fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Handle `zoomstart`.
    pub const fn on_zoom_start(&mut self) {
        self.phase = ZoomPhase::ZoomActive;
    }

    /// Handle `zoomend`.
    pub const fn on_zoom_end(&mut self) {
        self.phase = ZoomPhase::Idle;
    }

    /// Handle one `zoom` frame observed at `now`.
    ///
    /// Each frame pushes the re-centre deadline to `now + debounce`, so only
    /// the last frame of a burst leads to a re-centre.
    pub fn on_zoom(&mut self, now: Instant) {
        self.deadline = Some(now + self.debounce);
    }

    /// Handle `move` to `center`.
    ///
    /// Returns the new marker position, or `None` when the event is ignored
    /// because a zoom gesture is running.
    pub const fn on_move(&mut self, center: Coord<f64>) -> Option<Coord<f64>> {
        match self.phase {
            ZoomPhase::ZoomActive => None,
            ZoomPhase::Idle => {
                self.marker = center;
                self.anchor = center;
                Some(center)
            }
        }
    }

    /// Pending re-centre deadline, if a zoom burst is waiting to settle.
    #[must_use]
    pub const fn recenter_deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Consume the pending re-centre once its deadline has passed.
    ///
    /// Returns the anchor as it is at `now`, not as it was when the deadline
    /// was armed.
    pub fn take_due_recenter(&mut self, now: Instant) -> Option<Coord<f64>> {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                Some(self.anchor)
            }
            _ => None,
        }
    }

    /// Current gesture phase.
    #[must_use]
    pub const fn phase(&self) -> ZoomPhase {
        self.phase
    }

    /// Whether a zoom gesture is running.
    #[must_use]
    pub const fn zoom_in_progress(&self) -> bool {
        matches!(self.phase, ZoomPhase::ZoomActive)
    }

    /// Last stable centre.
    #[must_use]
    pub const fn anchor(&self) -> Coord<f64> {
        self.anchor
    }

    /// Current marker position.
    #[must_use]
    pub const fn marker(&self) -> Coord<f64> {
        self.marker
    }
}
