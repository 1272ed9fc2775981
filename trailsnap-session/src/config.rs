//! Session configuration.

use std::time::Duration;

use geo::Coord;
use trailsnap_core::{DrawStyle, Profile, RECENTER_DEBOUNCE, RouteLineStyle};

/// Initial map centre: Almaty, as longitude/latitude.
pub const DEFAULT_CENTER: Coord<f64> = Coord {
    x: 76.889_709,
    y: 43.238_949,
};

/// Initial zoom level.
pub const DEFAULT_ZOOM: f64 = 12.0;

/// Deadline applied to each map-matching call.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Settings for a [`crate::Session`].
#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    /// Map centre and marker position at start.
    pub initial_center: Coord<f64>,
    /// Zoom level the embedding renderer opens at.
    pub initial_zoom: f64,
    /// Travel profile for match requests.
    pub profile: Profile,
    /// Deadline for each match request; expiry is reported like any other
    /// failed match.
    pub request_timeout: Duration,
    /// Quiescence window before re-centring after zoom frames.
    pub recenter_debounce: Duration,
    /// Paint of the route overlay.
    pub route_style: RouteLineStyle,
    /// Drawing-tool styling applied on start.
    pub draw_style: DrawStyle,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            initial_center: DEFAULT_CENTER,
            initial_zoom: DEFAULT_ZOOM,
            profile: Profile::default(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
            recenter_debounce: RECENTER_DEBOUNCE,
            route_style: RouteLineStyle::default(),
            draw_style: DrawStyle::default(),
        }
    }
}

impl SessionConfig {
    /// Set the travel profile.
    #[must_use]
    pub const fn with_profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    /// Set the per-request deadline.
    #[must_use]
    pub const fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the initial centre.
    #[must_use]
    pub const fn with_initial_center(mut self, center: Coord<f64>) -> Self {
        self.initial_center = center;
        self
    }
}
