//! Idempotent replacement of the rendered route overlay.
//!
//! The route is drawn as one source plus one line layer sharing a fixed
//! identifier. Rendering replaces any previous pair instead of appending, and
//! removal always takes the layer down before the source it references.

use geo::{Coord, LineString};
use log::debug;
use thiserror::Error;

use crate::{DrawStyle, RouteLineStyle};

/// Identifier shared by the route source and its layer.
pub const ROUTE_OVERLAY_ID: &str = "route";

/// A line layer bound to a geometry source.
#[derive(Debug, Clone, PartialEq)]
pub struct LineLayer {
    /// Layer identifier.
    pub id: String,
    /// Identifier of the source the layer draws.
    pub source: String,
    /// Paint and layout.
    pub style: RouteLineStyle,
}

/// Errors reported by a [`MapSurface`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SurfaceError {
    /// A source with this identifier already exists.
    #[error("source {id:?} already exists")]
    DuplicateSource {
        /// Offending identifier.
        id: String,
    },
    /// A layer with this identifier already exists.
    #[error("layer {id:?} already exists")]
    DuplicateLayer {
        /// Offending identifier.
        id: String,
    },
    /// The referenced source does not exist.
    #[error("source {id:?} does not exist")]
    MissingSource {
        /// Offending identifier.
        id: String,
    },
    /// The referenced layer does not exist.
    #[error("layer {id:?} does not exist")]
    MissingLayer {
        /// Offending identifier.
        id: String,
    },
    /// A source cannot be removed while a layer still draws it.
    #[error("source {id:?} is still used by layer {layer:?}")]
    SourceInUse {
        /// Source identifier.
        id: String,
        /// Layer still referencing the source.
        layer: String,
    },
    /// The rendering backend rejected the call.
    #[error("map surface rejected the operation: {message}")]
    Backend {
        /// Backend-specific description.
        message: String,
    },
}

/// The slice of a map renderer the pipeline drives.
///
/// Implementations wrap a real renderer or, in tests and the CLI, a headless
/// recording of the calls made.
pub trait MapSurface {
    /// Whether a source with `id` exists.
    fn has_source(&self, id: &str) -> bool;
    /// Whether a layer with `id` exists.
    fn has_layer(&self, id: &str) -> bool;
    /// Add a line geometry source.
    ///
    /// # Errors
    ///
    /// Fails when the identifier is taken or the backend rejects the data.
    fn add_source(&mut self, id: &str, geometry: &LineString<f64>) -> Result<(), SurfaceError>;
    /// Add a line layer drawing an existing source.
    ///
    /// # Errors
    ///
    /// Fails when the identifier is taken or the source is missing.
    fn add_line_layer(&mut self, layer: &LineLayer) -> Result<(), SurfaceError>;
    /// Remove a layer.
    ///
    /// # Errors
    ///
    /// Fails when the layer is missing.
    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError>;
    /// Remove a source that no layer references.
    ///
    /// # Errors
    ///
    /// Fails when the source is missing or still referenced.
    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError>;
    /// Move the centre marker.
    fn set_marker(&mut self, position: Coord<f64>);
    /// Animate the viewport towards `center`.
    fn ease_to(&mut self, center: Coord<f64>);
    /// Apply drawing-tool styling.
    fn configure_drawing(&mut self, style: &DrawStyle);
}

/// Renders and removes the single route overlay.
///
/// At most one source/layer pair with the managed identifier exists on the
/// surface after any call returns successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLayerManager {
    id: String,
    style: RouteLineStyle,
}

impl Default for RouteLayerManager {
    fn default() -> Self {
        Self::new(RouteLineStyle::default())
    }
}

impl RouteLayerManager {
    /// Manage the overlay under [`ROUTE_OVERLAY_ID`] with `style`.
    #[must_use]
    pub fn new(style: RouteLineStyle) -> Self {
        Self {
            id: ROUTE_OVERLAY_ID.to_owned(),
            style,
        }
    }

    /// Identifier of the managed source and layer.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Replace the overlay with `geometry`.
    ///
    /// # Errors
    ///
    /// Propagates the first surface failure; the overlay may then be absent
    /// but is never duplicated.
    pub fn render<S>(&self, surface: &mut S, geometry: &LineString<f64>) -> Result<(), SurfaceError>
    where
        S: MapSurface + ?Sized,
    {
        self.remove(surface)?;
        surface.add_source(&self.id, geometry)?;
        surface.add_line_layer(&LineLayer {
            id: self.id.clone(),
            source: self.id.clone(),
            style: self.style.clone(),
        })
    }

    /// Remove the overlay if present; returns whether anything was removed.
    ///
    /// # Errors
    ///
    /// Propagates surface failures. Absence is not an error.
    pub fn remove<S>(&self, surface: &mut S) -> Result<bool, SurfaceError>
    where
        S: MapSurface + ?Sized,
    {
        let mut removed = false;
        if surface.has_layer(&self.id) {
            surface.remove_layer(&self.id)?;
            removed = true;
        }
        if surface.has_source(&self.id) {
            surface.remove_source(&self.id)?;
            removed = true;
        }
        if !removed {
            debug!("no {} overlay to remove", self.id);
        }
        Ok(removed)
    }
}
