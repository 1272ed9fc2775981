//! Recording doubles for the map surface, text region and alert sink.
//!
//! Each double keeps its state behind an `Arc<Mutex<_>>`, so a test can hand
//! one clone to the code under test and inspect another.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use geo::{Coord, LineString};

use crate::{AlertSink, DrawStyle, LineLayer, MapSurface, SurfaceError, TextRegion};

/// A mutating call observed by [`RecordingSurface`].
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceOp {
    /// `add_source` with the given identifier.
    AddSource(String),
    /// `add_line_layer` with the given identifier.
    AddLayer(String),
    /// `remove_layer` with the given identifier.
    RemoveLayer(String),
    /// `remove_source` with the given identifier.
    RemoveSource(String),
    /// `set_marker` with the given position.
    SetMarker(Coord<f64>),
    /// `ease_to` with the given centre.
    EaseTo(Coord<f64>),
    /// `configure_drawing`.
    ConfigureDrawing,
}

#[derive(Debug, Default)]
struct SurfaceState {
    sources: BTreeMap<String, LineString<f64>>,
    layers: BTreeMap<String, LineLayer>,
    marker: Option<Coord<f64>>,
    draw_style: Option<DrawStyle>,
    ops: Vec<SurfaceOp>,
}

/// In-memory [`MapSurface`] enforcing the renderer's source/layer rules.
///
/// Adding a duplicate identifier, adding a layer without its source, and
/// removing a source that a layer still draws all fail, mirroring a real map
/// renderer.
#[derive(Debug, Clone, Default)]
pub struct RecordingSurface {
    state: Arc<Mutex<SurfaceState>>,
}

impl RecordingSurface {
    fn lock(&self) -> MutexGuard<'_, SurfaceState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Calls observed so far, in order.
    #[must_use]
    pub fn ops(&self) -> Vec<SurfaceOp> {
        self.lock().ops.clone()
    }

    /// Forget recorded calls while keeping sources and layers.
    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    /// Number of sources on the surface.
    #[must_use]
    pub fn source_count(&self) -> usize {
        self.lock().sources.len()
    }

    /// Number of layers on the surface.
    #[must_use]
    pub fn layer_count(&self) -> usize {
        self.lock().layers.len()
    }

    /// Geometry held by a source.
    #[must_use]
    pub fn source(&self, id: &str) -> Option<LineString<f64>> {
        self.lock().sources.get(id).cloned()
    }

    /// A layer by identifier.
    #[must_use]
    pub fn layer(&self, id: &str) -> Option<LineLayer> {
        self.lock().layers.get(id).cloned()
    }

    /// Last marker position set.
    #[must_use]
    pub fn marker(&self) -> Option<Coord<f64>> {
        self.lock().marker
    }

    /// Every `ease_to` target, in order.
    #[must_use]
    pub fn eases(&self) -> Vec<Coord<f64>> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                SurfaceOp::EaseTo(center) => Some(*center),
                _ => None,
            })
            .collect()
    }

    /// Drawing style applied, if any.
    #[must_use]
    pub fn draw_style(&self) -> Option<DrawStyle> {
        self.lock().draw_style.clone()
    }
}

impl MapSurface for RecordingSurface {
    fn has_source(&self, id: &str) -> bool {
        self.lock().sources.contains_key(id)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.lock().layers.contains_key(id)
    }

    fn add_source(&mut self, id: &str, geometry: &LineString<f64>) -> Result<(), SurfaceError> {
        let mut state = self.lock();
        if state.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource { id: id.to_owned() });
        }
        state.sources.insert(id.to_owned(), geometry.clone());
        state.ops.push(SurfaceOp::AddSource(id.to_owned()));
        Ok(())
    }

    fn add_line_layer(&mut self, layer: &LineLayer) -> Result<(), SurfaceError> {
        let mut state = self.lock();
        if state.layers.contains_key(&layer.id) {
            return Err(SurfaceError::DuplicateLayer {
                id: layer.id.clone(),
            });
        }
        if !state.sources.contains_key(&layer.source) {
            return Err(SurfaceError::MissingSource {
                id: layer.source.clone(),
            });
        }
        state.layers.insert(layer.id.clone(), layer.clone());
        state.ops.push(SurfaceOp::AddLayer(layer.id.clone()));
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError> {
        let mut state = self.lock();
        if state.layers.remove(id).is_none() {
            return Err(SurfaceError::MissingLayer { id: id.to_owned() });
        }
        state.ops.push(SurfaceOp::RemoveLayer(id.to_owned()));
        Ok(())
    }

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError> {
        let mut state = self.lock();
        if let Some(layer) = state.layers.values().find(|layer| layer.source == id) {
            return Err(SurfaceError::SourceInUse {
                id: id.to_owned(),
                layer: layer.id.clone(),
            });
        }
        if state.sources.remove(id).is_none() {
            return Err(SurfaceError::MissingSource { id: id.to_owned() });
        }
        state.ops.push(SurfaceOp::RemoveSource(id.to_owned()));
        Ok(())
    }

    fn set_marker(&mut self, position: Coord<f64>) {
        let mut state = self.lock();
        state.marker = Some(position);
        state.ops.push(SurfaceOp::SetMarker(position));
    }

    fn ease_to(&mut self, center: Coord<f64>) {
        self.lock().ops.push(SurfaceOp::EaseTo(center));
    }

    fn configure_drawing(&mut self, style: &DrawStyle) {
        let mut state = self.lock();
        state.draw_style = Some(style.clone());
        state.ops.push(SurfaceOp::ConfigureDrawing);
    }
}

/// [`TextRegion`] remembering every text written.
#[derive(Debug, Clone, Default)]
pub struct RecordingRegion {
    history: Arc<Mutex<Vec<String>>>,
}

impl RecordingRegion {
    /// Current text, empty when nothing was written.
    #[must_use]
    pub fn text(&self) -> String {
        self.history().last().cloned().unwrap_or_default()
    }

    /// Every text written, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl TextRegion for RecordingRegion {
    fn set_text(&mut self, text: &str) {
        self.history
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(text.to_owned());
    }
}

/// [`AlertSink`] collecting alert messages.
#[derive(Debug, Clone, Default)]
pub struct RecordingAlerts {
    messages: Arc<Mutex<Vec<String>>>,
}

impl RecordingAlerts {
    /// Alerts raised so far, oldest first.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl AlertSink for RecordingAlerts {
    fn alert(&mut self, message: &str) {
        self.messages
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::line_string;
    use rstest::rstest;

    fn route_layer() -> LineLayer {
        LineLayer {
            id: "route".to_owned(),
            source: "route".to_owned(),
            style: crate::RouteLineStyle::default(),
        }
    }

    #[rstest]
    fn refuses_to_remove_source_in_use() {
        let mut surface = RecordingSurface::default();
        surface
            .add_source("route", &line_string![(x: 0.0, y: 0.0), (x: 1.0, y: 1.0)])
            .expect("add source");
        surface.add_line_layer(&route_layer()).expect("add layer");

        let err = surface.remove_source("route").expect_err("source in use");
        assert_eq!(
            err,
            SurfaceError::SourceInUse {
                id: "route".to_owned(),
                layer: "route".to_owned(),
            }
        );
    }

    #[rstest]
    fn refuses_layer_without_source() {
        let mut surface = RecordingSurface::default();
        let err = surface
            .add_line_layer(&route_layer())
            .expect_err("missing source");
        assert!(matches!(err, SurfaceError::MissingSource { .. }));
    }

    #[rstest]
    fn clones_share_state() {
        let surface = RecordingSurface::default();
        let mut handle = surface.clone();
        handle.set_marker(Coord { x: 1.0, y: 2.0 });
        assert_eq!(surface.marker(), Some(Coord { x: 1.0, y: 2.0 }));
    }
}
