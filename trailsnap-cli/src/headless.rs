//! Headless collaborators for running a session without a map renderer.

use std::collections::BTreeMap;

use geo::{Coord, LineString};
use geojson::{Feature, Geometry, JsonObject, JsonValue, Value};
use trailsnap_core::{AlertSink, DrawStyle, LineLayer, MapSurface, SurfaceError, TextRegion};

/// In-memory [`MapSurface`] that keeps sources and layers for export.
///
/// Enforces the renderer's rules: identifiers are unique, layers need an
/// existing source, and a source cannot be removed while a layer draws it.
#[derive(Debug, Clone, Default)]
pub struct HeadlessSurface {
    sources: BTreeMap<String, LineString<f64>>,
    layers: BTreeMap<String, LineLayer>,
    marker: Option<Coord<f64>>,
    center: Option<Coord<f64>>,
    draw_style: Option<DrawStyle>,
}

impl HeadlessSurface {
    /// Current marker position.
    #[must_use]
    pub const fn marker(&self) -> Option<Coord<f64>> {
        self.marker
    }

    /// Last centre eased to.
    #[must_use]
    pub const fn center(&self) -> Option<Coord<f64>> {
        self.center
    }

    /// Drawing style applied, if any.
    #[must_use]
    pub const fn draw_style(&self) -> Option<&DrawStyle> {
        self.draw_style.as_ref()
    }

    /// The layer `id` and its source geometry as a GeoJSON feature.
    ///
    /// Paint is exported as simplestyle `stroke` properties.
    #[must_use]
    pub fn layer_feature(&self, id: &str) -> Option<Feature> {
        let layer = self.layers.get(id)?;
        let geometry = self.sources.get(&layer.source)?;

        let mut properties = JsonObject::new();
        properties.insert("id".to_owned(), JsonValue::from(layer.id.clone()));
        properties.insert(
            "stroke".to_owned(),
            JsonValue::from(layer.style.color.clone()),
        );
        properties.insert("stroke-width".to_owned(), JsonValue::from(layer.style.width));
        properties.insert(
            "stroke-opacity".to_owned(),
            JsonValue::from(layer.style.opacity),
        );

        let positions = geometry.coords().map(|coord| vec![coord.x, coord.y]).collect();
        Some(Feature {
            bbox: None,
            geometry: Some(Geometry::new(Value::LineString(positions))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        })
    }
}

impl MapSurface for HeadlessSurface {
    fn has_source(&self, id: &str) -> bool {
        self.sources.contains_key(id)
    }

    fn has_layer(&self, id: &str) -> bool {
        self.layers.contains_key(id)
    }

    fn add_source(&mut self, id: &str, geometry: &LineString<f64>) -> Result<(), SurfaceError> {
        if self.sources.contains_key(id) {
            return Err(SurfaceError::DuplicateSource { id: id.to_owned() });
        }
        self.sources.insert(id.to_owned(), geometry.clone());
        Ok(())
    }

    fn add_line_layer(&mut self, layer: &LineLayer) -> Result<(), SurfaceError> {
        if self.layers.contains_key(&layer.id) {
            return Err(SurfaceError::DuplicateLayer {
                id: layer.id.clone(),
            });
        }
        if !self.sources.contains_key(&layer.source) {
            return Err(SurfaceError::MissingSource {
                id: layer.source.clone(),
            });
        }
        self.layers.insert(layer.id.clone(), layer.clone());
        Ok(())
    }

    fn remove_layer(&mut self, id: &str) -> Result<(), SurfaceError> {
        self.layers
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SurfaceError::MissingLayer { id: id.to_owned() })
    }

    fn remove_source(&mut self, id: &str) -> Result<(), SurfaceError> {
        if let Some(layer) = self.layers.values().find(|layer| layer.source == id) {
            return Err(SurfaceError::SourceInUse {
                id: id.to_owned(),
                layer: layer.id.clone(),
            });
        }
        self.sources
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SurfaceError::MissingSource { id: id.to_owned() })
    }

    fn set_marker(&mut self, position: Coord<f64>) {
        self.marker = Some(position);
    }

    fn ease_to(&mut self, center: Coord<f64>) {
        self.center = Some(center);
    }

    fn configure_drawing(&mut self, style: &DrawStyle) {
        self.draw_style = Some(style.clone());
    }
}

/// [`TextRegion`] holding the latest panel text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PanelText(String);

impl PanelText {
    /// Text written last, empty if none.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TextRegion for PanelText {
    fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.0);
    }
}

/// [`AlertSink`] collecting messages for the final report.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlertLog(Vec<String>);

impl AlertLog {
    /// Messages raised, oldest first.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.0
    }
}

impl AlertSink for AlertLog {
    fn alert(&mut self, message: &str) {
        log::warn!("{message}");
        self.0.push(message.to_owned());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use trailsnap_core::{ROUTE_OVERLAY_ID, RouteLayerManager};

    #[rstest]
    fn exports_rendered_route_with_style() {
        let mut surface = HeadlessSurface::default();
        let geometry = LineString::from(vec![(76.9, 43.24), (76.91, 43.25)]);
        RouteLayerManager::default()
            .render(&mut surface, &geometry)
            .expect("render");

        let feature = surface
            .layer_feature(ROUTE_OVERLAY_ID)
            .expect("route feature");

        assert_eq!(
            feature.geometry.map(|geometry| geometry.value),
            Some(Value::LineString(vec![vec![76.9, 43.24], vec![76.91, 43.25]]))
        );
        let properties = feature.properties.expect("properties");
        assert_eq!(properties.get("stroke"), Some(&JsonValue::from("#DA4E41")));
        assert_eq!(properties.get("stroke-width"), Some(&JsonValue::from(8.0)));
    }

    #[rstest]
    fn source_in_use_cannot_be_removed() {
        let mut surface = HeadlessSurface::default();
        RouteLayerManager::default()
            .render(&mut surface, &LineString::from(vec![(0.0, 0.0), (1.0, 1.0)]))
            .expect("render");

        let err = surface
            .remove_source(ROUTE_OVERLAY_ID)
            .expect_err("layer still draws the source");

        assert!(matches!(err, SurfaceError::SourceInUse { .. }));
    }

    #[rstest]
    fn panel_keeps_latest_text() {
        let mut panel = PanelText::default();
        panel.set_text("first");
        panel.set_text("Trip duration: 2 min.");
        assert_eq!(panel.as_str(), "Trip duration: 2 min.");
    }
}
