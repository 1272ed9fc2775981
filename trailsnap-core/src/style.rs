//! Styling constants for the drawn path and the matched route.
//!
//! These values carry no behaviour; they are handed to the map surface as-is.

/// Paint and layout of the matched route overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteLineStyle {
    /// CSS colour of the line.
    pub color: String,
    /// Line width in pixels.
    pub width: f64,
    /// Line opacity in `[0.0, 1.0]`.
    pub opacity: f64,
    /// Whether joins and caps are rounded.
    pub rounded: bool,
}

impl Default for RouteLineStyle {
    fn default() -> Self {
        Self {
            color: "#DA4E41".to_owned(),
            width: 8.0,
            opacity: 1.0,
            rounded: true,
        }
    }
}

/// Style rules for the drawing tool's in-progress line and its vertices.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawStyle {
    /// CSS colour of the user-drawn line.
    pub line_color: String,
    /// Dash pattern of the user-drawn line, in line widths.
    pub line_dash: Vec<f64>,
    /// Width of the user-drawn line in pixels.
    pub line_width: f64,
    /// Opacity of the user-drawn line.
    pub line_opacity: f64,
    /// Radius of the halo drawn around active vertices.
    pub vertex_halo_radius: f64,
    /// Colour of the vertex halo.
    pub vertex_halo_color: String,
    /// Radius of the vertex dot.
    pub vertex_radius: f64,
    /// Colour of the vertex dot.
    pub vertex_color: String,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            line_color: "#438EE4".to_owned(),
            line_dash: vec![0.2, 2.0],
            line_width: 4.0,
            line_opacity: 0.7,
            vertex_halo_radius: 7.24,
            vertex_halo_color: "#DA4E41".to_owned(),
            vertex_radius: 4.345,
            vertex_color: "#FFF".to_owned(),
        }
    }
}
