//! Trip summary rendering for the side panel.

use std::time::Duration;

use crate::MatchedRoute;

const SECS_PER_MINUTE: u64 = 60;

/// A text node the panel writes into.
pub trait TextRegion {
    /// Replace the region's text.
    fn set_text(&mut self, text: &str);
}

/// Writes the trip duration and step instructions of a matched route.
///
/// The region is required at construction; a missing panel is a startup
/// failure rather than something checked on every render.
#[derive(Debug, Clone, Default)]
pub struct InstructionPanel<R> {
    region: R,
}

impl<R: TextRegion> InstructionPanel<R> {
    /// Bind the panel to `region`.
    pub const fn new(region: R) -> Self {
        Self { region }
    }

    /// Render `route` into the region.
    pub fn render(&mut self, route: &MatchedRoute) {
        self.region.set_text(&Self::format(route));
    }

    /// Full panel text: the summary line followed by numbered steps.
    ///
    /// # Examples
    /// ```
    /// use std::time::Duration;
    /// use geo::LineString;
    /// use trailsnap_core::{InstructionPanel, MatchedRoute, TextRegion};
    ///
    /// struct Sink;
    /// impl TextRegion for Sink {
    ///     fn set_text(&mut self, _text: &str) {}
    /// }
    ///
    /// let route = MatchedRoute::new(LineString::new(vec![]), Duration::from_secs(125))
    ///     .with_instructions(vec!["Head north".to_owned(), "Arrive".to_owned()]);
    /// assert_eq!(
    ///     InstructionPanel::<Sink>::format(&route),
    ///     "Trip duration: 2 min.\n1. Head north\n2. Arrive"
    /// );
    /// ```
    #[must_use]
    pub fn format(route: &MatchedRoute) -> String {
        let mut text = Self::summary_line(route.duration);
        for (number, instruction) in (1_usize..).zip(&route.instructions) {
            text.push('\n');
            text.push_str(&format!("{number}. {instruction}"));
        }
        text
    }

    /// Whole-minute summary, rounded down.
    #[must_use]
    pub fn summary_line(duration: Duration) -> String {
        let minutes = duration.as_secs().div_euclid(SECS_PER_MINUTE);
        format!("Trip duration: {minutes} min.")
    }

    /// The bound region.
    pub const fn region(&self) -> &R {
        &self.region
    }

    /// Release the bound region.
    pub fn into_region(self) -> R {
        self.region
    }
}
