//! The session task: builder, event dispatch and match bookkeeping.

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{self, JoinError, JoinSet};
use tokio::time::Instant;
use trailsnap_core::{
    AlertSink, DrawnFeatures, InstructionPanel, MapMatcher, MapSurface, MatchError, MatchRequest,
    MatchedRoute, RouteLayerManager, TextRegion, ViewportReconciler,
};

use crate::event::Command;
use crate::handle::{SessionHandle, SessionParts};
use crate::{SessionBuildError, SessionConfig, SessionEvent};

type MatchOutcome = Result<MatchedRoute, MatchError>;

/// Collects the collaborators of a [`Session`].
///
/// Every collaborator is mandatory; [`SessionBuilder::build`] reports the
/// first one missing.
pub struct SessionBuilder<S, R, A> {
    config: SessionConfig,
    surface: Option<S>,
    region: Option<R>,
    alerts: Option<A>,
    matcher: Option<Arc<dyn MapMatcher>>,
}

impl<S, R, A> SessionBuilder<S, R, A>
where
    S: MapSurface,
    R: TextRegion,
    A: AlertSink,
{
    /// Start a builder with `config`.
    #[must_use]
    pub const fn new(config: SessionConfig) -> Self {
        Self {
            config,
            surface: None,
            region: None,
            alerts: None,
            matcher: None,
        }
    }

    /// Map surface the session draws on.
    #[must_use]
    pub fn surface(mut self, surface: S) -> Self {
        self.surface = Some(surface);
        self
    }

    /// Text region receiving the trip summary.
    #[must_use]
    pub fn instruction_panel(mut self, region: R) -> Self {
        self.region = Some(region);
        self
    }

    /// Sink for user-facing failure messages.
    #[must_use]
    pub fn alerts(mut self, alerts: A) -> Self {
        self.alerts = Some(alerts);
        self
    }

    /// Service snapping drawn paths onto roads.
    #[must_use]
    pub fn matcher(mut self, matcher: Arc<dyn MapMatcher>) -> Self {
        self.matcher = Some(matcher);
        self
    }

    /// Validate the collaborators and assemble the session.
    ///
    /// # Errors
    ///
    /// Returns the [`SessionBuildError`] naming the first missing
    /// collaborator.
    pub fn build(self) -> Result<Session<S, R, A>, SessionBuildError> {
        let surface = self.surface.ok_or(SessionBuildError::MissingSurface)?;
        let region = self
            .region
            .ok_or(SessionBuildError::MissingInstructionPanel)?;
        let matcher = self.matcher.ok_or(SessionBuildError::MissingMatcher)?;
        let alerts = self.alerts.ok_or(SessionBuildError::MissingAlertSink)?;

        let viewport = ViewportReconciler::new(self.config.initial_center)
            .with_debounce(self.config.recenter_debounce);
        let overlay = RouteLayerManager::new(self.config.route_style.clone());
        Ok(Session {
            config: self.config,
            surface,
            panel: InstructionPanel::new(region),
            alerts,
            matcher,
            features: DrawnFeatures::new(),
            overlay,
            viewport,
            sequence: 0,
            in_flight: JoinSet::new(),
            requests: HashMap::new(),
            settle_waiters: Vec::new(),
        })
    }
}

/// A map-matching session with its collaborators.
///
/// Call [`Session::spawn`] to start it on the current tokio runtime.
pub struct Session<S, R, A> {
    config: SessionConfig,
    surface: S,
    panel: InstructionPanel<R>,
    alerts: A,
    matcher: Arc<dyn MapMatcher>,
    features: DrawnFeatures,
    overlay: RouteLayerManager,
    viewport: ViewportReconciler,
    // Sequence of the latest draw event; results for older ones are stale.
    sequence: u64,
    in_flight: JoinSet<MatchOutcome>,
    // Request sequence of each in-flight match task.
    requests: HashMap<task::Id, u64>,
    settle_waiters: Vec<oneshot::Sender<()>>,
}

impl<S, R, A> Session<S, R, A>
where
    S: MapSurface + Send + 'static,
    R: TextRegion + Send + 'static,
    A: AlertSink + Send + 'static,
{
    /// Configuration in use.
    #[must_use]
    pub const fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Apply the start-up state and run the session as a tokio task.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    #[must_use]
    pub fn spawn(self) -> SessionHandle<S, R, A> {
        let (commands, inbox) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(inbox));
        SessionHandle::new(commands, task)
    }

    async fn run(mut self, mut inbox: mpsc::UnboundedReceiver<Command>) -> SessionParts<S, R, A> {
        self.attach();
        loop {
            let deadline = self.viewport.recenter_deadline();
            tokio::select! {
                biased;
                command = inbox.recv() => match command {
                    Some(Command::Event(event)) => self.dispatch(event),
                    Some(Command::Settle(waiter)) => self.settle_waiters.push(waiter),
                    Some(Command::Shutdown) | None => break,
                },
                Some(joined) = self.in_flight.join_next_with_id(),
                    if !self.in_flight.is_empty() =>
                {
                    self.complete(joined);
                }
                () = recenter_due(deadline) => self.fire_recenter(),
            }
            self.notify_settled();
        }
        self.detach()
    }

    fn attach(&mut self) {
        self.surface.configure_drawing(&self.config.draw_style);
        self.surface.set_marker(self.config.initial_center);
        debug!(
            "session attached at {:?}, zoom {}",
            self.config.initial_center, self.config.initial_zoom
        );
    }

    fn detach(mut self) -> SessionParts<S, R, A> {
        let pending = self.in_flight.len();
        self.in_flight.abort_all();
        self.requests.clear();
        if pending > 0 {
            debug!("session detached with {pending} match requests aborted");
        }
        release(&mut self.settle_waiters);
        SessionParts {
            surface: self.surface,
            region: self.panel.into_region(),
            alerts: self.alerts,
            features: self.features,
        }
    }

    fn dispatch(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::DrawCreate(features) | SessionEvent::DrawUpdate(features) => {
                for feature in features {
                    self.features.upsert(feature);
                }
                self.request_match();
            }
            SessionEvent::DrawDelete(ids) => {
                for id in ids {
                    if !self.features.remove(id) {
                        debug!("delete for unknown {id}");
                    }
                }
                self.sequence += 1;
                self.remove_route();
            }
            SessionEvent::ZoomStart => self.viewport.on_zoom_start(),
            SessionEvent::ZoomEnd => self.viewport.on_zoom_end(),
            SessionEvent::Zoom => self.viewport.on_zoom(Instant::now().into_std()),
            SessionEvent::Move(center) => {
                if let Some(position) = self.viewport.on_move(center) {
                    self.surface.set_marker(position);
                }
            }
        }
    }

    fn request_match(&mut self) {
        self.sequence += 1;
        let path = match self.features.active_path() {
            Ok(path) => path,
            Err(err) => {
                debug!("no match requested: {err}");
                return;
            }
        };

        let request = MatchRequest::new(path, self.config.profile);
        let matcher = Arc::clone(&self.matcher);
        let sequence = self.sequence;
        let deadline = self.config.request_timeout;
        debug!(
            "match request #{sequence} for {} points",
            request.coordinates().len()
        );
        let task = self.in_flight.spawn(async move {
            tokio::time::timeout(deadline, matcher.match_path(&request))
                .await
                .unwrap_or_else(|_| Err(MatchError::timeout(deadline)))
        });
        self.requests.insert(task.id(), sequence);
    }

    fn complete(&mut self, joined: Result<(task::Id, MatchOutcome), JoinError>) {
        let (id, outcome) = match joined {
            Ok(finished) => finished,
            Err(err) => {
                warn!("match task failed: {err}");
                let message = if err.is_panic() {
                    "the matcher panicked".to_owned()
                } else {
                    "the request was cancelled".to_owned()
                };
                (err.id(), Err(MatchError::Aborted { message }))
            }
        };
        let Some(sequence) = self.requests.remove(&id) else {
            debug!("dropping result of untracked match task {id}");
            return;
        };
        if sequence != self.sequence {
            debug!(
                "dropping stale match result #{sequence}; latest is #{}",
                self.sequence
            );
            return;
        }

        match outcome {
            Ok(route) => self.show_route(&route),
            Err(err) => {
                warn!("map matching failed: {err}");
                self.alerts.alert(&err.alert_message());
            }
        }
    }

    fn show_route(&mut self, route: &MatchedRoute) {
        if let Err(err) = self.overlay.render(&mut self.surface, &route.geometry) {
            warn!("failed to render route: {err}");
            self.alerts
                .alert(&format!("The matched route could not be drawn: {err}."));
            return;
        }
        self.panel.render(route);
        info!(
            "rendered route with {} points, {} s",
            route.geometry.0.len(),
            route.duration.as_secs()
        );
    }

    fn remove_route(&mut self) {
        if let Err(err) = self.overlay.remove(&mut self.surface) {
            warn!("failed to remove route: {err}");
            self.alerts
                .alert(&format!("The route could not be removed: {err}."));
        }
    }

    fn fire_recenter(&mut self) {
        if let Some(anchor) = self.viewport.take_due_recenter(Instant::now().into_std()) {
            debug!("re-centring on {anchor:?}");
            self.surface.ease_to(anchor);
        }
    }

    fn notify_settled(&mut self) {
        if self.in_flight.is_empty() {
            release(&mut self.settle_waiters);
        }
    }
}

fn release(waiters: &mut Vec<oneshot::Sender<()>>) {
    for waiter in waiters.drain(..) {
        if waiter.send(()).is_err() {
            debug!("settle waiter went away");
        }
    }
}

async fn recenter_due(deadline: Option<std::time::Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(Instant::from_std(deadline)).await,
        None => std::future::pending().await,
    }
}
