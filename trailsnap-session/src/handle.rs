//! Handles for talking to a running session.

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use trailsnap_core::DrawnFeatures;

use crate::event::Command;
use crate::{SessionError, SessionEvent};

/// Collaborators returned when a session shuts down.
#[derive(Debug)]
pub struct SessionParts<S, R, A> {
    /// The map surface, overlay included.
    pub surface: S,
    /// The instruction panel's text region.
    pub region: R,
    /// The alert sink.
    pub alerts: A,
    /// Drawn features as last seen.
    pub features: DrawnFeatures,
}

/// Cloneable, non-blocking sender for renderer and drawing-tool adapters.
#[derive(Debug, Clone)]
pub struct EventSender {
    commands: mpsc::UnboundedSender<Command>,
}

impl EventSender {
    /// Post `event` to the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.commands
            .send(Command::Event(event))
            .map_err(|_| SessionError::Closed)
    }
}

/// Owner's handle on a spawned session.
///
/// Dropping the handle without calling [`SessionHandle::shutdown`] leaves the
/// task running until every [`EventSender`] is dropped too.
#[derive(Debug)]
pub struct SessionHandle<S, R, A> {
    events: EventSender,
    task: JoinHandle<SessionParts<S, R, A>>,
}

impl<S, R, A> SessionHandle<S, R, A> {
    pub(crate) const fn new(
        commands: mpsc::UnboundedSender<Command>,
        task: JoinHandle<SessionParts<S, R, A>>,
    ) -> Self {
        Self {
            events: EventSender { commands },
            task,
        }
    }

    /// Post `event` to the session.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] once the session has stopped.
    pub fn send(&self, event: SessionEvent) -> Result<(), SessionError> {
        self.events.send(event)
    }

    /// A sender for an event source.
    #[must_use]
    pub fn sender(&self) -> EventSender {
        self.events.clone()
    }

    /// Wait until every event posted so far has been handled and no match
    /// request is in flight.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Closed`] if the session stops first.
    pub async fn settle(&self) -> Result<(), SessionError> {
        let (done, settled) = oneshot::channel();
        self.events
            .commands
            .send(Command::Settle(done))
            .map_err(|_| SessionError::Closed)?;
        settled.await.map_err(|_| SessionError::Closed)
    }

    /// Stop the session and take back its collaborators.
    ///
    /// Events posted before this call are handled first. Match requests still
    /// in flight are aborted and their results discarded.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Task`] if the session task panicked.
    pub async fn shutdown(self) -> Result<SessionParts<S, R, A>, SessionError> {
        // A closed channel means the loop already exited; joining still
        // yields its parts.
        if self.events.commands.send(Command::Shutdown).is_err() {
            log::debug!("session already stopped before shutdown");
        }
        Ok(self.task.await?)
    }
}
