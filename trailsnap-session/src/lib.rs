//! Session controller wiring drawing and viewport events to the pipeline.
//!
//! A [`Session`] owns the map surface, the drawn features, the route overlay,
//! the instruction panel, the viewport reconciler and the alert sink. Once
//! spawned it runs as a single tokio task: event sources post
//! [`SessionEvent`]s through a [`SessionHandle`] and every state change
//! happens inside that task, so overlay renders and removals never
//! interleave.
//!
//! Match requests run concurrently with event handling. Each draw event bumps
//! a request sequence and only the result for the latest sequence is applied
//! ("last draw wins").
//!
//! Events are applied in the order they are posted. Adapters bridging a map
//! renderer must post `ZoomStart` before the `Move` events a zoom gesture
//! causes and `ZoomEnd` after them.

#![forbid(unsafe_code)]

mod config;
mod error;
mod event;
mod handle;
mod session;

pub use config::{DEFAULT_CENTER, DEFAULT_REQUEST_TIMEOUT, DEFAULT_ZOOM, SessionConfig};
pub use error::{SessionBuildError, SessionError};
pub use event::SessionEvent;
pub use handle::{EventSender, SessionHandle, SessionParts};
pub use session::{Session, SessionBuilder};
