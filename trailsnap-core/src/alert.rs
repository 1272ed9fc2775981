//! User-facing alert channel.

/// Receives messages that must be shown to the user, such as a failed
/// map-matching request.
pub trait AlertSink {
    /// Surface `message` to the user.
    fn alert(&mut self, message: &str);
}
