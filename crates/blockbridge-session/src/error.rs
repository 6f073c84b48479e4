//! Error types for the session layer.

/// Errors that can occur while setting up or driving a session.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The client negotiated a protocol the bridge has no codec for.
    #[error("unsupported bedrock protocol {protocol}, supported versions: {supported}")]
    UnsupportedVersion { protocol: i32, supported: String },

    /// The session's event loop has stopped.
    #[error("event loop for session {0} is closed")]
    EventLoopClosed(String),

    /// The session's event loop queue is full.
    #[error("event loop for session {0} is overloaded")]
    EventLoopFull(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unsupported_version_lists_supported() {
        let err = SessionError::UnsupportedVersion {
            protocol: 999,
            supported: "1.20.80".into(),
        };
        assert_eq!(
            err.to_string(),
            "unsupported bedrock protocol 999, supported versions: 1.20.80"
        );
    }

    #[test]
    fn test_event_loop_errors_name_the_session() {
        let closed = SessionError::EventLoopClosed("000000000000002a".into());
        let full = SessionError::EventLoopFull("000000000000002a".into());
        assert!(closed.to_string().contains("000000000000002a"));
        assert!(full.to_string().ends_with("is overloaded"));
    }
}
