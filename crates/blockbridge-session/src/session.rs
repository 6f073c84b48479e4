//! The per-client bridge session.
//!
//! A [`BridgeSession`] is created once the Bedrock client's protocol version
//! is known. It owns everything scoped to that client: the negotiated codec,
//! the event loop, open forms and pending keep-alives. The actual transport
//! sits behind the [`Upstream`] trait.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use blockbridge_form::Form;
use blockbridge_protocol::registry::{all_supported_bedrock_versions, codec_for};
use blockbridge_protocol::{BedrockCodec, ModalFormResponsePacket, NegotiatedProtocol, Packet};
use blockbridge_translator::KeepAliveCache;
use rand::Rng;

use crate::form_cache::{FORM_IMAGE_HACK_DELAY, FormCache};
use crate::{EventLoopHandle, SessionError, spawn_event_loop};

// ---------------------------------------------------------------------------
// SessionId
// ---------------------------------------------------------------------------

/// Random identifier used to tell sessions apart in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(u64);

impl SessionId {
    pub fn random() -> Self {
        Self(rand::rng().random())
    }

    pub fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Upstream
// ---------------------------------------------------------------------------

/// The client connection as the session sees it.
///
/// Implemented by the transport. Calls may come from any thread.
pub trait Upstream: Send + Sync + 'static {
    /// Queues `packet` for the client.
    fn send_packet(&self, packet: Packet);

    /// Whether the client has finished logging in and can display forms.
    fn is_initialized(&self) -> bool;

    /// The Bedrock protocol the client negotiated.
    fn protocol_version(&self) -> i32;

    /// Kicks the client with `reason`.
    fn disconnect(&self, reason: &str);
}

// ---------------------------------------------------------------------------
// SessionConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Delay before the image probe that follows a simple form. Values
    /// below 500ms are raised to 500ms.
    pub image_hack_delay: Duration,

    /// Capacity of the event loop's command queue.
    pub command_buffer: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            image_hack_delay: FORM_IMAGE_HACK_DELAY,
            command_buffer: 256,
        }
    }
}

// ---------------------------------------------------------------------------
// BridgeSession
// ---------------------------------------------------------------------------

pub struct BridgeSession {
    id: SessionId,
    upstream: Arc<dyn Upstream>,
    codec: BedrockCodec,
    event_loop: EventLoopHandle,
    forms: FormCache,
    keep_alives: KeepAliveCache,
}

impl BridgeSession {
    /// Sets up a session for a client that negotiated
    /// `upstream.protocol_version()`.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    /// Returns [`SessionError::UnsupportedVersion`] if the bridge has no
    /// codec for the client's protocol.
    pub fn new(upstream: Arc<dyn Upstream>, config: SessionConfig) -> Result<Self, SessionError> {
        let protocol = upstream.protocol_version();
        let Some(codec) = codec_for(protocol) else {
            return Err(SessionError::UnsupportedVersion {
                protocol,
                supported: all_supported_bedrock_versions(),
            });
        };
        Ok(Self::with_codec(upstream, codec, config))
    }

    /// Sets up a session that speaks `codec`, whatever protocol the client
    /// reports. Used when a proxy in front of the bridge pins a client onto
    /// a codec the bridge supports. Version-specific client workarounds
    /// still follow `upstream.protocol_version()`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn with_codec(
        upstream: Arc<dyn Upstream>,
        codec: BedrockCodec,
        config: SessionConfig,
    ) -> Self {
        let id = SessionId::random();
        let event_loop = spawn_event_loop(id, config.command_buffer);
        let forms = FormCache::new(
            Arc::clone(&upstream),
            event_loop.clone(),
            config.image_hack_delay,
        );

        tracing::info!(
            session_id = %id,
            client_protocol = upstream.protocol_version(),
            codec_protocol = codec.protocol_version(),
            version = codec.minecraft_version(),
            "bridge session created"
        );

        Self {
            id,
            upstream,
            codec,
            event_loop,
            forms,
            keep_alives: KeepAliveCache::new(),
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn codec(&self) -> &BedrockCodec {
        &self.codec
    }

    pub fn event_loop(&self) -> &EventLoopHandle {
        &self.event_loop
    }

    pub fn forms(&self) -> &FormCache {
        &self.forms
    }

    /// Keep-alive ids sent to the client and not yet answered.
    pub fn keep_alives(&self) -> &KeepAliveCache {
        &self.keep_alives
    }

    pub fn send_upstream_packet(&self, packet: Packet) {
        self.upstream.send_packet(packet);
    }

    /// Shows `form` and returns the id it was sent under.
    pub fn show_form(&self, form: impl Into<Form>) -> i32 {
        self.forms.show_form(form.into())
    }

    pub fn register_static_form(&self, form: impl Into<Form>) -> i32 {
        self.forms.register_static_form(form.into())
    }

    pub fn unregister_static_form(&self, form_id: i32) {
        self.forms.unregister_static_form(form_id);
    }

    pub fn clear_recyclable_forms(&self) {
        self.forms.clear_recyclable_forms();
    }

    pub fn resend_all_forms(&self) {
        self.forms.resend_all_forms();
    }

    pub fn handle_response(&self, response: &ModalFormResponsePacket) {
        self.forms.handle_response(response);
    }

    pub fn has_form_open(&self) -> bool {
        self.forms.has_form_open()
    }

    /// Kicks the client and stops the session.
    pub async fn disconnect(&self, reason: &str) {
        tracing::info!(session_id = %self.id, reason, "disconnecting");
        self.upstream.disconnect(reason);
        self.close().await;
    }

    /// Stops the event loop. Pending scheduled work is dropped.
    pub async fn close(&self) {
        self.event_loop.shutdown().await;
        tracing::debug!(session_id = %self.id, "bridge session closed");
    }
}

impl NegotiatedProtocol for BridgeSession {
    fn protocol_version(&self) -> i32 {
        self.codec.protocol_version()
    }
}

impl fmt::Debug for BridgeSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeSession")
            .field("id", &self.id)
            .field("protocol", &self.codec.protocol_version())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id_display_is_fixed_width_hex() {
        assert_eq!(SessionId::from_raw(0xbeef).to_string(), "000000000000beef");
        assert_eq!(SessionId::from_raw(0xbeef).as_raw(), 0xbeef);
    }

    #[test]
    fn test_default_config() {
        let config = SessionConfig::default();
        assert_eq!(config.image_hack_delay, Duration::from_millis(500));
        assert_eq!(config.command_buffer, 256);
    }
}
