//! Inbound packet dispatch for one session.
//!
//! Each frame from the client is decoded with the session's codec and
//! routed:
//!   - form responses go to the form cache
//!   - latency replies go to the latency translator
//!   - packets the codec ignores or silences inbound are discarded
//!   - everything else is handed back to the caller to translate
//!
//! A frame that fails to decode is a protocol violation and ends the
//! session.

use std::sync::Arc;

use blockbridge_protocol::{DirectionPolicy, NetworkStackLatencyPacket, Packet, PacketKind};
use blockbridge_session::BridgeSession;
use blockbridge_translator::{LatencyOutcome, NetworkStackLatencyTranslator};
use bytes::Bytes;
use tokio::sync::mpsc;

use crate::BridgeError;

/// What became of one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// Routed to the form cache.
    FormResponse { form_id: i32 },
    /// Consumed by the latency translator.
    Latency(LatencyOutcome),
    /// The codec's policy discards this kind inbound; nothing to do.
    Dropped(PacketKind),
    /// Not handled here.
    Forward(Packet),
}

/// Routes inbound frames for one session.
pub struct InboundHandler {
    session: Arc<BridgeSession>,
    latency: NetworkStackLatencyTranslator,
}

impl InboundHandler {
    pub fn new(session: Arc<BridgeSession>, forward_player_ping: bool) -> Self {
        Self {
            session,
            latency: NetworkStackLatencyTranslator::new(forward_player_ping),
        }
    }

    pub fn session(&self) -> &Arc<BridgeSession> {
        &self.session
    }

    /// Decodes and routes one frame.
    ///
    /// # Errors
    /// On a protocol violation the client is disconnected with the error's
    /// message, and the error is returned.
    pub async fn handle_frame(&self, frame: Bytes) -> Result<InboundOutcome, BridgeError> {
        let packet = match self.session.codec().decode_packet(frame) {
            Ok(packet) => packet,
            Err(err) => {
                tracing::warn!(
                    session_id = %self.session.id(),
                    kind = ?err.packet_kind(),
                    %err,
                    "protocol violation, disconnecting"
                );
                self.session.disconnect(&err.to_string()).await;
                return Err(err.into());
            }
        };

        tracing::trace!(session_id = %self.session.id(), kind = %packet.kind(), "inbound packet");
        Ok(self.dispatch(packet))
    }

    /// Handles frames until `frames` closes or a frame violates the protocol.
    pub async fn run(self, mut frames: mpsc::Receiver<Bytes>) -> Result<(), BridgeError> {
        while let Some(frame) = frames.recv().await {
            if let InboundOutcome::Forward(packet) = self.handle_frame(frame).await? {
                tracing::debug!(kind = %packet.kind(), "no translator for inbound packet");
            }
        }
        self.session.close().await;
        Ok(())
    }

    /// Sends a latency probe standing in for Java keep-alive `keep_alive_id`.
    /// The client's reply is forwarded by [`handle_frame`](Self::handle_frame)
    /// when player ping forwarding is on.
    pub fn send_latency_probe(&self, keep_alive_id: i64) {
        self.session.keep_alives().push(keep_alive_id);
        // Negative timestamps are reserved for the form image probe.
        let timestamp = keep_alive_id & i64::MAX;
        self.session.send_upstream_packet(
            NetworkStackLatencyPacket {
                timestamp,
                from_server: true,
            }
            .into(),
        );
    }

    fn discards(&self, kind: PacketKind) -> bool {
        self.session
            .codec()
            .direction_policy(kind)
            .is_some_and(DirectionPolicy::discards_inbound)
    }

    fn dispatch(&self, packet: Packet) -> InboundOutcome {
        match packet {
            Packet::ModalFormResponse(response) => {
                self.session.handle_response(&response);
                InboundOutcome::FormResponse {
                    form_id: response.form_id,
                }
            }
            Packet::NetworkStackLatency(latency) => InboundOutcome::Latency(
                self.latency.translate(&latency, self.session.keep_alives()),
            ),
            packet if self.discards(packet.kind()) => InboundOutcome::Dropped(packet.kind()),
            packet => InboundOutcome::Forward(packet),
        }
    }
}
