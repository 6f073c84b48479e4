//! Inbound network stack latency packets.
//!
//! The bridge sends latency probes for two reasons: to carry a Java
//! keep-alive through to the client (so the Java server sees real ping),
//! and as a nudge that makes the client finish loading images on a simple
//! form. The second kind uses a negative timestamp, so the replies can be
//! told apart.

use std::collections::VecDeque;
use std::sync::Mutex;

use blockbridge_protocol::NetworkStackLatencyPacket;

/// Java keep-alive ids waiting for a client latency reply, oldest first.
#[derive(Debug, Default)]
pub struct KeepAliveCache {
    pending: Mutex<VecDeque<i64>>,
}

impl KeepAliveCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a keep-alive that was just sent to the client as a probe.
    pub fn push(&self, keep_alive_id: i64) {
        self.lock().push_back(keep_alive_id);
    }

    pub fn poll(&self) -> Option<i64> {
        self.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, VecDeque<i64>> {
        // A poisoned queue still holds valid ids.
        self.pending.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// What to do with an inbound latency packet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LatencyOutcome {
    /// Reply to the form image probe. Nothing to forward.
    ImageHackEcho,
    /// Send a Java keep-alive with this id to the server.
    ForwardKeepAlive(i64),
    /// Not forwarded.
    Dropped,
}

/// Decides what an inbound latency packet turns into on the Java side.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkStackLatencyTranslator {
    forward_player_ping: bool,
}

impl NetworkStackLatencyTranslator {
    pub fn new(forward_player_ping: bool) -> Self {
        Self {
            forward_player_ping,
        }
    }

    /// Clients scale the echoed timestamp differently per platform and
    /// version, so the cached keep-alive id is forwarded instead of the
    /// timestamp itself.
    pub fn translate(
        &self,
        packet: &NetworkStackLatencyPacket,
        keep_alives: &KeepAliveCache,
    ) -> LatencyOutcome {
        if packet.timestamp < 0 {
            tracing::trace!(timestamp = packet.timestamp, "form image probe answered");
            return LatencyOutcome::ImageHackEcho;
        }
        if !self.forward_player_ping {
            return LatencyOutcome::Dropped;
        }
        match keep_alives.poll() {
            Some(id) => LatencyOutcome::ForwardKeepAlive(id),
            None => {
                tracing::debug!(
                    timestamp = packet.timestamp,
                    "latency reply without a pending keep-alive"
                );
                LatencyOutcome::Dropped
            }
        }
    }
}
