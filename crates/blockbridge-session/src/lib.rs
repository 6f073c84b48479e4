//! Per-client sessions for Blockbridge.
//!
//! Everything here is scoped to one Bedrock client:
//!
//! 1. **Session** ([`BridgeSession`]): the negotiated codec and the
//!    [`Upstream`] connection.
//! 2. **Event loop** ([`EventLoopHandle`]): ordered and delayed work for
//!    the session.
//! 3. **Forms** ([`FormCache`]): form ids, response routing and the
//!    client workarounds that come with them.
//!
//! # How it fits in the stack
//!
//! ```text
//! Transport (above)  ← implements Upstream, feeds inbound packets
//!     ↕
//! Session Layer (this crate)
//!     ↕
//! Protocol / Form / Translator crates (below)
//! ```

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

mod error;
mod event_loop;
pub mod form_cache;
mod session;

// ---------------------------------------------------------------------------
// Re-exports
// ---------------------------------------------------------------------------

pub use error::SessionError;
pub use event_loop::{EventLoopHandle, Task, spawn_event_loop};
pub use form_cache::{FormCache, repair_label_slots};
pub use session::{BridgeSession, SessionConfig, SessionId, Upstream};
