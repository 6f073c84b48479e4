//! Bridge configuration.
//!
//! Loaded from JSON. Every field has a default, so an empty object is a
//! valid config:
//!
//! ```json
//! {
//!   "log_filter": "info,blockbridge_session=debug",
//!   "forms": { "image_hack_delay_ms": 500 },
//!   "event_loop": { "command_buffer": 256 },
//!   "forward_player_ping": false
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use blockbridge_session::SessionConfig;
use serde::{Deserialize, Serialize};

use crate::BridgeError;

const MIN_IMAGE_HACK_DELAY_MS: u64 = 500;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// `tracing` filter directive. `RUST_LOG` takes precedence.
    pub log_filter: String,
    pub forms: FormsConfig,
    pub event_loop: EventLoopConfig,
    /// Forward client latency replies to the Java server as keep-alives.
    pub forward_player_ping: bool,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            log_filter: "info".to_owned(),
            forms: FormsConfig::default(),
            event_loop: EventLoopConfig::default(),
            forward_player_ping: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormsConfig {
    /// Delay between a simple form and the probe that makes the client load
    /// its images.
    pub image_hack_delay_ms: u64,
}

impl Default for FormsConfig {
    fn default() -> Self {
        Self {
            image_hack_delay_ms: MIN_IMAGE_HACK_DELAY_MS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventLoopConfig {
    pub command_buffer: usize,
}

impl Default for EventLoopConfig {
    fn default() -> Self {
        Self {
            command_buffer: 256,
        }
    }
}

impl BridgeConfig {
    pub fn from_json_str(json: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&json)
    }

    /// Raises out-of-range values to their minimum.
    pub fn validated(mut self) -> Self {
        if self.forms.image_hack_delay_ms < MIN_IMAGE_HACK_DELAY_MS {
            tracing::warn!(
                configured = self.forms.image_hack_delay_ms,
                "image hack delay too short, using {MIN_IMAGE_HACK_DELAY_MS}ms"
            );
            self.forms.image_hack_delay_ms = MIN_IMAGE_HACK_DELAY_MS;
        }
        self.event_loop.command_buffer = self.event_loop.command_buffer.max(1);
        self
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            image_hack_delay: Duration::from_millis(self.forms.image_hack_delay_ms),
            command_buffer: self.event_loop.command_buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_object_is_default() {
        assert_eq!(BridgeConfig::from_json_str("{}").unwrap(), BridgeConfig::default());
    }

    #[test]
    fn test_partial_sections_keep_defaults() {
        let config = BridgeConfig::from_json_str(
            r#"{ "forward_player_ping": true, "forms": {} }"#,
        )
        .unwrap();
        assert!(config.forward_player_ping);
        assert_eq!(config.forms.image_hack_delay_ms, 500);
        assert_eq!(config.event_loop.command_buffer, 256);
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_validated_clamps() {
        let config = BridgeConfig::from_json_str(
            r#"{ "forms": { "image_hack_delay_ms": 10 }, "event_loop": { "command_buffer": 0 } }"#,
        )
        .unwrap()
        .validated();
        assert_eq!(config.forms.image_hack_delay_ms, 500);
        assert_eq!(config.event_loop.command_buffer, 1);
    }

    #[test]
    fn test_session_config() {
        let mut config = BridgeConfig::default();
        config.forms.image_hack_delay_ms = 750;
        let session = config.session_config();
        assert_eq!(session.image_hack_delay, Duration::from_millis(750));
        assert_eq!(session.command_buffer, 256);
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            BridgeConfig::from_json_str("{ nope"),
            Err(BridgeError::Config(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            BridgeConfig::from_file("/definitely/not/here.json"),
            Err(BridgeError::Io(_))
        ));
    }
}
