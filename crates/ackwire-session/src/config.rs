use std::path::Path;

use ackwire_frame::{FrameConfig, MAX_PAYLOAD};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};

/// Default acknowledgment timeout in milliseconds.
pub const DEFAULT_ACK_TIMEOUT_MS: u64 = 1000;

/// Default bound on transmission attempts.
pub const DEFAULT_MAX_RETRIES: u8 = 3;

/// Tunables for a transmitter/receiver pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LinkConfig {
    /// Maximum payload size in bytes, within 1..=255.
    pub max_payload_size: usize,
    /// How long the transmitter waits for an acknowledgment per attempt.
    pub ack_timeout_ms: u64,
    /// Retry bound: the session fails once the retry count reaches it.
    pub max_retries: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            max_payload_size: MAX_PAYLOAD,
            ack_timeout_ms: DEFAULT_ACK_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }
}

impl LinkConfig {
    /// Load and validate a configuration from a JSON file; missing fields
    /// take defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let config = Self::read_json_file(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse a JSON file without validating it, for callers that patch
    /// fields before use.
    pub fn read_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read(path)?;
        Ok(serde_json::from_slice(&raw)?)
    }

    /// Reject configurations the link cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.max_payload_size == 0 || self.max_payload_size > MAX_PAYLOAD {
            return Err(SessionError::Config(format!(
                "max_payload_size must be within 1..={MAX_PAYLOAD} (got {})",
                self.max_payload_size
            )));
        }
        if self.ack_timeout_ms == 0 {
            return Err(SessionError::Config(
                "ack_timeout_ms must be greater than zero".to_string(),
            ));
        }
        if self.max_retries == 0 {
            return Err(SessionError::Config(
                "max_retries must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Frame-level view of this configuration.
    pub fn frame_config(&self) -> FrameConfig {
        FrameConfig::with_max_payload(self.max_payload_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_protocol_constants() {
        let config = LinkConfig::default();
        assert_eq!(config.max_payload_size, 255);
        assert_eq!(config.ack_timeout_ms, 1000);
        assert_eq!(config.max_retries, 3);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: LinkConfig = serde_json::from_str(r#"{"ack_timeout_ms": 250}"#).unwrap();
        assert_eq!(config.ack_timeout_ms, 250);
        assert_eq!(config.max_retries, 3);
        assert_eq!(config.max_payload_size, 255);
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let result = serde_json::from_str::<LinkConfig>(r#"{"backoff": 2}"#);
        assert!(result.is_err());
    }

    #[test]
    fn validate_rejects_bad_values() {
        let bad = [
            LinkConfig {
                max_payload_size: 0,
                ..LinkConfig::default()
            },
            LinkConfig {
                max_payload_size: 256,
                ..LinkConfig::default()
            },
            LinkConfig {
                ack_timeout_ms: 0,
                ..LinkConfig::default()
            },
            LinkConfig {
                max_retries: 0,
                ..LinkConfig::default()
            },
        ];
        for config in bad {
            assert!(
                matches!(config.validate(), Err(SessionError::Config(_))),
                "{config:?}"
            );
        }
    }

    #[test]
    fn loads_from_file() {
        let dir = std::env::temp_dir().join(format!("ackwire-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("link.json");
        std::fs::write(&path, r#"{"max_retries": 5, "max_payload_size": 64}"#).unwrap();

        let config = LinkConfig::from_json_file(&path).unwrap();
        assert_eq!(config.max_retries, 5);
        assert_eq!(config.frame_config().max_payload_size, 64);

        std::fs::write(&path, r#"{"max_retries": 0}"#).unwrap();
        assert!(matches!(
            LinkConfig::from_json_file(&path),
            Err(SessionError::Config(_))
        ));

        let mut patched = LinkConfig::read_json_file(&path).unwrap();
        assert_eq!(patched.max_retries, 0);
        patched.max_retries = 2;
        assert!(patched.validate().is_ok());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
