//! Codec configuration
//!
//! Decode-time limits and tolerance policy. A `CodecConfig` rides along with
//! every encoder and decoder (and every nested open-type decoder), so generated
//! types never take it as a parameter.

use serde::{Deserialize, Serialize};

use crate::error::{PerError, PerResult};

/// 16 fragments of 64K: larger than any 3GPP message container.
pub const DEFAULT_MAX_LENGTH: usize = 16 * 65536;

/// Default encoder capacity in octets.
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 16 * 65536;

/// Default limit on nested CHOICE decoding.
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// What to do with an extension group or IE whose length prefix disagrees
/// with its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedExtensionPolicy {
    /// Fail the message with `MalformedExtension`.
    #[default]
    Reject,
    /// Drop the offending group/IE and continue at its boundary.
    Skip,
}

/// What to do with IEs whose id is not in the container's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownIePolicy {
    /// Keep them as raw (id, criticality, octets) triples.
    #[default]
    Preserve,
    /// Discard them.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Ceiling on any decoded length determinant or element count.
    pub max_length: usize,
    /// Capacity of encoders built from this config.
    pub max_message_bytes: usize,
    /// Recursion limit for self-referential CHOICE types.
    pub max_depth: usize,
    pub malformed_extension: MalformedExtensionPolicy,
    pub unknown_ies: UnknownIePolicy,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_length: DEFAULT_MAX_LENGTH,
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
            max_depth: DEFAULT_MAX_DEPTH,
            malformed_extension: MalformedExtensionPolicy::Reject,
            unknown_ies: UnknownIePolicy::Preserve,
        }
    }
}

impl CodecConfig {
    /// Parse a codec section from YAML, e.g.
    ///
    /// ```yaml
    /// max_length: 4096
    /// malformed_extension: skip
    /// unknown_ies: drop
    /// ```
    pub fn from_yaml_str(yaml: &str) -> PerResult<Self> {
        let config: CodecConfig =
            serde_yaml::from_str(yaml).map_err(|e| PerError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PerResult<()> {
        if self.max_length == 0 {
            return Err(PerError::Config("max_length must be non-zero".to_string()));
        }
        if self.max_message_bytes == 0 {
            return Err(PerError::Config(
                "max_message_bytes must be non-zero".to_string(),
            ));
        }
        if self.max_depth == 0 {
            return Err(PerError::Config("max_depth must be non-zero".to_string()));
        }
        Ok(())
    }

    pub fn skip_malformed(&self) -> bool {
        self.malformed_extension == MalformedExtensionPolicy::Skip
    }
}
