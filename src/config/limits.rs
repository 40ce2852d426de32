//! Chat output limits configuration.

use serde::Deserialize;

/// Chat output limits.
///
/// Long listings are split into messages of at most `max_message_len`
/// characters, and never more than `max_messages` of them per reply.
#[derive(Debug, Clone, Deserialize)]
pub struct LimitsConfig {
    /// Maximum characters per chat message (default: 500).
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    /// Maximum messages one long reply may produce (default: 2).
    #[serde(default = "default_max_messages")]
    pub max_messages: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_message_len: default_max_message_len(),
            max_messages: default_max_messages(),
        }
    }
}

fn default_max_message_len() -> usize {
    500
}

fn default_max_messages() -> usize {
    2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values_are_correct() {
        let limits = LimitsConfig::default();
        assert_eq!(limits.max_message_len, 500);
        assert_eq!(limits.max_messages, 2);
    }

    #[test]
    fn partial_section_keeps_other_default() {
        let limits: LimitsConfig = toml::from_str("max_messages = 5").unwrap();
        assert_eq!(limits.max_message_len, 500);
        assert_eq!(limits.max_messages, 5);
    }
}
