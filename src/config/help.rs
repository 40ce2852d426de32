//! Help rendering configuration.

use serde::Deserialize;
use std::collections::HashMap;

/// Help output settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HelpConfig {
    /// URL prefix for commands with the `HelpLink` flag. The command's
    /// name is appended.
    #[serde(default)]
    pub link_base: Option<String>,
    /// Link placeholders: `%beatsaver%` expands to `links["beatsaver"]`.
    #[serde(default)]
    pub links: HashMap<String, String>,
}
