use serde::{Deserialize, Serialize};

/// A locale configured in an environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Locale {
    pub code: String,
    pub name: String,
    /// Exactly one locale per snapshot carries `default = true`
    #[serde(default)]
    pub default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_code: Option<String>,
}

impl Locale {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            default: false,
            fallback_code: None,
        }
    }

    /// Same locale, flagged as the default
    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }
}
