use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HintSeverity {
    Error,
    Warning,
    Info,
    Pedantic,
}

impl HintSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            HintSeverity::Error => "error",
            HintSeverity::Warning => "warning",
            HintSeverity::Info => "info",
            HintSeverity::Pedantic => "pedantic",
        }
    }
}

impl std::fmt::Display for HintSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A diagnostic raised while composing a unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    pub tag: String,
    pub severity: HintSeverity,
    #[serde(default, rename = "variables", skip_serializing_if = "BTreeMap::is_empty")]
    pub vars: BTreeMap<String, String>,
}

impl Hint {
    pub fn new(tag: impl Into<String>, severity: HintSeverity) -> Self {
        Self {
            tag: tag.into(),
            severity,
            vars: BTreeMap::new(),
        }
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }
}
