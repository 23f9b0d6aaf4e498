//! Composition kinds bound to extension points.

use serde::{Deserialize, Serialize};

/// How the handlers registered against one extension point are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompositionKind {
    /// Every handler appends to a running collection.
    Accumulate,
    /// Every handler's output is the next handler's input.
    Transform,
    /// Handlers run for side effects only.
    Notify,
}

impl CompositionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompositionKind::Accumulate => "accumulate",
            CompositionKind::Transform => "transform",
            CompositionKind::Notify => "notify",
        }
    }
}

impl std::fmt::Display for CompositionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CompositionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "accumulate" | "add" => Ok(CompositionKind::Accumulate),
            "transform" | "modify" => Ok(CompositionKind::Transform),
            "notify" | "event" => Ok(CompositionKind::Notify),
            other => Err(format!("Invalid composition kind: {}", other)),
        }
    }
}
