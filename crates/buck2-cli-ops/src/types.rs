use serde::{Deserialize, Serialize};

/// A target query scoped to an optional host platform and build mode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetQuery {
    /// Target label or pattern, e.g. `//app:server` or `//lib/...`.
    pub target: String,
    /// Value for `--fake-host` (`linux`, `macos`, `windows`).
    #[serde(default)]
    pub host: Option<String>,
    /// Mode flagfile, with or without the leading `@`.
    #[serde(default)]
    pub mode: Option<String>,
}

impl TargetQuery {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    pub fn mode(mut self, mode: impl Into<String>) -> Self {
        self.mode = Some(mode.into());
        self
    }
}

/// Output of `buck2 audit providers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvidersResult {
    pub target: String,
    pub output: String,
}
