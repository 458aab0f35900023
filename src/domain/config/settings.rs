// Copyright 2025 JiangLong.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use crate::infrastructure::constants::{
    CONF_FILE_ENV, DEFAULT_NAMESPACE, DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_WAIT_ATTEMPTS,
    DEFAULT_WAIT_MAX_DELAY_SECS, DEFAULT_WAIT_MIN_DELAY_SECS,
};
use crate::shared::error::{Result, SnapError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tool configuration, loaded from a TOML file (volsnap.toml).
///
/// Every value has a built-in default; the CLI overrides individual
/// fields, so a config file is never required.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapConf {
    pub cluster: ClusterSection,
    pub snapshot: SnapshotSection,
    pub restore: RestoreSection,
    pub wait: WaitSection,
    pub request: RequestSection,
}

impl SnapConf {
    /// Load from an explicit path, else the VOLSNAP_CONF_FILE environment
    /// variable, else built-in defaults.
    pub fn load(path: Option<&str>) -> Result<Self> {
        if let Some(path) = path {
            return Self::from_file(path);
        }
        if let Ok(env_path) = std::env::var(CONF_FILE_ENV) {
            return Self::from_file(&env_path);
        }
        Ok(Self::default())
    }

    pub fn from_file(path: &str) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            SnapError::config_error(format!("Failed to read config file '{}': {}", path, e))
        })?;
        let conf: SnapConf = toml::from_str(&text)?;
        Ok(conf)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClusterSection {
    pub namespace: String,
    pub context: Option<String>,
}

impl Default for ClusterSection {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            context: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotSection {
    /// VolumeSnapshotClass name; None lets the cluster default apply.
    pub class: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RestoreSection {
    /// StorageClass name; None lets the cluster default apply.
    pub storage_class: Option<String>,
    pub size: Option<String>,
    pub access_modes: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WaitSection {
    pub enabled: bool,
    pub max_attempts: usize,
    pub min_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for WaitSection {
    fn default() -> Self {
        Self {
            enabled: true,
            max_attempts: DEFAULT_WAIT_ATTEMPTS,
            min_delay_secs: DEFAULT_WAIT_MIN_DELAY_SECS,
            max_delay_secs: DEFAULT_WAIT_MAX_DELAY_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestSection {
    pub timeout_secs: u64,
}

impl Default for RequestSection {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

/// Readiness-wait policy for the restore path.
#[derive(Debug, Clone, PartialEq)]
pub struct WaitPolicy {
    pub enabled: bool,
    pub max_attempts: usize,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        WaitSection::default().to_policy()
    }
}

impl WaitSection {
    pub fn to_policy(&self) -> WaitPolicy {
        WaitPolicy {
            enabled: self.enabled,
            max_attempts: self.max_attempts,
            min_delay: Duration::from_secs(self.min_delay_secs),
            max_delay: Duration::from_secs(self.max_delay_secs),
        }
    }
}

/// Runtime settings threaded into the workflow executor.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowSettings {
    /// Caller-imposed deadline applied to every cluster call.
    pub request_timeout: Duration,
    pub wait: WaitPolicy,
    /// Build and render the resource instead of submitting it.
    pub dry_run: bool,
}

impl Default for WorkflowSettings {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            wait: WaitPolicy::default(),
            dry_run: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let conf = SnapConf::default();
        assert_eq!(conf.cluster.namespace, "default");
        assert_eq!(conf.cluster.context, None);
        assert_eq!(conf.snapshot.class, None);
        assert_eq!(conf.restore.size, None);
        assert!(conf.wait.enabled);
        assert_eq!(conf.wait.max_attempts, 30);
        assert_eq!(conf.request.timeout_secs, 30);
    }

    #[test]
    fn test_parse_full_config() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
[cluster]
namespace = "storage"
context = "prod"

[snapshot]
class = "csi-hostpath-snapclass"

[restore]
storage_class = "fast-ssd"
size = "20Gi"
access_modes = ["ReadWriteMany"]

[wait]
enabled = false
max_attempts = 5

[request]
timeout_secs = 10
"#
        )
        .unwrap();

        let conf = SnapConf::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(conf.cluster.namespace, "storage");
        assert_eq!(conf.cluster.context.as_deref(), Some("prod"));
        assert_eq!(conf.snapshot.class.as_deref(), Some("csi-hostpath-snapclass"));
        assert_eq!(conf.restore.storage_class.as_deref(), Some("fast-ssd"));
        assert_eq!(conf.restore.size.as_deref(), Some("20Gi"));
        assert_eq!(conf.restore.access_modes, vec!["ReadWriteMany".to_string()]);
        assert!(!conf.wait.enabled);
        assert_eq!(conf.wait.max_attempts, 5);
        // Unspecified fields keep their defaults
        assert_eq!(conf.wait.min_delay_secs, 1);
        assert_eq!(conf.request.timeout_secs, 10);
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[cluster]\nnamespace = \"team-a\"\n").unwrap();

        let conf = SnapConf::from_file(file.path().to_str().unwrap()).unwrap();
        assert_eq!(conf.cluster.namespace, "team-a");
        assert!(conf.wait.enabled);
        assert_eq!(conf.request.timeout_secs, 30);
    }

    #[test]
    fn test_missing_file_is_config_error() {
        let result = SnapConf::from_file("/nonexistent/volsnap.toml");
        assert!(matches!(result, Err(SnapError::Config(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "[cluster\nnamespace=").unwrap();

        let result = SnapConf::from_file(file.path().to_str().unwrap());
        assert!(matches!(result, Err(SnapError::TomlParse(_))));
    }

    #[test]
    fn test_wait_section_to_policy() {
        let section = WaitSection {
            enabled: true,
            max_attempts: 7,
            min_delay_secs: 2,
            max_delay_secs: 8,
        };
        let policy = section.to_policy();
        assert_eq!(policy.max_attempts, 7);
        assert_eq!(policy.min_delay, Duration::from_secs(2));
        assert_eq!(policy.max_delay, Duration::from_secs(8));
    }
}
