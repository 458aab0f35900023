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

use crate::domain::config::WorkflowSettings;
use crate::domain::workflow::action::{ActionParams, SnapshotRecord, ValidatedAction};
use crate::domain::workflow::validator::ActionValidator;
use crate::infrastructure::constants::{KIND_PVC, KIND_VOLUME_SNAPSHOT};
use crate::infrastructure::kubernetes::client::SnapshotKubeClient;
use crate::infrastructure::kubernetes::resources::{RestoredPvcBuilder, SnapshotBuilder};
use crate::shared::error::{Result, SnapError};
use backon::{ExponentialBuilder, Retryable};
use std::future::Future;
use tracing::{debug, info};

/// Result of a completed workflow run.
#[derive(Debug, Clone, PartialEq)]
pub enum WorkflowOutcome {
    /// Server-assigned name of the created snapshot.
    SnapshotCreated(String),
    /// Server-assigned name of the created PVC.
    PvcCreated(String),
    /// Snapshot records in server order.
    Snapshots(Vec<SnapshotRecord>),
    /// Dry-run: the manifest that would have been submitted.
    Rendered {
        kind: &'static str,
        name: String,
        manifest: String,
    },
}

impl WorkflowOutcome {
    /// One-line, user-facing result summary.
    pub fn summary(&self) -> String {
        match self {
            WorkflowOutcome::SnapshotCreated(name) => format!("Created snapshot: {}", name),
            WorkflowOutcome::PvcCreated(name) => format!("Created PVC: {}", name),
            WorkflowOutcome::Snapshots(records) => {
                format!("Found {} snapshot(s)", records.len())
            }
            WorkflowOutcome::Rendered { kind, name, .. } => {
                format!("Rendered {} '{}' (not submitted)", kind, name)
            }
        }
    }
}

/// Sequences one action through validation, resource build and a single
/// submission against the cluster client.
///
/// Exactly one cluster mutation per invocation (zero for list). Errors are
/// terminal: no retry of mutations, no rollback of resources created by
/// earlier invocations.
pub struct WorkflowExecutor {
    client: Box<dyn SnapshotKubeClient>,
    namespace: String,
    settings: WorkflowSettings,
}

impl WorkflowExecutor {
    pub fn new(
        client: Box<dyn SnapshotKubeClient>,
        namespace: String,
        settings: WorkflowSettings,
    ) -> Self {
        Self {
            client,
            namespace,
            settings,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Run one action to completion: validate, build, submit, report.
    pub async fn run(&self, action: &str, params: &ActionParams) -> Result<WorkflowOutcome> {
        debug!(action, "validating action");
        let validated = ActionValidator::validate(action, params)?;

        match validated {
            ValidatedAction::CreateSnapshot(request) => {
                let snapshot = SnapshotBuilder::new(&request, &self.namespace).build();
                if self.settings.dry_run {
                    return Ok(WorkflowOutcome::Rendered {
                        kind: KIND_VOLUME_SNAPSHOT,
                        name: request.name.clone(),
                        manifest: serde_yaml::to_string(&snapshot)?,
                    });
                }

                debug!(
                    name = %request.name,
                    source_pvc = %request.source_pvc,
                    "submitting snapshot request"
                );
                let server_name = self
                    .submit("create snapshot", self.client.create_snapshot(&snapshot))
                    .await?;
                Ok(WorkflowOutcome::SnapshotCreated(server_name))
            }

            ValidatedAction::CreatePvcFromSnapshot(request) => {
                let pvc = RestoredPvcBuilder::new(&request, &self.namespace).build();
                if self.settings.dry_run {
                    return Ok(WorkflowOutcome::Rendered {
                        kind: KIND_PVC,
                        name: request.pvc_name.clone(),
                        manifest: serde_yaml::to_string(&pvc)?,
                    });
                }

                if self.settings.wait.enabled {
                    self.wait_until_ready(&request.source_snapshot).await?;
                }

                debug!(
                    name = %request.pvc_name,
                    snapshot = %request.source_snapshot,
                    "submitting restore request"
                );
                let server_name = self
                    .submit("create PVC", self.client.create_pvc(&pvc))
                    .await?;
                Ok(WorkflowOutcome::PvcCreated(server_name))
            }

            ValidatedAction::ListSnapshots => {
                let records = self
                    .submit("list snapshots", self.client.list_snapshots())
                    .await?;
                Ok(WorkflowOutcome::Snapshots(records))
            }
        }
    }

    /// Poll the snapshot until the cluster reports it ready to use.
    ///
    /// Restoring from a snapshot that has not finished materializing is
    /// rejected by the CSI layer with a retryable error, so the wait runs
    /// before the PVC is submitted. Bounded by `wait.max_attempts` with
    /// capped exponential backoff.
    async fn wait_until_ready(&self, name: &str) -> Result<SnapshotRecord> {
        info!(snapshot = %name, "waiting for snapshot to become ready to use");

        let backoff = ExponentialBuilder::default()
            .with_min_delay(self.settings.wait.min_delay)
            .with_max_delay(self.settings.wait.max_delay)
            .with_max_times(self.settings.wait.max_attempts);

        let check = || async {
            let record = self
                .submit("get snapshot", self.client.get_snapshot(name))
                .await?;
            if record.ready_to_use {
                Ok(record)
            } else {
                Err(SnapError::NotReady(name.to_string()))
            }
        };

        check
            .retry(&backoff)
            .when(|err| matches!(err, SnapError::NotReady(_)))
            .notify(|err, delay| debug!(?delay, "{}, retrying", err))
            .await
            .map_err(|err| match err {
                SnapError::NotReady(name) => SnapError::Timeout(format!(
                    "snapshot '{}' did not become ready to use within {} attempts",
                    name, self.settings.wait.max_attempts
                )),
                other => other,
            })
    }

    /// Apply the caller-imposed deadline to a single cluster call.
    async fn submit<T>(
        &self,
        what: &'static str,
        call: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        match tokio::time::timeout(self.settings.request_timeout, call).await {
            Ok(result) => result,
            Err(_) => Err(SnapError::Timeout(format!(
                "{} did not complete within {:?}",
                what, self.settings.request_timeout
            ))),
        }
    }
}
