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

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use k8s_openapi::api::core::v1::PersistentVolumeClaim;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use volsnap::cli::display::TableRenderer;
    use volsnap::domain::config::{WaitPolicy, WorkflowSettings};
    use volsnap::infrastructure::kubernetes::resources::VolumeSnapshot;
    use volsnap::{
        ActionParams, SnapError, SnapshotKubeClient, SnapshotRecord, WorkflowExecutor,
        WorkflowOutcome,
    };

    /// Call counters and captured submissions, shared with the test body
    /// after the stub is boxed into the executor.
    #[derive(Default)]
    struct Calls {
        create_snapshot: AtomicUsize,
        create_pvc: AtomicUsize,
        list: AtomicUsize,
        get: AtomicUsize,
        snapshots_submitted: Mutex<Vec<VolumeSnapshot>>,
        pvcs_submitted: Mutex<Vec<PersistentVolumeClaim>>,
    }

    impl Calls {
        fn total(&self) -> usize {
            self.create_snapshot.load(Ordering::SeqCst)
                + self.create_pvc.load(Ordering::SeqCst)
                + self.list.load(Ordering::SeqCst)
                + self.get.load(Ordering::SeqCst)
        }
    }

    struct StubClient {
        calls: Arc<Calls>,
        records: Vec<SnapshotRecord>,
        /// Number of not-ready responses before get_snapshot reports ready.
        ready_after: usize,
        fail_create_pvc: Option<String>,
        response_delay: Option<Duration>,
    }

    impl StubClient {
        fn new(calls: Arc<Calls>) -> Self {
            Self {
                calls,
                records: Vec::new(),
                ready_after: 0,
                fail_create_pvc: None,
                response_delay: None,
            }
        }

        fn with_records(mut self, records: Vec<SnapshotRecord>) -> Self {
            self.records = records;
            self
        }

        fn with_ready_after(mut self, polls: usize) -> Self {
            self.ready_after = polls;
            self
        }

        fn with_pvc_failure(mut self, message: &str) -> Self {
            self.fail_create_pvc = Some(message.to_string());
            self
        }

        fn with_response_delay(mut self, delay: Duration) -> Self {
            self.response_delay = Some(delay);
            self
        }

        async fn delay(&self) {
            if let Some(delay) = self.response_delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    #[async_trait]
    impl SnapshotKubeClient for StubClient {
        async fn create_snapshot(&self, snapshot: &VolumeSnapshot) -> Result<String, SnapError> {
            self.delay().await;
            self.calls.create_snapshot.fetch_add(1, Ordering::SeqCst);
            let name = snapshot.metadata.name.clone().unwrap_or_default();
            self.calls
                .snapshots_submitted
                .lock()
                .unwrap()
                .push(snapshot.clone());
            Ok(name)
        }

        async fn create_pvc(&self, pvc: &PersistentVolumeClaim) -> Result<String, SnapError> {
            self.delay().await;
            self.calls.create_pvc.fetch_add(1, Ordering::SeqCst);
            if let Some(ref message) = self.fail_create_pvc {
                return Err(SnapError::Cluster(message.clone()));
            }
            let name = pvc.metadata.name.clone().unwrap_or_default();
            self.calls.pvcs_submitted.lock().unwrap().push(pvc.clone());
            Ok(name)
        }

        async fn list_snapshots(&self) -> Result<Vec<SnapshotRecord>, SnapError> {
            self.delay().await;
            self.calls.list.fetch_add(1, Ordering::SeqCst);
            Ok(self.records.clone())
        }

        async fn get_snapshot(&self, name: &str) -> Result<SnapshotRecord, SnapError> {
            self.delay().await;
            let polls = self.calls.get.fetch_add(1, Ordering::SeqCst);
            let record = self
                .records
                .iter()
                .find(|r| r.name == name)
                .cloned()
                .ok_or_else(|| SnapError::NotFound {
                    resource_type: "VolumeSnapshot".to_string(),
                    name: name.to_string(),
                    namespace: "default".to_string(),
                })?;
            Ok(SnapshotRecord {
                ready_to_use: polls >= self.ready_after,
                ..record
            })
        }
    }

    fn record(name: &str, source: &str, ready: bool) -> SnapshotRecord {
        SnapshotRecord {
            name: name.to_string(),
            source_pvc: source.to_string(),
            ready_to_use: ready,
            creation_timestamp: None,
        }
    }

    fn fast_settings() -> WorkflowSettings {
        WorkflowSettings {
            request_timeout: Duration::from_secs(5),
            wait: WaitPolicy {
                enabled: true,
                max_attempts: 5,
                min_delay: Duration::from_millis(1),
                max_delay: Duration::from_millis(2),
            },
            dry_run: false,
        }
    }

    fn executor(client: StubClient, settings: WorkflowSettings) -> WorkflowExecutor {
        WorkflowExecutor::new(Box::new(client), "default".to_string(), settings)
    }

    fn snapshot_params() -> ActionParams {
        ActionParams {
            pvc: Some("data-pvc".to_string()),
            snapshot: Some("snap-1".to_string()),
            ..Default::default()
        }
    }

    fn restore_params() -> ActionParams {
        ActionParams {
            pvc: Some("restored-pvc".to_string()),
            snapshot: Some("snap-1".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_snapshot_submits_and_reports_server_name() {
        let calls = Arc::new(Calls::default());
        let executor = executor(StubClient::new(calls.clone()), fast_settings());

        assert_eq!(executor.namespace(), "default");

        let outcome = executor
            .run("createSnapshot", &snapshot_params())
            .await
            .unwrap();

        assert_eq!(outcome, WorkflowOutcome::SnapshotCreated("snap-1".to_string()));
        assert_eq!(outcome.summary(), "Created snapshot: snap-1");
        assert_eq!(calls.create_snapshot.load(Ordering::SeqCst), 1);
        assert_eq!(calls.create_pvc.load(Ordering::SeqCst), 0);

        let submitted = calls.snapshots_submitted.lock().unwrap();
        assert_eq!(submitted.len(), 1);
        assert_eq!(submitted[0].metadata.name.as_deref(), Some("snap-1"));
        assert_eq!(submitted[0].metadata.namespace.as_deref(), Some("default"));
        assert_eq!(
            submitted[0]
                .spec
                .source
                .persistent_volume_claim_name
                .as_deref(),
            Some("data-pvc")
        );
    }

    #[tokio::test]
    async fn test_restore_submits_pvc_with_snapshot_data_source() {
        let calls = Arc::new(Calls::default());
        let client = StubClient::new(calls.clone())
            .with_records(vec![record("snap-1", "data-pvc", true)]);
        let executor = executor(client, fast_settings());

        let outcome = executor
            .run("createPVCFromSnapshot", &restore_params())
            .await
            .unwrap();

        assert_eq!(outcome, WorkflowOutcome::PvcCreated("restored-pvc".to_string()));
        assert_eq!(outcome.summary(), "Created PVC: restored-pvc");
        assert_eq!(calls.create_pvc.load(Ordering::SeqCst), 1);

        let submitted = calls.pvcs_submitted.lock().unwrap();
        let data_source = submitted[0]
            .spec
            .as_ref()
            .and_then(|s| s.data_source.as_ref())
            .expect("data source must be set");
        assert_eq!(data_source.name, "snap-1");
        assert_eq!(data_source.kind, "VolumeSnapshot");
    }

    #[tokio::test]
    async fn test_list_preserves_order_and_pairing() {
        let calls = Arc::new(Calls::default());
        let client = StubClient::new(calls.clone()).with_records(vec![
            record("s1", "p1", true),
            record("s2", "p2", false),
        ]);
        let executor = executor(client, fast_settings());

        let outcome = executor
            .run("listSnapshot", &ActionParams::default())
            .await
            .unwrap();

        let records = match outcome {
            WorkflowOutcome::Snapshots(records) => records,
            other => panic!("unexpected outcome: {:?}", other),
        };
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].name, "s1");
        assert_eq!(records[0].source_pvc, "p1");
        assert_eq!(records[1].name, "s2");
        assert_eq!(records[1].source_pvc, "p2");
        assert_eq!(calls.list.load(Ordering::SeqCst), 1);

        // One plain line per record, same order, correct pairing
        let plain = TableRenderer::render_plain(&records);
        let lines: Vec<&str> = plain.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "s1\tp1\tready");
        assert_eq!(lines[1], "s2\tp2\tpending");
    }

    #[tokio::test]
    async fn test_unknown_action_makes_no_cluster_calls() {
        for token in ["", "bogus"] {
            let calls = Arc::new(Calls::default());
            let executor = executor(StubClient::new(calls.clone()), fast_settings());

            let result = executor.run(token, &snapshot_params()).await;
            assert!(
                matches!(result, Err(SnapError::UnknownAction(ref t)) if t == token),
                "token {:?} should be rejected",
                token
            );
            assert_eq!(calls.total(), 0);
        }
    }

    #[tokio::test]
    async fn test_missing_pvc_fails_before_any_network_access() {
        let calls = Arc::new(Calls::default());
        let executor = executor(StubClient::new(calls.clone()), fast_settings());

        let params = ActionParams {
            snapshot: Some("snap-1".to_string()),
            ..Default::default()
        };
        let result = executor.run("createSnapshot", &params).await;

        assert!(matches!(
            result,
            Err(SnapError::MissingField { field: "pvc", .. })
        ));
        assert_eq!(calls.total(), 0);
    }

    #[tokio::test]
    async fn test_missing_snapshot_on_restore_fails_locally() {
        let calls = Arc::new(Calls::default());
        let executor = executor(StubClient::new(calls.clone()), fast_settings());

        let params = ActionParams {
            pvc: Some("restored-pvc".to_string()),
            ..Default::default()
        };
        let result = executor.run("createPVCFromSnapshot", &params).await;

        assert!(matches!(
            result,
            Err(SnapError::MissingField {
                field: "snapshot",
                ..
            })
        ));
        assert_eq!(calls.total(), 0);
    }

    #[tokio::test]
    async fn test_restore_waits_until_snapshot_ready() {
        let calls = Arc::new(Calls::default());
        let client = StubClient::new(calls.clone())
            .with_records(vec![record("snap-1", "data-pvc", false)])
            .with_ready_after(3);
        let executor = executor(client, fast_settings());

        let outcome = executor
            .run("createPVCFromSnapshot", &restore_params())
            .await
            .unwrap();

        assert_eq!(outcome, WorkflowOutcome::PvcCreated("restored-pvc".to_string()));
        // Three not-ready polls, then the ready one
        assert_eq!(calls.get.load(Ordering::SeqCst), 4);
        assert_eq!(calls.create_pvc.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_restore_times_out_when_snapshot_never_ready() {
        let calls = Arc::new(Calls::default());
        let client = StubClient::new(calls.clone())
            .with_records(vec![record("snap-1", "data-pvc", false)])
            .with_ready_after(usize::MAX);
        let mut settings = fast_settings();
        settings.wait.max_attempts = 2;
        let executor = executor(client, settings);

        let result = executor.run("createPVCFromSnapshot", &restore_params()).await;

        assert!(matches!(result, Err(SnapError::Timeout(_))));
        // The PVC must never be submitted against a snapshot that is not ready
        assert_eq!(calls.create_pvc.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_no_wait_skips_readiness_polling() {
        let calls = Arc::new(Calls::default());
        let client = StubClient::new(calls.clone())
            .with_records(vec![record("snap-1", "data-pvc", false)])
            .with_ready_after(usize::MAX);
        let mut settings = fast_settings();
        settings.wait.enabled = false;
        let executor = executor(client, settings);

        let outcome = executor
            .run("createPVCFromSnapshot", &restore_params())
            .await
            .unwrap();

        assert_eq!(outcome, WorkflowOutcome::PvcCreated("restored-pvc".to_string()));
        assert_eq!(calls.get.load(Ordering::SeqCst), 0);
        assert_eq!(calls.create_pvc.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cluster_error_is_passed_through_verbatim() {
        let calls = Arc::new(Calls::default());
        let client = StubClient::new(calls.clone())
            .with_records(vec![record("snap-1", "data-pvc", true)])
            .with_pvc_failure("admission webhook denied the request");
        let executor = executor(client, fast_settings());

        let result = executor.run("createPVCFromSnapshot", &restore_params()).await;

        match result {
            Err(SnapError::Cluster(message)) => {
                assert_eq!(message, "admission webhook denied the request");
            }
            other => panic!("unexpected result: {:?}", other),
        }
        // No rollback: nothing is deleted, the snapshot stays in place
        assert_eq!(calls.create_pvc.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_request_deadline_is_enforced() {
        let calls = Arc::new(Calls::default());
        let client = StubClient::new(calls.clone())
            .with_response_delay(Duration::from_millis(100));
        let mut settings = fast_settings();
        settings.request_timeout = Duration::from_millis(5);
        let executor = executor(client, settings);

        let result = executor.run("listSnapshot", &ActionParams::default()).await;
        assert!(matches!(result, Err(SnapError::Timeout(_))));
    }

    #[tokio::test]
    async fn test_dry_run_renders_without_submitting() {
        let calls = Arc::new(Calls::default());
        let mut settings = fast_settings();
        settings.dry_run = true;
        let executor = executor(StubClient::new(calls.clone()), settings);

        let outcome = executor
            .run("createSnapshot", &snapshot_params())
            .await
            .unwrap();

        match outcome {
            WorkflowOutcome::Rendered {
                kind,
                ref name,
                ref manifest,
            } => {
                assert_eq!(kind, "VolumeSnapshot");
                assert_eq!(name, "snap-1");
                assert!(manifest.contains("data-pvc"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(calls.total(), 0);
    }

    #[tokio::test]
    async fn test_dry_run_restore_renders_pvc_manifest() {
        let calls = Arc::new(Calls::default());
        let mut settings = fast_settings();
        settings.dry_run = true;
        let executor = executor(StubClient::new(calls.clone()), settings);

        let outcome = executor
            .run("createPVCFromSnapshot", &restore_params())
            .await
            .unwrap();

        match outcome {
            WorkflowOutcome::Rendered { kind, manifest, .. } => {
                assert_eq!(kind, "PersistentVolumeClaim");
                assert!(manifest.contains("snap-1"));
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
        assert_eq!(calls.total(), 0);
    }
}
