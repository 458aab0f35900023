//! Action execution: config resolution, client construction, dispatch

use crate::cli::commands::{CliArgs, OutputFormat};
use crate::cli::display::TableRenderer;
use crate::domain::config::{SnapConf, WaitPolicy, WorkflowSettings};
use crate::domain::workflow::action::{ActionParams, SnapshotRecord};
use crate::domain::workflow::executor::{WorkflowExecutor, WorkflowOutcome};
use crate::domain::workflow::validator::ActionValidator;
use crate::infrastructure::kubernetes::client::SnapshotKubeClientImpl;
use std::time::Duration;

impl CliArgs {
    pub async fn execute(&self) -> anyhow::Result<()> {
        let conf = SnapConf::load(self.config_file.as_deref())
            .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

        // Priority: command line > config file > defaults
        let namespace = self
            .namespace
            .clone()
            .unwrap_or_else(|| conf.cluster.namespace.clone());
        let context = self.context.clone().or_else(|| conf.cluster.context.clone());

        let params = self.resolve_params(&conf);
        let settings = self.resolve_settings(&conf);

        // Validation failures must surface before the kubeconfig is even read.
        ActionValidator::validate(&self.action, &params).map_err(|e| self.with_context(e))?;

        let client = SnapshotKubeClientImpl::new_with_config(
            namespace.clone(),
            self.kubeconfig.clone(),
            context,
        )
        .await
        .map_err(|e| anyhow::anyhow!("Failed to create Kubernetes client: {}", e))?;

        let executor = WorkflowExecutor::new(Box::new(client), namespace.clone(), settings);

        let outcome = executor
            .run(&self.action, &params)
            .await
            .map_err(|e| self.with_context(e))?;

        match outcome {
            WorkflowOutcome::SnapshotCreated(_) | WorkflowOutcome::PvcCreated(_) => {
                println!("{}", outcome.summary());
            }
            WorkflowOutcome::Rendered {
                kind,
                name,
                ref manifest,
            } => {
                println!("# {} '{}' (not submitted)", kind, name);
                print!("{}", manifest);
            }
            WorkflowOutcome::Snapshots(ref records) => {
                self.print_snapshots(records, &namespace)?;
            }
        }

        Ok(())
    }

    fn print_snapshots(&self, records: &[SnapshotRecord], namespace: &str) -> anyhow::Result<()> {
        match self.output {
            OutputFormat::Table => {
                if records.is_empty() {
                    println!("No snapshots found in namespace '{}'", namespace);
                } else {
                    let renderer = TableRenderer::new();
                    println!("{}", renderer.render_snapshot_list(records));
                }
            }
            OutputFormat::Plain => {
                let rendered = TableRenderer::render_plain(records);
                if !rendered.is_empty() {
                    println!("{}", rendered);
                }
            }
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(records)?);
            }
        }
        Ok(())
    }

    /// Attach action/resource context so a failure is diagnosable from the
    /// single stderr line.
    fn with_context(&self, err: crate::shared::SnapError) -> anyhow::Error {
        match self.snapshot.as_deref().or(self.pvc.as_deref()) {
            Some(resource) => anyhow::anyhow!("{} '{}': {}", self.action, resource, err),
            None => anyhow::anyhow!("{}: {}", self.action, err),
        }
    }

    fn resolve_params(&self, conf: &SnapConf) -> ActionParams {
        ActionParams {
            pvc: self.pvc.clone(),
            snapshot: self.snapshot.clone(),
            snapshot_class: self.snapshot_class.clone().or_else(|| conf.snapshot.class.clone()),
            storage_class: self
                .storage_class
                .clone()
                .or_else(|| conf.restore.storage_class.clone()),
            size: self.size.clone().or_else(|| conf.restore.size.clone()),
            access_modes: if self.access_modes.is_empty() {
                conf.restore.access_modes.clone()
            } else {
                self.access_modes.clone()
            },
        }
    }

    fn resolve_settings(&self, conf: &SnapConf) -> WorkflowSettings {
        WorkflowSettings {
            request_timeout: Duration::from_secs(
                self.request_timeout.unwrap_or(conf.request.timeout_secs),
            ),
            wait: WaitPolicy {
                enabled: conf.wait.enabled && !self.no_wait,
                max_attempts: self.wait_attempts.unwrap_or(conf.wait.max_attempts),
                min_delay: Duration::from_secs(conf.wait.min_delay_secs),
                max_delay: Duration::from_secs(conf.wait.max_delay_secs),
            },
            dry_run: self.dry_run,
        }
    }
}
