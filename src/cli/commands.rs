// CLI command definitions

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "volsnap",
    version,
    about = "Snapshot and restore tool for Kubernetes persistent volume claims",
    long_about = "A standalone CLI tool for taking VolumeSnapshots of PVCs, listing them, and provisioning new PVCs from existing snapshots"
)]
pub struct CliArgs {
    /// Action to perform (createSnapshot, createPVCFromSnapshot, listSnapshot)
    #[arg(long, short = 'a')]
    pub action: String,

    /// Path to kubeconfig file (always explicit, no home-directory default)
    #[arg(long)]
    pub kubeconfig: String,

    /// Kubernetes context to use
    /// If not specified, uses current context from kubeconfig
    #[arg(long)]
    pub context: Option<String>,

    /// Kubernetes namespace
    /// If not specified, uses cluster.namespace from the config file, else "default"
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// PVC name (source for createSnapshot, target for createPVCFromSnapshot)
    #[arg(long, short = 'p')]
    pub pvc: Option<String>,

    /// Snapshot name (target for createSnapshot, source for createPVCFromSnapshot)
    #[arg(long, short = 's')]
    pub snapshot: Option<String>,

    /// VolumeSnapshotClass for createSnapshot
    /// If not specified, the cluster's default snapshot class applies
    #[arg(long)]
    pub snapshot_class: Option<String>,

    /// StorageClass for the restored PVC
    /// If not specified, the cluster's default storage class applies
    #[arg(long)]
    pub storage_class: Option<String>,

    /// Requested size of the restored PVC (e.g. "5Gi"; default "1Gi")
    #[arg(long)]
    pub size: Option<String>,

    /// Access mode for the restored PVC (repeatable; default ReadWriteOnce)
    #[arg(long = "access-mode", value_name = "MODE")]
    pub access_modes: Vec<String>,

    /// Do not wait for the source snapshot to become ready before restoring
    #[arg(long)]
    pub no_wait: bool,

    /// Maximum readiness poll attempts before giving up
    #[arg(long)]
    pub wait_attempts: Option<usize>,

    /// Per-request deadline in seconds for cluster calls
    #[arg(long, value_name = "SECS")]
    pub request_timeout: Option<u64>,

    /// Path to volsnap configuration file (volsnap.toml)
    /// If not provided, the VOLSNAP_CONF_FILE environment variable is
    /// consulted, else built-in defaults apply
    #[arg(long, value_name = "PATH")]
    pub config_file: Option<String>,

    /// Output format for listSnapshot
    #[arg(long, short = 'o', value_enum, default_value_t = OutputFormat::Table)]
    pub output: OutputFormat,

    /// Build and print the resource manifest without submitting it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Formatted table with readiness and age
    Table,
    /// One line per record: name, source PVC, readiness
    Plain,
    /// JSON array of snapshot records
    Json,
}
