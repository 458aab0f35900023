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

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Raw parameter bag collected from the CLI and config file before
/// validation. All fields are optional here; the per-action requirements
/// are enforced by `ActionValidator`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActionParams {
    pub pvc: Option<String>,
    pub snapshot: Option<String>,
    pub snapshot_class: Option<String>,
    pub storage_class: Option<String>,
    pub size: Option<String>,
    pub access_modes: Vec<String>,
}

/// Request to snapshot an existing PVC.
///
/// `name` and `source_pvc` are immutable once submitted; the cluster owns
/// the resulting object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotRequest {
    pub name: String,
    pub source_pvc: String,
    /// Omitted: the cluster's default VolumeSnapshotClass applies.
    pub snapshot_class: Option<String>,
}

/// Request to provision a new PVC from an existing snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreRequest {
    pub pvc_name: String,
    pub source_snapshot: String,
    /// Omitted: the cluster's default StorageClass applies.
    pub storage_class: Option<String>,
    /// Omitted: the builder falls back to the documented default size.
    pub requested_size: Option<String>,
    /// Empty: single-writer access.
    pub access_modes: Vec<AccessMode>,
}

/// A validated action. Each variant carries only the fields relevant to
/// it, so later stages can never see an incomplete request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidatedAction {
    CreateSnapshot(SnapshotRequest),
    CreatePvcFromSnapshot(RestoreRequest),
    ListSnapshots,
}

/// Read model of a cluster-side snapshot, observed only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotRecord {
    pub name: String,
    pub source_pvc: String,
    pub ready_to_use: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<DateTime<Utc>>,
}

/// PVC access mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    ReadWriteOnce,
    ReadOnlyMany,
    ReadWriteMany,
    ReadWriteOncePod,
}

impl AccessMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccessMode::ReadWriteOnce => "ReadWriteOnce",
            AccessMode::ReadOnlyMany => "ReadOnlyMany",
            AccessMode::ReadWriteMany => "ReadWriteMany",
            AccessMode::ReadWriteOncePod => "ReadWriteOncePod",
        }
    }
}

impl Default for AccessMode {
    fn default() -> Self {
        AccessMode::ReadWriteOnce
    }
}

impl std::str::FromStr for AccessMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ReadWriteOnce" => Ok(AccessMode::ReadWriteOnce),
            "ReadOnlyMany" => Ok(AccessMode::ReadOnlyMany),
            "ReadWriteMany" => Ok(AccessMode::ReadWriteMany),
            "ReadWriteOncePod" => Ok(AccessMode::ReadWriteOncePod),
            _ => Err(format!(
                "Invalid access mode: {} (expected ReadWriteOnce, ReadOnlyMany, ReadWriteMany or ReadWriteOncePod)",
                s
            )),
        }
    }
}
