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

/// Snapshot API coordinates
pub const SNAPSHOT_API_GROUP: &str = "snapshot.storage.k8s.io";
pub const KIND_VOLUME_SNAPSHOT: &str = "VolumeSnapshot";
pub const KIND_PVC: &str = "PersistentVolumeClaim";

/// Action tokens
pub const ACTION_CREATE_SNAPSHOT: &str = "createSnapshot";
pub const ACTION_CREATE_PVC_FROM_SNAPSHOT: &str = "createPVCFromSnapshot";
pub const ACTION_LIST_SNAPSHOTS: &str = "listSnapshot";

/// Default resource settings
pub const DEFAULT_NAMESPACE: &str = "default";
pub const DEFAULT_RESTORE_SIZE: &str = "1Gi";

/// Readiness wait settings
pub const DEFAULT_WAIT_ATTEMPTS: usize = 30;
pub const DEFAULT_WAIT_MIN_DELAY_SECS: u64 = 1;
pub const DEFAULT_WAIT_MAX_DELAY_SECS: u64 = 10;

/// Per-request deadline for cluster calls
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Resource labels
pub const LABEL_MANAGED_BY: &str = "app.kubernetes.io/managed-by";
pub const LABEL_COMPONENT: &str = "app.kubernetes.io/component";
pub const MANAGED_BY_VALUE: &str = "volsnap";
pub const COMPONENT_SNAPSHOT: &str = "snapshot";
pub const COMPONENT_RESTORE: &str = "restore";

/// Configuration file
pub const CONF_FILE_ENV: &str = "VOLSNAP_CONF_FILE";
