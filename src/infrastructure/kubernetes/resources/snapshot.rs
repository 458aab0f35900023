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

use crate::domain::workflow::action::SnapshotRequest;
use crate::infrastructure::constants::{
    COMPONENT_SNAPSHOT, LABEL_COMPONENT, LABEL_MANAGED_BY, MANAGED_BY_VALUE,
};
use crate::infrastructure::kubernetes::resources::volumesnapshot::{
    VolumeSnapshot, VolumeSnapshotSource, VolumeSnapshotSpec,
};
use std::collections::BTreeMap;

/// Maps a validated snapshot request onto a declarative VolumeSnapshot.
///
/// Total over validated input: `build` cannot fail, and equal requests
/// produce structurally equal manifests.
pub struct SnapshotBuilder<'a> {
    request: &'a SnapshotRequest,
    namespace: &'a str,
}

impl<'a> SnapshotBuilder<'a> {
    pub fn new(request: &'a SnapshotRequest, namespace: &'a str) -> Self {
        Self { request, namespace }
    }

    pub fn build(&self) -> VolumeSnapshot {
        let mut snapshot = VolumeSnapshot::new(
            &self.request.name,
            VolumeSnapshotSpec {
                source: VolumeSnapshotSource {
                    persistent_volume_claim_name: Some(self.request.source_pvc.clone()),
                    volume_snapshot_content_name: None,
                },
                // None is serialized as an absent field, so the cluster's
                // default VolumeSnapshotClass applies.
                volume_snapshot_class_name: self.request.snapshot_class.clone(),
            },
        );

        snapshot.metadata.namespace = Some(self.namespace.to_string());
        snapshot.metadata.labels = Some(self.get_labels());
        snapshot
    }

    pub fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_MANAGED_BY.to_string(), MANAGED_BY_VALUE.to_string());
        labels.insert(LABEL_COMPONENT.to_string(), COMPONENT_SNAPSHOT.to_string());
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> SnapshotRequest {
        SnapshotRequest {
            name: "snap-1".to_string(),
            source_pvc: "data-pvc".to_string(),
            snapshot_class: None,
        }
    }

    #[test]
    fn test_build_names_snapshot_and_source() {
        let request = request();
        let snapshot = SnapshotBuilder::new(&request, "default").build();

        assert_eq!(snapshot.metadata.name.as_deref(), Some("snap-1"));
        assert_eq!(snapshot.metadata.namespace.as_deref(), Some("default"));
        assert_eq!(
            snapshot.spec.source.persistent_volume_claim_name.as_deref(),
            Some("data-pvc")
        );
        assert_eq!(snapshot.spec.source.volume_snapshot_content_name, None);
        assert_eq!(snapshot.spec.volume_snapshot_class_name, None);
    }

    #[test]
    fn test_build_sets_class_when_provided() {
        let request = SnapshotRequest {
            snapshot_class: Some("csi-hostpath-snapclass".to_string()),
            ..request()
        };
        let snapshot = SnapshotBuilder::new(&request, "storage").build();
        assert_eq!(
            snapshot.spec.volume_snapshot_class_name.as_deref(),
            Some("csi-hostpath-snapclass")
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let request = request();
        let first = SnapshotBuilder::new(&request, "default").build();
        let second = SnapshotBuilder::new(&request, "default").build();
        assert_eq!(
            serde_json::to_value(&first).unwrap(),
            serde_json::to_value(&second).unwrap()
        );
    }

    #[test]
    fn test_labels() {
        let request = request();
        let labels = SnapshotBuilder::new(&request, "default").get_labels();
        assert_eq!(
            labels.get("app.kubernetes.io/managed-by").map(String::as_str),
            Some("volsnap")
        );
        assert_eq!(
            labels.get("app.kubernetes.io/component").map(String::as_str),
            Some("snapshot")
        );
    }
}
