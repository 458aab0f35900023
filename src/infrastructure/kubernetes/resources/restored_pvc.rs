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

use crate::domain::workflow::action::{AccessMode, RestoreRequest};
use crate::infrastructure::constants::{
    COMPONENT_RESTORE, DEFAULT_RESTORE_SIZE, KIND_VOLUME_SNAPSHOT, LABEL_COMPONENT,
    LABEL_MANAGED_BY, MANAGED_BY_VALUE, SNAPSHOT_API_GROUP,
};
use k8s_openapi::api::core::v1::{
    PersistentVolumeClaim, PersistentVolumeClaimSpec, TypedLocalObjectReference,
    VolumeResourceRequirements,
};
use k8s_openapi::apimachinery::pkg::api::resource::Quantity;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::BTreeMap;

/// Maps a validated restore request onto a declarative PVC whose data
/// source points at the snapshot.
///
/// Total over validated input: `build` cannot fail. Size and access mode
/// fall back to the documented defaults when the request leaves them
/// unset.
pub struct RestoredPvcBuilder<'a> {
    request: &'a RestoreRequest,
    namespace: &'a str,
}

impl<'a> RestoredPvcBuilder<'a> {
    pub fn new(request: &'a RestoreRequest, namespace: &'a str) -> Self {
        Self { request, namespace }
    }

    pub fn build(&self) -> PersistentVolumeClaim {
        let size = self
            .request
            .requested_size
            .clone()
            .unwrap_or_else(|| DEFAULT_RESTORE_SIZE.to_string());

        let access_modes: Vec<String> = if self.request.access_modes.is_empty() {
            vec![AccessMode::default().as_str().to_string()]
        } else {
            self.request
                .access_modes
                .iter()
                .map(|mode| mode.as_str().to_string())
                .collect()
        };

        PersistentVolumeClaim {
            metadata: ObjectMeta {
                name: Some(self.request.pvc_name.clone()),
                namespace: Some(self.namespace.to_string()),
                labels: Some(self.get_labels()),
                ..Default::default()
            },
            spec: Some(PersistentVolumeClaimSpec {
                access_modes: Some(access_modes),
                // The data source names the snapshot, never a PVC.
                data_source: Some(TypedLocalObjectReference {
                    api_group: Some(SNAPSHOT_API_GROUP.to_string()),
                    kind: KIND_VOLUME_SNAPSHOT.to_string(),
                    name: self.request.source_snapshot.clone(),
                }),
                storage_class_name: self.request.storage_class.clone(),
                resources: Some(VolumeResourceRequirements {
                    requests: Some({
                        let mut reqs = BTreeMap::new();
                        reqs.insert("storage".to_string(), Quantity(size));
                        reqs
                    }),
                    ..Default::default()
                }),
                ..Default::default()
            }),
            status: None,
        }
    }

    pub fn get_labels(&self) -> BTreeMap<String, String> {
        let mut labels = BTreeMap::new();
        labels.insert(LABEL_MANAGED_BY.to_string(), MANAGED_BY_VALUE.to_string());
        labels.insert(LABEL_COMPONENT.to_string(), COMPONENT_RESTORE.to_string());
        labels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> RestoreRequest {
        RestoreRequest {
            pvc_name: "restored-pvc".to_string(),
            source_snapshot: "snap-1".to_string(),
            storage_class: None,
            requested_size: None,
            access_modes: Vec::new(),
        }
    }

    fn requested_storage(pvc: &PersistentVolumeClaim) -> String {
        pvc.spec
            .as_ref()
            .and_then(|s| s.resources.as_ref())
            .and_then(|r| r.requests.as_ref())
            .and_then(|req| req.get("storage"))
            .map(|q| q.0.clone())
            .expect("storage request must be set")
    }

    #[test]
    fn test_data_source_names_snapshot() {
        let request = request();
        let pvc = RestoredPvcBuilder::new(&request, "default").build();

        let data_source = pvc
            .spec
            .as_ref()
            .and_then(|s| s.data_source.as_ref())
            .expect("data source must be set");
        assert_eq!(data_source.api_group.as_deref(), Some("snapshot.storage.k8s.io"));
        assert_eq!(data_source.kind, "VolumeSnapshot");
        assert_eq!(data_source.name, "snap-1");
    }

    #[test]
    fn test_default_size_is_one_gi() {
        let request = request();
        let pvc = RestoredPvcBuilder::new(&request, "default").build();
        assert_eq!(requested_storage(&pvc), "1Gi");
    }

    #[test]
    fn test_explicit_size_respected() {
        let request = RestoreRequest {
            requested_size: Some("20Gi".to_string()),
            ..request()
        };
        let pvc = RestoredPvcBuilder::new(&request, "default").build();
        assert_eq!(requested_storage(&pvc), "20Gi");
    }

    #[test]
    fn test_default_access_mode_is_single_writer() {
        let request = request();
        let pvc = RestoredPvcBuilder::new(&request, "default").build();
        assert_eq!(
            pvc.spec.as_ref().and_then(|s| s.access_modes.clone()),
            Some(vec!["ReadWriteOnce".to_string()])
        );
    }

    #[test]
    fn test_explicit_access_modes_respected() {
        let request = RestoreRequest {
            access_modes: vec![AccessMode::ReadWriteMany, AccessMode::ReadOnlyMany],
            ..request()
        };
        let pvc = RestoredPvcBuilder::new(&request, "default").build();
        assert_eq!(
            pvc.spec.as_ref().and_then(|s| s.access_modes.clone()),
            Some(vec![
                "ReadWriteMany".to_string(),
                "ReadOnlyMany".to_string()
            ])
        );
    }

    #[test]
    fn test_storage_class_omitted_by_default() {
        let request = request();
        let pvc = RestoredPvcBuilder::new(&request, "default").build();
        assert_eq!(pvc.spec.as_ref().and_then(|s| s.storage_class_name.clone()), None);

        let with_class = RestoreRequest {
            storage_class: Some("fast-ssd".to_string()),
            ..request
        };
        let pvc = RestoredPvcBuilder::new(&with_class, "default").build();
        assert_eq!(
            pvc.spec.as_ref().and_then(|s| s.storage_class_name.clone()),
            Some("fast-ssd".to_string())
        );
    }

    #[test]
    fn test_build_is_idempotent() {
        let request = RestoreRequest {
            requested_size: Some("5Gi".to_string()),
            storage_class: Some("standard".to_string()),
            ..request()
        };
        let first = RestoredPvcBuilder::new(&request, "storage").build();
        let second = RestoredPvcBuilder::new(&request, "storage").build();
        assert_eq!(first, second);
    }
}
