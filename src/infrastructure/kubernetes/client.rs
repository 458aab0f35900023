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

use crate::domain::workflow::action::SnapshotRecord;
use crate::infrastructure::constants::{KIND_PVC, KIND_VOLUME_SNAPSHOT};
use crate::infrastructure::kubernetes::resources::volumesnapshot::VolumeSnapshot;
use crate::shared::error::SnapError;
use k8s_openapi::api::core::v1::PersistentVolumeClaim;
use kube::{Api, Client};
use tracing::debug;

/// Capability interface over the cluster, consumed by the workflow
/// executor. The cluster's reconciliation loop does the real work;
/// every operation here is a single request.
#[async_trait::async_trait]
pub trait SnapshotKubeClient: Send + Sync {
    /// Submit a snapshot request; returns the server-assigned name.
    async fn create_snapshot(&self, snapshot: &VolumeSnapshot) -> Result<String, SnapError>;

    /// Submit a PVC request; returns the server-assigned name.
    async fn create_pvc(&self, pvc: &PersistentVolumeClaim) -> Result<String, SnapError>;

    /// Observe all snapshots in the namespace, in server order.
    async fn list_snapshots(&self) -> Result<Vec<SnapshotRecord>, SnapError>;

    /// Observe a single snapshot (readiness checks).
    async fn get_snapshot(&self, name: &str) -> Result<SnapshotRecord, SnapError>;
}

pub struct SnapshotKubeClientImpl {
    client: Client,
    namespace: String,
}

impl SnapshotKubeClientImpl {
    /// Build a namespaced client from an explicit kubeconfig path.
    ///
    /// The path is always required; there is deliberately no fallback to
    /// a home-directory default.
    pub async fn new_with_config(
        namespace: String,
        kubeconfig_path: String,
        context: Option<String>,
    ) -> Result<Self, SnapError> {
        use kube::config::{KubeConfigOptions, Kubeconfig};

        let kubeconfig = Kubeconfig::read_from(&kubeconfig_path).map_err(|e| {
            SnapError::config_error(format!(
                "Failed to load kubeconfig '{}': {}",
                kubeconfig_path, e
            ))
        })?;

        let config_options = KubeConfigOptions {
            context,
            cluster: None,
            user: None,
        };

        let config = kube::Config::from_custom_kubeconfig(kubeconfig, &config_options)
            .await
            .map_err(|e| {
                SnapError::config_error(format!("Failed to create Kubernetes config: {}", e))
            })?;

        let client = Client::try_from(config).map_err(|e| {
            SnapError::Cluster(format!("Failed to create Kubernetes client: {}", e))
        })?;

        Ok(Self { client, namespace })
    }

    fn record_from(snapshot: &VolumeSnapshot) -> SnapshotRecord {
        SnapshotRecord {
            name: snapshot.metadata.name.clone().unwrap_or_default(),
            source_pvc: snapshot
                .spec
                .source
                .persistent_volume_claim_name
                .clone()
                .unwrap_or_default(),
            ready_to_use: snapshot
                .status
                .as_ref()
                .and_then(|s| s.ready_to_use)
                .unwrap_or(false),
            creation_timestamp: snapshot.metadata.creation_timestamp.as_ref().map(|t| t.0),
        }
    }
}

#[async_trait::async_trait]
impl SnapshotKubeClient for SnapshotKubeClientImpl {
    async fn create_snapshot(&self, snapshot: &VolumeSnapshot) -> Result<String, SnapError> {
        let api: Api<VolumeSnapshot> = Api::namespaced(self.client.clone(), &self.namespace);
        let pp = kube::api::PostParams::default();
        let name = snapshot.metadata.name.clone().unwrap_or_default();

        debug!(%name, namespace = %self.namespace, "creating VolumeSnapshot");
        let created = api.create(&pp, snapshot).await.map_err(|e| match e {
            kube::Error::Api(ae) if ae.code == 409 => {
                SnapError::already_exists(KIND_VOLUME_SNAPSHOT, &name, &self.namespace)
            }
            other => SnapError::Cluster(other.to_string()),
        })?;

        Ok(created.metadata.name.unwrap_or(name))
    }

    async fn create_pvc(&self, pvc: &PersistentVolumeClaim) -> Result<String, SnapError> {
        let api: Api<PersistentVolumeClaim> =
            Api::namespaced(self.client.clone(), &self.namespace);
        let pp = kube::api::PostParams::default();
        let name = pvc.metadata.name.clone().unwrap_or_default();

        debug!(%name, namespace = %self.namespace, "creating PersistentVolumeClaim");
        let created = api.create(&pp, pvc).await.map_err(|e| match e {
            kube::Error::Api(ae) if ae.code == 409 => {
                SnapError::already_exists(KIND_PVC, &name, &self.namespace)
            }
            other => SnapError::Cluster(other.to_string()),
        })?;

        Ok(created.metadata.name.unwrap_or(name))
    }

    async fn list_snapshots(&self) -> Result<Vec<SnapshotRecord>, SnapError> {
        let api: Api<VolumeSnapshot> = Api::namespaced(self.client.clone(), &self.namespace);
        let lp = kube::api::ListParams::default();

        let snapshots = api.list(&lp).await?;
        Ok(snapshots.items.iter().map(Self::record_from).collect())
    }

    async fn get_snapshot(&self, name: &str) -> Result<SnapshotRecord, SnapError> {
        let api: Api<VolumeSnapshot> = Api::namespaced(self.client.clone(), &self.namespace);

        let snapshot = api.get(name).await.map_err(|e| {
            if let kube::Error::Api(ae) = e {
                if ae.code == 404 {
                    SnapError::not_found(KIND_VOLUME_SNAPSHOT, name, &self.namespace)
                } else {
                    SnapError::Cluster(ae.message)
                }
            } else {
                SnapError::Cluster(e.to_string())
            }
        })?;

        Ok(Self::record_from(&snapshot))
    }
}
