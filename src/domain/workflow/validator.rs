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

use crate::domain::workflow::action::{
    AccessMode, ActionParams, RestoreRequest, SnapshotRequest, ValidatedAction,
};
use crate::infrastructure::constants::{
    ACTION_CREATE_PVC_FROM_SNAPSHOT, ACTION_CREATE_SNAPSHOT, ACTION_LIST_SNAPSHOTS,
};
use crate::shared::error::{Result, SnapError};
use regex::Regex;

/// RFC 1123 subdomain, the rule the API server applies to metadata.name.
const DNS1123_SUBDOMAIN: &str =
    r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?(\.[a-z0-9]([-a-z0-9]*[a-z0-9])?)*$";

/// Kubernetes resource quantity: plain, decimal-SI or binary-SI suffixed.
const QUANTITY: &str = r"^([0-9]+(?:\.[0-9]+)?)(Ki|Mi|Gi|Ti|Pi|Ei|m|k|M|G|T|P|E)?$";

const MAX_NAME_LEN: usize = 253;

/// Pure validation of the raw action token and parameter bag.
///
/// Deterministic and side-effect free: no cluster call is ever made from
/// here, and arbitrary input strings only produce typed errors.
pub struct ActionValidator;

impl ActionValidator {
    pub fn validate(action: &str, params: &ActionParams) -> Result<ValidatedAction> {
        match action {
            ACTION_CREATE_SNAPSHOT => Self::validate_create_snapshot(params),
            ACTION_CREATE_PVC_FROM_SNAPSHOT => Self::validate_restore(params),
            ACTION_LIST_SNAPSHOTS => Ok(ValidatedAction::ListSnapshots),
            other => Err(SnapError::UnknownAction(other.to_string())),
        }
    }

    fn validate_create_snapshot(params: &ActionParams) -> Result<ValidatedAction> {
        let source_pvc = require_field(ACTION_CREATE_SNAPSHOT, "pvc", params.pvc.as_deref())?;
        let name = require_field(ACTION_CREATE_SNAPSHOT, "snapshot", params.snapshot.as_deref())?;

        validate_name("pvc", &source_pvc)?;
        validate_name("snapshot", &name)?;
        if let Some(class) = params.snapshot_class.as_deref() {
            validate_name("snapshot-class", class)?;
        }

        Ok(ValidatedAction::CreateSnapshot(SnapshotRequest {
            name,
            source_pvc,
            snapshot_class: params.snapshot_class.clone(),
        }))
    }

    fn validate_restore(params: &ActionParams) -> Result<ValidatedAction> {
        let source_snapshot = require_field(
            ACTION_CREATE_PVC_FROM_SNAPSHOT,
            "snapshot",
            params.snapshot.as_deref(),
        )?;
        let pvc_name =
            require_field(ACTION_CREATE_PVC_FROM_SNAPSHOT, "pvc", params.pvc.as_deref())?;

        validate_name("snapshot", &source_snapshot)?;
        validate_name("pvc", &pvc_name)?;
        if let Some(class) = params.storage_class.as_deref() {
            validate_name("storage-class", class)?;
        }
        if let Some(size) = params.size.as_deref() {
            validate_quantity(size)?;
        }

        let access_modes = params
            .access_modes
            .iter()
            .map(|raw| {
                raw.parse::<AccessMode>()
                    .map_err(|reason| SnapError::InvalidField {
                        field: "access-mode",
                        value: raw.clone(),
                        reason,
                    })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(ValidatedAction::CreatePvcFromSnapshot(RestoreRequest {
            pvc_name,
            source_snapshot,
            storage_class: params.storage_class.clone(),
            requested_size: params.size.clone(),
            access_modes,
        }))
    }
}

/// Absent and empty (or whitespace-only) both count as missing.
fn require_field(
    action: &'static str,
    field: &'static str,
    value: Option<&str>,
) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.to_string()),
        _ => Err(SnapError::missing_field(action, field)),
    }
}

fn validate_name(field: &'static str, value: &str) -> Result<()> {
    if value.len() > MAX_NAME_LEN {
        return Err(SnapError::InvalidField {
            field,
            value: value.to_string(),
            reason: format!("name exceeds {} characters", MAX_NAME_LEN),
        });
    }

    let re = Regex::new(DNS1123_SUBDOMAIN).map_err(|e| SnapError::config_error(e.to_string()))?;
    if re.is_match(value) {
        Ok(())
    } else {
        Err(SnapError::InvalidField {
            field,
            value: value.to_string(),
            reason: "not a valid DNS-1123 name (lowercase alphanumerics, '-' and '.')".to_string(),
        })
    }
}

fn validate_quantity(value: &str) -> Result<()> {
    let re = Regex::new(QUANTITY).map_err(|e| SnapError::config_error(e.to_string()))?;
    let Some(caps) = re.captures(value) else {
        return Err(SnapError::InvalidField {
            field: "size",
            value: value.to_string(),
            reason: "not a valid Kubernetes quantity (e.g. \"5Gi\", \"500Mi\")".to_string(),
        });
    };

    // A zero-capacity claim is never provisionable.
    let number = caps
        .get(1)
        .map_or("", |m| m.as_str())
        .parse::<f64>()
        .unwrap_or(0.0);
    if number == 0.0 {
        return Err(SnapError::InvalidField {
            field: "size",
            value: value.to_string(),
            reason: "requested size must be non-zero".to_string(),
        });
    }

    Ok(())
}
