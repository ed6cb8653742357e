//! Pub/Sub push envelopes carrying BigQuery audit-log entries.
//!
//! A log sink routes `datasetservice.insert` audit entries to a topic whose
//! push subscription posts here. The dataset id is the last path segment of
//! `protoPayload.resourceName` (`projects/<p>/datasets/<dataset>`). Missing
//! fields decode to an empty id, which simply resolves to no plan.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("message data is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("message data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Body of a Pub/Sub push request.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PushEnvelope {
    #[serde(default)]
    pub message: Option<PushMessage>,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PushMessage {
    /// Base64-encoded audit log entry.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub message_id: Option<String>,
}

/// The fields of a Cloud Audit Logs entry the dispatcher reads.
///
/// Fields that are absent or of an unexpected type read as empty; only the
/// resource name decides whether a plan is resolved.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct AuditLogEntry {
    pub resource_name: Option<String>,
    pub method_name: Option<String>,
    pub principal_email: Option<String>,
    pub locations: Vec<String>,
}

impl AuditLogEntry {
    pub fn from_value(value: &Value) -> Self {
        let text = |pointer: &str| {
            value
                .pointer(pointer)
                .and_then(Value::as_str)
                .map(str::to_string)
        };
        Self {
            resource_name: text("/protoPayload/resourceName"),
            method_name: text("/protoPayload/methodName"),
            principal_email: text("/protoPayload/authenticationInfo/principalEmail"),
            locations: value
                .pointer("/protoPayload/resourceLocation/currentLocations")
                .and_then(Value::as_array)
                .map(|items| {
                    items
                        .iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

/// What the service needs from one notification.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DatasetEvent {
    pub dataset_id: String,
    pub resource_name: String,
    pub method_name: Option<String>,
    pub principal_email: Option<String>,
    pub locations: Vec<String>,
    pub message_id: Option<String>,
}

impl PushEnvelope {
    /// Decode the embedded audit entry into a dataset event.
    pub fn dataset_event(&self) -> Result<DatasetEvent, IntakeError> {
        let message = self.message.as_ref();
        let entry = match message.and_then(|m| m.data.as_deref()) {
            Some(data) => decode_audit_entry(data)?,
            None => AuditLogEntry::default(),
        };
        let resource_name = entry.resource_name.unwrap_or_default();

        Ok(DatasetEvent {
            dataset_id: dataset_id_from_resource(&resource_name).to_string(),
            method_name: entry.method_name,
            principal_email: entry.principal_email,
            locations: entry.locations,
            message_id: message.and_then(|m| m.message_id.clone()),
            resource_name,
        })
    }
}

/// Decode a base64 message body into an audit entry. Any well-formed JSON is
/// accepted; a body that is not an object yields an empty entry.
pub fn decode_audit_entry(data: &str) -> Result<AuditLogEntry, IntakeError> {
    let bytes = STANDARD.decode(data.trim())?;
    let value: Value = serde_json::from_slice(&bytes)?;
    Ok(AuditLogEntry::from_value(&value))
}

/// Last `/`-separated segment of an audit resource name.
pub fn dataset_id_from_resource(resource_name: &str) -> &str {
    resource_name.rsplit('/').next().unwrap_or_default()
}
