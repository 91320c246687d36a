use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::crypto::EncryptedPayload;
use crate::error::RegistryError;

#[derive(Debug, Clone)]
pub struct VapidConfig {
    pub private_key: String,
    pub public_key: String,
    pub subject: String,
}

/// A browser push subscription, keyed by its `endpoint`.
///
/// Everything besides the endpoint (`keys`, `expirationTime`, ...) is kept
/// verbatim in `credentials` and only read back by the delivery adapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value")]
pub struct Subscription {
    pub endpoint: String,
    #[serde(flatten)]
    pub credentials: Map<String, Value>,
}

impl Subscription {
    pub fn new(endpoint: impl Into<String>, credentials: Map<String, Value>) -> Self {
        Self {
            endpoint: endpoint.into(),
            credentials,
        }
    }

    pub fn from_json(value: Value) -> Result<Self, RegistryError> {
        let Value::Object(mut fields) = value else {
            return Err(RegistryError::InvalidSubscription(
                "subscription must be a JSON object",
            ));
        };

        let endpoint = match fields.remove("endpoint") {
            Some(Value::String(endpoint)) if !endpoint.trim().is_empty() => endpoint,
            _ => {
                return Err(RegistryError::InvalidSubscription(
                    "endpoint is required",
                ));
            }
        };

        Ok(Self {
            endpoint,
            credentials: fields,
        })
    }

    /// Looks up `keys.<name>`, as browsers encode `p256dh` and `auth`.
    pub(crate) fn key(&self, name: &str) -> Option<&str> {
        self.credentials.get("keys")?.get(name)?.as_str()
    }
}

impl TryFrom<Value> for Subscription {
    type Error = RegistryError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Self::from_json(value)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationPayload {
    pub title: String,
    pub body: String,
    pub data: NotificationData,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationData {
    pub file_name: String,
    pub encrypted_payload: EncryptedPayload,
}
