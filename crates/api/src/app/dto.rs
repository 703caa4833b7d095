//! Request/response DTOs.
//!
//! Request fields are optional so that a missing field surfaces as a
//! validation error with a domain message rather than a JSON rejection.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use delivery_auth::UserProfile;

// -------------------------
// Request DTOs
// -------------------------

#[derive(Debug, Default, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDeliveryRequest {
    pub order_id: Option<String>,
    pub customer_name: Option<String>,
    pub address: Option<String>,
}

/// Body of both item create and item update.
///
/// `active` is kept as raw JSON. An explicit `null` is kept as
/// `Some(Value::Null)` so it can be told apart from an absent field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub eta_minutes: Option<i64>,
    #[serde(default, deserialize_with = "present")]
    pub active: Option<Value>,
}

impl ItemRequest {
    /// `active` for an update: only a JSON boolean is applied.
    pub fn active_flag(&self) -> Option<bool> {
        self.active.as_ref().and_then(Value::as_bool)
    }

    /// `active` for a create: absent means true, anything else is read by
    /// truthiness (`false`, `0`, `""` and `null` are false).
    pub fn active_on_create(&self) -> bool {
        match &self.active {
            None => true,
            Some(Value::Null) => false,
            Some(Value::Bool(b)) => *b,
            Some(Value::Number(n)) => n.as_f64().is_some_and(|n| n != 0.0),
            Some(Value::String(s)) => !s.is_empty(),
            Some(Value::Array(_) | Value::Object(_)) => true,
        }
    }
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

// -------------------------
// Response DTOs
// -------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub user: UserProfile,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}
