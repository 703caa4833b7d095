use serde::{Deserialize, Serialize};

use delivery_auth::{Role, UserProfile};

/// A signed-in session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user: UserProfile,
}

impl Session {
    pub fn is_admin(&self) -> bool {
        self.user.role == Role::Admin
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmDeliveryInput {
    pub order_id: String,
    pub customer_name: String,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewItem {
    pub name: String,
    pub description: String,
    pub eta_minutes: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Partial item update; `None` fields are left out of the request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub eta_minutes: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

// Wire shapes the client reads but does not expose.

#[derive(Debug, Serialize)]
pub(crate) struct RegisterBody<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginBody<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RegisterResponse {
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct LoginResponse {
    pub token: String,
    pub user: UserProfile,
}

#[derive(Debug, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn item_update_omits_unset_fields() {
        let update = ItemUpdate {
            eta_minutes: Some(45),
            ..Default::default()
        };
        assert_eq!(serde_json::to_value(update).unwrap(), serde_json::json!({"etaMinutes": 45}));
    }

    #[test]
    fn confirm_input_is_camel_case() {
        let input = ConfirmDeliveryInput {
            order_id: "ORD-1".into(),
            customer_name: "A".into(),
            address: "X".into(),
        };
        let json = serde_json::to_value(input).unwrap();
        assert_eq!(json["orderId"], "ORD-1");
        assert_eq!(json["customerName"], "A");
    }
}
