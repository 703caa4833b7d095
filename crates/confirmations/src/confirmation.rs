use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use delivery_core::{require_text, ConfirmationId, DomainError, DomainResult, Entity, UserId};

/// Confirmation status lifecycle.
///
/// Records are only ever created as `Delivered`; `Pending` exists for stored
/// data that predates a confirmation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmationStatus {
    #[default]
    Pending,
    Delivered,
}

impl ConfirmationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConfirmationStatus::Pending => "pending",
            ConfirmationStatus::Delivered => "delivered",
        }
    }

}

impl FromStr for ConfirmationStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ConfirmationStatus::Pending),
            "delivered" => Ok(ConfirmationStatus::Delivered),
            other => Err(DomainError::validation(format!("unknown confirmation status '{other}'"))),
        }
    }
}

/// Record of a completed delivery.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Confirmation {
    pub id: ConfirmationId,
    pub order_id: String,
    pub customer_name: String,
    pub address: String,
    pub status: ConfirmationStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivered_by: UserId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Confirmation {
    /// A new confirmation, delivered now by `delivered_by`.
    pub fn delivered(cmd: ConfirmDelivery, delivered_by: UserId, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: ConfirmationId::new(),
            order_id: cmd.order_id,
            customer_name: cmd.customer_name,
            address: cmd.address,
            status: ConfirmationStatus::Delivered,
            delivered_at: Some(occurred_at),
            delivered_by,
            created_at: occurred_at,
            updated_at: occurred_at,
        }
    }
}

impl Entity for Confirmation {
    type Id = ConfirmationId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Command to confirm a delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmDelivery {
    pub order_id: String,
    pub customer_name: String,
    pub address: String,
}

impl ConfirmDelivery {
    pub fn parse(
        order_id: Option<&str>,
        customer_name: Option<&str>,
        address: Option<&str>,
    ) -> DomainResult<Self> {
        const MISSING: &str = "missing delivery details";
        Ok(Self {
            order_id: require_text(order_id, MISSING)?,
            customer_name: require_text(customer_name, MISSING)?,
            address: require_text(address, MISSING)?,
        })
    }
}

/// The account that performed a delivery, as shown to admins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deliverer {
    pub id: UserId,
    pub name: String,
    pub email: String,
}

/// A confirmation with its deliverer resolved.
///
/// `delivered_by` is `None` when the referenced account no longer exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmationWithDeliverer {
    pub id: ConfirmationId,
    pub order_id: String,
    pub customer_name: String,
    pub address: String,
    pub status: ConfirmationStatus,
    pub delivered_at: Option<DateTime<Utc>>,
    pub delivered_by: Option<Deliverer>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ConfirmationWithDeliverer {
    pub fn new(confirmation: Confirmation, deliverer: Option<Deliverer>) -> Self {
        Self {
            id: confirmation.id,
            order_id: confirmation.order_id,
            customer_name: confirmation.customer_name,
            address: confirmation.address,
            status: confirmation.status,
            delivered_at: confirmation.delivered_at,
            delivered_by: deliverer,
            created_at: confirmation.created_at,
            updated_at: confirmation.updated_at,
        }
    }
}
