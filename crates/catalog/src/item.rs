use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use delivery_core::{require_text, CatalogItemId, DomainError, DomainResult, Entity};

/// A delivery-service offering shown on the menu while `active` is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogItem {
    pub id: CatalogItemId,
    pub name: String,
    pub description: String,
    pub eta_minutes: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CatalogItem {
    /// Materialize a validated item definition as a new record.
    pub fn create(new: NewCatalogItem, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: CatalogItemId::new(),
            name: new.name,
            description: new.description,
            eta_minutes: new.eta_minutes,
            active: new.active,
            created_at: occurred_at,
            updated_at: occurred_at,
        }
    }

    /// Apply a partial update. Fields absent from the patch are untouched.
    pub fn apply(&mut self, patch: &CatalogItemPatch, occurred_at: DateTime<Utc>) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(description) = &patch.description {
            self.description = description.clone();
        }
        if let Some(eta) = patch.eta_minutes {
            self.eta_minutes = eta;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        self.updated_at = occurred_at;
    }
}

impl Entity for CatalogItem {
    type Id = CatalogItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Validated input for creating a catalog item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCatalogItem {
    pub name: String,
    pub description: String,
    pub eta_minutes: u32,
    pub active: bool,
}

impl NewCatalogItem {
    /// Validate raw fields. Name, description and ETA are required; `active`
    /// defaults to true.
    pub fn parse(
        name: Option<&str>,
        description: Option<&str>,
        eta_minutes: Option<i64>,
        active: Option<bool>,
    ) -> DomainResult<Self> {
        const MISSING: &str = "missing delivery item details";

        let name = require_text(name, MISSING)?;
        let description = require_text(description, MISSING)?;
        let eta_minutes = match eta_minutes {
            Some(eta) => parse_eta(eta)?,
            None => return Err(DomainError::validation(MISSING)),
        };

        Ok(Self {
            name,
            description,
            eta_minutes,
            active: active.unwrap_or(true),
        })
    }
}

/// Validated partial update for a catalog item.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogItemPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub eta_minutes: Option<u32>,
    pub active: Option<bool>,
}

impl CatalogItemPatch {
    /// Validate the supplied fields only. Supplied text must not be blank.
    pub fn parse(
        name: Option<&str>,
        description: Option<&str>,
        eta_minutes: Option<i64>,
        active: Option<bool>,
    ) -> DomainResult<Self> {
        let name = name
            .map(|n| require_text(Some(n), "name must not be empty"))
            .transpose()?;
        let description = description
            .map(|d| require_text(Some(d), "description must not be empty"))
            .transpose()?;
        let eta_minutes = eta_minutes.map(parse_eta).transpose()?;

        Ok(Self {
            name,
            description,
            eta_minutes,
            active,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.eta_minutes.is_none()
            && self.active.is_none()
    }
}

fn parse_eta(eta: i64) -> DomainResult<u32> {
    if eta <= 0 {
        return Err(DomainError::validation("etaMinutes must be a positive number of minutes"));
    }
    // Bounded by i32 so every stored backend can hold it.
    i32::try_from(eta)
        .map(|eta| eta as u32)
        .map_err(|_| DomainError::validation("etaMinutes is too large"))
}

/// Items inserted into an empty catalog on first start.
pub fn default_menu() -> Vec<NewCatalogItem> {
    [
        ("Express Delivery", "Deliver within 30 minutes inside the city.", 30),
        ("Standard Delivery", "Affordable delivery within 60 minutes.", 60),
        ("Scheduled Delivery", "Book a delivery slot up to 24 hours ahead.", 120),
    ]
    .into_iter()
    .map(|(name, description, eta_minutes)| NewCatalogItem {
        name: name.to_string(),
        description: description.to_string(),
        eta_minutes,
        active: true,
    })
    .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn express() -> CatalogItem {
        let new = NewCatalogItem::parse(Some(" Express "), Some("Fast"), Some(30), None).unwrap();
        CatalogItem::create(new, Utc::now())
    }

    #[test]
    fn create_defaults_to_active_and_trims_name() {
        let item = express();
        assert!(item.active);
        assert_eq!(item.name, "Express");
        assert_eq!(item.created_at, item.updated_at);
    }

    #[test]
    fn create_requires_details() {
        assert!(NewCatalogItem::parse(None, Some("d"), Some(10), None).is_err());
        assert!(NewCatalogItem::parse(Some("n"), Some(" "), Some(10), None).is_err());
        assert!(NewCatalogItem::parse(Some("n"), Some("d"), None, None).is_err());
        assert!(NewCatalogItem::parse(Some("n"), Some("d"), Some(0), None).is_err());
        assert!(NewCatalogItem::parse(Some("n"), Some("d"), Some(-5), None).is_err());
    }

    #[test]
    fn patch_changes_only_supplied_fields() {
        let mut item = express();
        let before = item.clone();
        let later = before.updated_at + Duration::seconds(5);

        let patch = CatalogItemPatch::parse(None, None, Some(45), None).unwrap();
        item.apply(&patch, later);

        assert_eq!(item.eta_minutes, 45);
        assert_eq!(item.name, before.name);
        assert_eq!(item.description, before.description);
        assert_eq!(item.active, before.active);
        assert_eq!(item.created_at, before.created_at);
        assert_eq!(item.updated_at, later);
    }

    #[test]
    fn patch_rejects_blank_text() {
        assert!(CatalogItemPatch::parse(Some(""), None, None, None).is_err());
        assert!(CatalogItemPatch::parse(None, None, Some(0), None).is_err());
        assert!(CatalogItemPatch::parse(None, None, None, None).unwrap().is_empty());
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_value(express()).unwrap();
        assert_eq!(json["etaMinutes"], 30);
        assert!(json.get("createdAt").is_some());
        assert!(json["id"].is_string());
    }

    #[test]
    fn default_menu_is_three_active_items() {
        let menu = default_menu();
        assert_eq!(menu.len(), 3);
        assert!(menu.iter().all(|i| i.active));
    }

    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: a patch changes exactly the fields it carries.
            #[test]
            fn patch_touches_only_supplied_fields(
                name in proptest::option::of("[A-Za-z][A-Za-z ]{0,30}"),
                eta in proptest::option::of(1i64..=10_000),
                active in proptest::option::of(any::<bool>()),
            ) {
                let mut item = express();
                let before = item.clone();
                let patch = CatalogItemPatch::parse(name.as_deref(), None, eta, active).unwrap();
                item.apply(&patch, before.updated_at + Duration::seconds(1));

                let expected_name = match &name {
                    Some(n) => n.trim().to_string(),
                    None => before.name.clone(),
                };
                prop_assert_eq!(&item.name, &expected_name);
                prop_assert_eq!(&item.description, &before.description);
                prop_assert_eq!(item.eta_minutes, eta.map(|e| e as u32).unwrap_or(before.eta_minutes));
                prop_assert_eq!(item.active, active.unwrap_or(before.active));
                prop_assert_eq!(item.id, before.id);
                prop_assert_eq!(item.created_at, before.created_at);
            }

            /// Property: non-positive ETAs are always rejected.
            #[test]
            fn non_positive_eta_is_rejected(eta in i64::MIN..=0) {
                prop_assert!(CatalogItemPatch::parse(None, None, Some(eta), None).is_err());
                prop_assert!(NewCatalogItem::parse(Some("n"), Some("d"), Some(eta), None).is_err());
            }
        }
    }
}
