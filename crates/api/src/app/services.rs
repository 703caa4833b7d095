//! Service wiring: stores plus the token service, shared by every handler.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use delivery_auth::{
    hash_password, verify_password_or_dummy, warm_dummy_hash, Credentials, Hs256Jwt, IssuedToken, JwtValidator, Principal,
    Registration, Role, User, UserProfile,
};
use delivery_catalog::{CatalogItem, CatalogItemPatch, NewCatalogItem};
use delivery_confirmations::{Confirmation, ConfirmDelivery, ConfirmationWithDeliverer, Deliverer};
use delivery_core::CatalogItemId;
use delivery_infra::{seed_menu, StoreError, Stores};

use crate::app::errors::ApiError;

/// Application services shared across requests.
///
/// Constructed once at startup (or per test) and handed to handlers as
/// `Extension<Arc<AppServices>>`.
pub struct AppServices {
    stores: Stores,
    jwt: Hs256Jwt,
}

impl AppServices {
    pub fn new(stores: Stores, jwt: Hs256Jwt) -> Self {
        warm_dummy_hash();
        Self { stores, jwt }
    }

    /// Services over empty in-memory stores.
    pub fn in_memory(jwt_secret: &[u8], token_ttl: Duration) -> Self {
        Self::new(Stores::in_memory(), Hs256Jwt::new(jwt_secret, token_ttl))
    }

    pub fn stores(&self) -> &Stores {
        &self.stores
    }

    pub fn jwt_validator(&self) -> Arc<dyn JwtValidator> {
        Arc::new(self.jwt.clone())
    }

    /// Insert the default menu if the catalog is empty.
    pub async fn seed_menu(&self, now: DateTime<Utc>) -> Result<usize, ApiError> {
        Ok(seed_menu(self.stores.catalog.as_ref(), now).await?)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Auth
    // ─────────────────────────────────────────────────────────────────────

    /// Create a delivery-role account.
    pub async fn register(&self, registration: Registration, now: DateTime<Utc>) -> Result<UserProfile, ApiError> {
        let hash = hash_password(&registration.password)?;
        let user = User::new(registration.name, registration.email, hash, Role::Delivery, now);

        let user = self.stores.users.insert(user).await.map_err(|e| match e {
            StoreError::Conflict(_) => ApiError::Conflict("email already registered".to_string()),
            other => other.into(),
        })?;

        tracing::info!(user_id = %user.id, "account registered");
        Ok(user.profile())
    }

    /// Check credentials and issue a token.
    ///
    /// Unknown email and wrong password fail identically.
    pub async fn login(
        &self,
        credentials: Credentials,
        now: DateTime<Utc>,
    ) -> Result<(IssuedToken, UserProfile), ApiError> {
        let user = match &credentials.email {
            Some(email) => self.stores.users.find_by_email(email).await?,
            None => None,
        };

        verify_password_or_dummy(
            &credentials.password,
            user.as_ref().map(|u| u.password_hash.as_str()),
        )?;
        let user = user.ok_or(delivery_auth::AuthError::InvalidCredentials)?;

        let token = self.jwt.issue(&user.principal(), now)?;
        tracing::info!(user_id = %user.id, role = %user.role, "login succeeded");
        Ok((token, user.profile()))
    }

    // ─────────────────────────────────────────────────────────────────────
    // Deliveries
    // ─────────────────────────────────────────────────────────────────────

    pub async fn menu(&self) -> Result<Vec<CatalogItem>, ApiError> {
        Ok(self.stores.catalog.list_active().await?)
    }

    /// Record a delivery as performed by `principal`, who must still exist.
    pub async fn confirm(
        &self,
        principal: &Principal,
        cmd: ConfirmDelivery,
        now: DateTime<Utc>,
    ) -> Result<Confirmation, ApiError> {
        if self.stores.users.find_by_id(principal.id).await?.is_none() {
            tracing::debug!(user_id = %principal.id, "token subject no longer exists");
            return Err(delivery_auth::AuthError::InvalidToken.into());
        }

        let confirmation = Confirmation::delivered(cmd, principal.id, now);
        let confirmation = self.stores.confirmations.insert(confirmation).await?;

        tracing::info!(
            confirmation_id = %confirmation.id,
            order_id = %confirmation.order_id,
            user_id = %principal.id,
            "delivery confirmed"
        );
        Ok(confirmation)
    }

    // ─────────────────────────────────────────────────────────────────────
    // Admin
    // ─────────────────────────────────────────────────────────────────────

    /// Every confirmation, most recent first, with its deliverer resolved.
    pub async fn list_confirmations(&self) -> Result<Vec<ConfirmationWithDeliverer>, ApiError> {
        let confirmations = self.stores.confirmations.list_recent_first().await?;

        let mut ids: Vec<_> = confirmations.iter().map(|c| c.delivered_by).collect();
        ids.sort();
        ids.dedup();

        let deliverers: HashMap<_, Deliverer> = self
            .stores
            .users
            .find_many(&ids)
            .await?
            .into_iter()
            .map(|u| {
                (
                    u.id,
                    Deliverer {
                        id: u.id,
                        name: u.name,
                        email: u.email.into_inner(),
                    },
                )
            })
            .collect();

        Ok(confirmations
            .into_iter()
            .map(|c| {
                let deliverer = deliverers.get(&c.delivered_by).cloned();
                ConfirmationWithDeliverer::new(c, deliverer)
            })
            .collect())
    }

    pub async fn list_items(&self) -> Result<Vec<CatalogItem>, ApiError> {
        Ok(self.stores.catalog.list_all().await?)
    }

    pub async fn create_item(&self, new: NewCatalogItem, now: DateTime<Utc>) -> Result<CatalogItem, ApiError> {
        let item = self.stores.catalog.insert(CatalogItem::create(new, now)).await?;
        tracing::info!(item_id = %item.id, "delivery item created");
        Ok(item)
    }

    pub async fn update_item(
        &self,
        id: CatalogItemId,
        patch: CatalogItemPatch,
        now: DateTime<Utc>,
    ) -> Result<CatalogItem, ApiError> {
        let item = self.stores.catalog.update(id, &patch, now).await?;
        tracing::info!(item_id = %item.id, "delivery item updated");
        Ok(item)
    }
}
