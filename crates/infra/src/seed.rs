//! Idempotent startup seeding.

use chrono::{DateTime, Utc};
use thiserror::Error;

use delivery_auth::{AuthError, Role, User, hash_password};
use delivery_catalog::{CatalogItem, default_menu};
use delivery_core::Email;

use crate::store::{CatalogStore, StoreError, UserStore};

/// Insert the default menu when the catalog is empty.
///
/// Returns the number of items inserted (zero if the catalog already had
/// entries).
pub async fn seed_menu(catalog: &dyn CatalogStore, now: DateTime<Utc>) -> Result<usize, StoreError> {
    if catalog.count().await? > 0 {
        return Ok(0);
    }

    let mut inserted = 0;
    for new in default_menu() {
        catalog.insert(CatalogItem::create(new, now)).await?;
        inserted += 1;
    }
    tracing::info!(inserted, "seeded default delivery menu");
    Ok(inserted)
}

pub const SEED_ADMIN_NAME: &str = "Delivery Admin";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    Created(User),
    AlreadyExists,
}

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("admin password must not be empty")]
    EmptyPassword,
}

/// Create an admin account unless one with `email` already exists.
///
/// An existing account is left untouched, whatever its role.
pub async fn seed_admin(
    users: &dyn UserStore,
    email: &Email,
    password: &str,
    now: DateTime<Utc>,
) -> Result<SeedOutcome, SeedError> {
    if password.is_empty() {
        return Err(SeedError::EmptyPassword);
    }
    if users.find_by_email(email).await?.is_some() {
        tracing::info!(email = %email, "admin account already exists");
        return Ok(SeedOutcome::AlreadyExists);
    }

    let hash = hash_password(password)?;
    let admin = User::new(SEED_ADMIN_NAME.to_string(), email.clone(), hash, Role::Admin, now);

    match users.insert(admin).await {
        Ok(user) => {
            tracing::info!(user_id = %user.id, email = %email, "admin account created");
            Ok(SeedOutcome::Created(user))
        }
        // Lost a race with a concurrent registration.
        Err(StoreError::Conflict(_)) => Ok(SeedOutcome::AlreadyExists),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use delivery_auth::verify_password;

    use super::*;
    use crate::store::{InMemoryCatalogStore, InMemoryUserStore};

    #[tokio::test]
    async fn seed_menu_only_fills_an_empty_catalog() {
        let catalog = InMemoryCatalogStore::new();

        assert_eq!(seed_menu(&catalog, Utc::now()).await.unwrap(), 3);
        assert_eq!(seed_menu(&catalog, Utc::now()).await.unwrap(), 0);
        assert_eq!(catalog.count().await.unwrap(), 3);

        let names: Vec<String> = catalog
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|i| i.name)
            .collect();
        assert_eq!(names, vec!["Express Delivery", "Scheduled Delivery", "Standard Delivery"]);
    }

    #[tokio::test]
    async fn seed_admin_creates_once() {
        let users = InMemoryUserStore::new();
        let email = Email::parse("admin@example.com").unwrap();

        let outcome = seed_admin(&users, &email, "s3cret", Utc::now()).await.unwrap();
        let SeedOutcome::Created(admin) = outcome else {
            panic!("expected a new admin");
        };
        assert_eq!(admin.role, Role::Admin);
        assert_eq!(admin.name, SEED_ADMIN_NAME);
        assert!(verify_password("s3cret", &admin.password_hash).is_ok());

        let again = seed_admin(&users, &email, "other", Utc::now()).await.unwrap();
        assert_eq!(again, SeedOutcome::AlreadyExists);
    }

    #[tokio::test]
    async fn seed_admin_rejects_empty_password() {
        let users = InMemoryUserStore::new();
        let email = Email::parse("admin@example.com").unwrap();
        let err = seed_admin(&users, &email, "", Utc::now()).await.unwrap_err();
        assert!(matches!(err, SeedError::EmptyPassword));
    }
}
