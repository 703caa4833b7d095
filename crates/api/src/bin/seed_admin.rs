//! Create the admin account named by `ADMIN_EMAIL` / `ADMIN_PASSWORD`.

use anyhow::Context;
use chrono::Utc;

use delivery_api::AdminSeedConfig;
use delivery_core::Email;
use delivery_infra::{seed_admin, store::postgres, SeedOutcome, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    delivery_observability::init();

    let config = AdminSeedConfig::from_env().context("invalid configuration")?;
    let email = Email::parse(&config.email).context("ADMIN_EMAIL is not a valid email")?;

    let stores = match &config.database_url {
        Some(url) => {
            let pool = postgres::connect(url).await.context("failed to connect to database")?;
            postgres::apply_schema(&pool).await.context("failed to apply schema")?;
            Stores::postgres(pool)
        }
        None => {
            tracing::warn!("DATABASE_URL not set; the admin account will not outlive this process");
            Stores::in_memory()
        }
    };

    match seed_admin(stores.users.as_ref(), &email, &config.password, Utc::now()).await? {
        SeedOutcome::Created(user) => println!("Admin user created: {} ({})", user.email, user.id),
        SeedOutcome::AlreadyExists => println!("Admin user already exists: {email}"),
    }

    Ok(())
}
