use std::sync::Arc;

use anyhow::Context;
use chrono::Utc;

use delivery_api::{build_app, AppServices, Config};
use delivery_auth::Hs256Jwt;
use delivery_infra::{store::postgres, Stores};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    delivery_observability::init();

    let config = Config::from_env().context("invalid configuration")?;

    let stores = match &config.database_url {
        Some(url) => {
            let pool = postgres::connect(url).await.context("failed to connect to database")?;
            postgres::apply_schema(&pool).await.context("failed to apply schema")?;
            Stores::postgres(pool)
        }
        None => Stores::in_memory(),
    };

    let jwt = Hs256Jwt::new(config.jwt_secret.as_bytes(), config.token_ttl);
    let services = Arc::new(AppServices::new(stores, jwt));

    services
        .seed_menu(Utc::now())
        .await
        .context("failed to seed menu")?;

    let app = build_app(services);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    tracing::info!("delivery backend listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
