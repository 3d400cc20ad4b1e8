//! Store and service wiring.
//!
//! `USE_PERSISTENT_STORES=true` selects PostgreSQL (schema applied on start);
//! otherwise every store is in-memory and state lives for the process only.

use std::sync::Arc;

use anyhow::Context;
use chrono::{Duration, Utc};
use sqlx::PgPool;
use tracing::info;

use quotedesk_auth::Hs256JwtValidator;
use quotedesk_infra::{
    InMemoryMaterialStore, InMemoryPricingStore, InMemoryQuotationStore, InMemoryUserStore,
    MaterialService, PostgresMaterialStore, PostgresPricingStore, PostgresQuotationStore,
    PostgresUserStore, PricingService, QuotationService, UserStore, postgres, seed_default_user,
};
use quotedesk_quotations::{DocumentKind, Interior, Pop};

use crate::config::{AppConfig, Persistence};

pub struct AppServices {
    pub interior: QuotationService<Interior>,
    pub pop: QuotationService<Pop>,
    pub pricing: PricingService,
    pub materials: MaterialService,
    pub users: Arc<dyn UserStore>,
    pub jwt: Arc<Hs256JwtValidator>,
    pub token_ttl: Duration,
}

/// Selects the quotation service of a document kind.
pub trait KindService: DocumentKind {
    fn service(services: &AppServices) -> &QuotationService<Self>;
}

impl KindService for Interior {
    fn service(services: &AppServices) -> &QuotationService<Self> {
        &services.interior
    }
}

impl KindService for Pop {
    fn service(services: &AppServices) -> &QuotationService<Self> {
        &services.pop
    }
}

pub async fn build_services(config: &AppConfig) -> anyhow::Result<AppServices> {
    let jwt = Arc::new(Hs256JwtValidator::new(config.jwt_secret.clone().into_bytes()));
    let attempts = config.allocation_max_attempts;

    let services = match &config.persistence {
        Persistence::InMemory => {
            info!("using in-memory stores");
            AppServices {
                interior: QuotationService::new(Arc::new(InMemoryQuotationStore::new()), attempts),
                pop: QuotationService::new(Arc::new(InMemoryQuotationStore::new()), attempts),
                pricing: PricingService::new(Arc::new(InMemoryPricingStore::new())),
                materials: MaterialService::new(Arc::new(InMemoryMaterialStore::new())),
                users: Arc::new(InMemoryUserStore::new()),
                jwt,
                token_ttl: config.token_ttl,
            }
        }
        Persistence::Postgres { database_url } => {
            let pool = PgPool::connect(database_url)
                .await
                .context("failed to connect to Postgres")?;
            postgres::migrate(&pool)
                .await
                .context("failed to apply database schema")?;
            info!("using PostgreSQL stores");

            AppServices {
                interior: QuotationService::new(
                    Arc::new(PostgresQuotationStore::new(pool.clone())),
                    attempts,
                ),
                pop: QuotationService::new(Arc::new(PostgresQuotationStore::new(pool.clone())), attempts),
                pricing: PricingService::new(Arc::new(PostgresPricingStore::new(pool.clone()))),
                materials: MaterialService::new(Arc::new(PostgresMaterialStore::new(pool.clone()))),
                users: Arc::new(PostgresUserStore::new(pool)),
                jwt,
                token_ttl: config.token_ttl,
            }
        }
    };

    if let Some(seed) = config.seed_admin.clone() {
        seed_default_user(services.users.as_ref(), seed, Utc::now())
            .await
            .context("failed to seed the default account")?;
    }

    Ok(services)
}
