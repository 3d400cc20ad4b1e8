//! Infrastructure layer: persistence ports and adapters (in-memory and
//! PostgreSQL) plus the application services that orchestrate them.

pub mod catalog_service;
pub mod catalog_store;
pub mod error;
pub mod postgres;
pub mod quotation_service;
pub mod quotation_store;
pub mod user_store;

pub use catalog_service::{MaterialService, PricingService};
pub use catalog_store::{
    InMemoryMaterialStore, InMemoryPricingStore, MaterialStore, PostgresMaterialStore,
    PostgresPricingStore, PricingStore,
};
pub use error::{ServiceError, StoreError};
pub use quotation_service::{
    DEFAULT_MAX_ATTEMPTS, QuotationDetail, QuotationService, QuotationSummary,
};
pub use quotation_store::{InMemoryQuotationStore, PostgresQuotationStore, QuotationStore};
pub use user_store::{InMemoryUserStore, PostgresUserStore, UserStore, seed_default_user};
