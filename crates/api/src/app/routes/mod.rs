use axum::{Router, routing::get};

use quotedesk_quotations::{Interior, Pop};

pub mod auth;
pub mod materials;
pub mod pricing;
pub mod quotations;
pub mod system;

/// Router for all authenticated (owner-scoped) endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .nest(
            "/quotations",
            quotations::router::<Interior>().merge(quotations::progress_router()),
        )
        .nest("/pop", quotations::router::<Pop>())
        .nest("/pricing", pricing::router())
        .nest("/materials", materials::router())
}
