//! Quotation routes, shared by both document kinds.
//!
//! Mounted at `/quotations` (interior, with progress tracking) and `/pop`.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use quotedesk_core::AggregateId;
use quotedesk_quotations::{Interior, QuotationId};

use crate::app::services::{AppServices, KindService};
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router<K: KindService>() -> Router {
    Router::new()
        .route("/", get(list::<K>).post(create::<K>))
        .route("/:id", get(detail::<K>).put(update::<K>).delete(delete::<K>))
        .route("/:id/document", get(document::<K>))
}

/// Progress routes exist for interior quotations only.
pub fn progress_router() -> Router {
    Router::new().route("/:id/progress", get(progress_history).post(record_progress))
}

pub(crate) fn parse_id(raw: &str) -> Result<AggregateId, Response> {
    raw.parse()
        .map_err(|_| errors::json_error(StatusCode::BAD_REQUEST, "validation_error", "invalid id"))
}

pub async fn create<K: KindService>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<dto::CreateQuotationRequest<K>>, JsonRejection>,
) -> Response {
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    let cmd = match body.into_command(&principal) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match K::service(&services).create(cmd).await {
        Ok(q) => (StatusCode::CREATED, Json(q)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn list<K: KindService>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<dto::ListQuotationsQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection(rejection),
    };
    let status = match query.status() {
        Ok(s) => s,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match K::service(&services).list(principal.user_id(), status).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn detail<K: KindService>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => QuotationId::new(id),
        Err(resp) => return resp,
    };

    match K::service(&services).detail(principal.user_id(), id).await {
        Ok(d) => Json(d).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update<K: KindService>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::UpdateQuotationRequest<K>>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => QuotationId::new(id),
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    let cmd = match body.into_command(&principal) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match K::service(&services).update(id, cmd).await {
        Ok(q) => Json(q).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete<K: KindService>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => QuotationId::new(id),
        Err(resp) => return resp,
    };

    match K::service(&services).delete(principal.user_id(), id).await {
        Ok(()) => Json(dto::DeletedResponse::ok()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn document<K: KindService>(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => QuotationId::new(id),
        Err(resp) => return resp,
    };

    match K::service(&services).snapshot(principal.user_id(), id).await {
        Ok(s) => Json(s).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn record_progress(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<dto::RecordProgressRequest>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => QuotationId::new(id),
        Err(resp) => return resp,
    };
    let Json(body) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };
    let cmd = match body.into_command(&principal) {
        Ok(c) => c,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match Interior::service(&services).record_progress(id, cmd).await {
        Ok(record) => (StatusCode::CREATED, Json(record)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn progress_history(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => QuotationId::new(id),
        Err(resp) => return resp,
    };

    match Interior::service(&services)
        .progress_history(principal.user_id(), id)
        .await
    {
        Ok(history) => Json(history).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
