use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{
        Extension, Path, Query,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, put},
};

use quotedesk_catalog::{PricingId, PricingInput};
use quotedesk_quotations::RoomType;

use crate::app::routes::quotations::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_pricing).post(create_pricing))
        .route("/suggest", get(suggest_rate))
        .route("/:id", put(update_pricing).delete(delete_pricing))
}

pub async fn list_pricing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    match services.pricing.price_list(principal.user_id()).await {
        Ok(list) => Json(list.entries()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_pricing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<PricingInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.pricing.create(principal.user_id(), &input).await {
        Ok(entry) => (StatusCode::CREATED, Json(entry)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_pricing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<PricingInput>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => PricingId::new(id),
        Err(resp) => return resp,
    };
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.pricing.update(principal.user_id(), id, &input).await {
        Ok(entry) => Json(entry).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_pricing(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => PricingId::new(id),
        Err(resp) => return resp,
    };

    match services.pricing.delete(principal.user_id(), id).await {
        Ok(()) => Json(dto::DeletedResponse::ok()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

/// `GET /pricing/suggest?room_type=kitchen`: the owner's predefined rate.
pub async fn suggest_rate(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    query: Result<Query<dto::SuggestRateQuery>, QueryRejection>,
) -> Response {
    let Query(query) = match query {
        Ok(q) => q,
        Err(rejection) => return errors::query_rejection(rejection),
    };
    let room_type: RoomType = match query.room_type.trim().parse() {
        Ok(r) => r,
        Err(e) => return errors::domain_error_to_response(e),
    };

    match services.pricing.suggest(principal.user_id(), room_type).await {
        Ok(Some(suggestion)) => Json(suggestion).into_response(),
        Ok(None) => errors::json_error(
            StatusCode::NOT_FOUND,
            "not_found",
            format!("no predefined price for {room_type}"),
        ),
        Err(e) => errors::service_error_to_response(e),
    }
}
