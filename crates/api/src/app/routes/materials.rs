use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};

use quotedesk_catalog::{MaterialId, MaterialInput};

use crate::app::routes::quotations::parse_id;
use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::PrincipalContext;

pub fn router() -> Router {
    Router::new()
        .route("/", get(list_materials).post(create_material))
        .route(
            "/:id",
            get(get_material).put(update_material).delete(delete_material),
        )
}

pub async fn list_materials(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Response {
    match services.materials.list(principal.user_id()).await {
        Ok(rows) => Json(rows).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn get_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => MaterialId::new(id),
        Err(resp) => return resp,
    };

    match services.materials.get(principal.user_id(), id).await {
        Ok(m) => Json(m).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn create_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Result<Json<MaterialInput>, JsonRejection>,
) -> Response {
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.materials.create(principal.user_id(), &input).await {
        Ok(m) => (StatusCode::CREATED, Json(m)).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn update_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Result<Json<MaterialInput>, JsonRejection>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => MaterialId::new(id),
        Err(resp) => return resp,
    };
    let Json(input) = match body {
        Ok(b) => b,
        Err(rejection) => return errors::json_rejection(rejection),
    };

    match services.materials.update(principal.user_id(), id, &input).await {
        Ok(m) => Json(m).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}

pub async fn delete_material(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => MaterialId::new(id),
        Err(resp) => return resp,
    };

    match services.materials.delete(principal.user_id(), id).await {
        Ok(()) => Json(dto::DeletedResponse::ok()).into_response(),
        Err(e) => errors::service_error_to_response(e),
    }
}
