//! HTTP routes for the pack calculator API

use serde::de::DeserializeOwned;
use std::convert::Infallible;
use std::sync::Arc;
use tracing::error;
use warp::http::StatusCode;
use warp::reply::{Json, WithStatus};
use warp::{Filter, Rejection, Reply};

use crate::docs::api_documentation;
use crate::models::{
    ErrorResponse, HealthResponse, PackRequest, PackSizesResponse, UpdatePackSizesRequest,
    UpdatePackSizesResponse,
};
use crate::service::{PackService, ServiceError};

/// Request bodies are a quantity and a handful of sizes
const MAX_BODY_BYTES: u64 = 64 * 1024;

type JsonReply = WithStatus<Json>;

pub fn routes(
    service: Arc<PackService>,
    server_url: String,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let calculate = warp::path!("api" / "calculate")
        .and(warp::post())
        .and(json_body::<PackRequest>())
        .and(with_service(service.clone()))
        .and_then(calculate_packs);

    let get_pack_sizes = warp::path!("api" / "pack-sizes")
        .and(warp::get())
        .and(with_service(service.clone()))
        .map(get_pack_sizes);

    let update_pack_sizes = warp::path!("api" / "pack-sizes")
        .and(warp::put())
        .and(json_body::<UpdatePackSizesRequest>())
        .and(with_service(service))
        .map(update_pack_sizes);

    let health = warp::path!("health")
        .and(warp::get())
        .map(|| reply(&HealthResponse::healthy(), StatusCode::OK));

    let docs = warp::path!("docs" / "json")
        .and(warp::get())
        .map(move || reply(&api_documentation(&server_url), StatusCode::OK));

    calculate
        .or(get_pack_sizes)
        .or(update_pack_sizes)
        .or(health)
        .or(docs)
        .recover(handle_rejection)
}

fn with_service(
    service: Arc<PackService>,
) -> impl Filter<Extract = (Arc<PackService>,), Error = Infallible> + Clone {
    warp::any().map(move || service.clone())
}

fn json_body<T: DeserializeOwned + Send>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

fn reply<T: serde::Serialize>(body: &T, status: StatusCode) -> JsonReply {
    warp::reply::with_status(warp::reply::json(body), status)
}

fn service_error_status(err: &ServiceError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// POST /api/calculate
/// The calculator is CPU bound and sized by the request, so it runs on the blocking pool
async fn calculate_packs(request: PackRequest, service: Arc<PackService>) -> Result<JsonReply, Infallible> {
    let quantity = request.quantity;
    let result = tokio::task::spawn_blocking(move || service.calculate_pack_distribution(&request)).await;

    Ok(match result {
        Ok(Ok(response)) => reply(&response, StatusCode::OK),
        Ok(Err(err)) => {
            error!(quantity, error = %err, "calculation failed");
            reply(
                &ErrorResponse::with_message("Calculation failed", &err),
                service_error_status(&err),
            )
        }
        Err(err) => {
            error!(quantity, error = %err, "calculation task did not complete");
            reply(
                &ErrorResponse::new("Internal server error"),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    })
}

/// GET /api/pack-sizes
fn get_pack_sizes(service: Arc<PackService>) -> JsonReply {
    match service.available_pack_sizes() {
        Ok(pack_sizes) => reply(&PackSizesResponse { pack_sizes }, StatusCode::OK),
        Err(err) => {
            error!(error = %err, "failed to get pack sizes");
            reply(
                &ErrorResponse::with_message("Failed to get pack sizes", &err),
                StatusCode::INTERNAL_SERVER_ERROR,
            )
        }
    }
}

/// PUT /api/pack-sizes
fn update_pack_sizes(request: UpdatePackSizesRequest, service: Arc<PackService>) -> JsonReply {
    match service.update_pack_sizes(&request.pack_sizes) {
        Ok(pack_sizes) => reply(
            &UpdatePackSizesResponse {
                message: "Pack sizes updated successfully".to_string(),
                pack_sizes,
            },
            StatusCode::OK,
        ),
        Err(err) => {
            error!(sizes = ?request.pack_sizes, error = %err, "failed to update pack sizes");
            reply(
                &ErrorResponse::with_message("Failed to update pack sizes", &err),
                service_error_status(&err),
            )
        }
    }
}

async fn handle_rejection(rejection: Rejection) -> Result<JsonReply, Infallible> {
    let (status, body) = if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, ErrorResponse::new("Not found"))
    } else if let Some(err) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        error!(error = %err, "failed to parse request body");
        (
            StatusCode::BAD_REQUEST,
            ErrorResponse::with_message("Invalid request", err),
        )
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (StatusCode::PAYLOAD_TOO_LARGE, ErrorResponse::new("Request body too large"))
    } else if rejection.find::<warp::reject::UnsupportedMediaType>().is_some() {
        (
            StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ErrorResponse::with_message("Invalid request", "expected a JSON body"),
        )
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (StatusCode::METHOD_NOT_ALLOWED, ErrorResponse::new("Method not allowed"))
    } else {
        error!(?rejection, "unhandled rejection");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorResponse::new("Internal server error"),
        )
    };

    Ok(reply(&body, status))
}
