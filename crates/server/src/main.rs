use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use server_api::{
    create_person, delete_person, get_person, list_persons, phonebook_info, ApiContext,
};
use shared::{
    domain::{Contact, ContactId, NewContact},
    error::{ApiError, ErrorCode},
};
use storage::Storage;
use tracing::{error, info, warn};

mod app_state;
mod config;

use app_state::AppState;
use config::{load_settings, prepare_database_url};

const PERSONS_ROUTE: &str = "/api/persons";

type ApiResult<T> = Result<T, (StatusCode, Json<ApiError>)>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url)?;
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext { storage },
    };
    let app = build_router(Arc::new(state), settings.max_body_bytes);

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "phonebook backend listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/info", get(info_page))
        .route(PERSONS_ROUTE, get(http_list_persons).post(http_create_person))
        .route(
            &format!("{PERSONS_ROUTE}/:id"),
            get(http_get_person).delete(http_delete_person),
        )
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation | ErrorCode::Malformed => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(err: ApiError) -> (StatusCode, Json<ApiError>) {
    let status = status_for(err.code);
    if status.is_server_error() {
        error!(error = %err.message, "api request failed");
    }
    (status, Json(err))
}

async fn healthz(State(state): State<Arc<AppState>>) -> ApiResult<&'static str> {
    state
        .api
        .storage
        .health_check()
        .await
        .map_err(|e| error_response(ApiError::internal(e.to_string())))?;
    Ok("ok")
}

async fn info_page(State(state): State<Arc<AppState>>) -> ApiResult<String> {
    phonebook_info(&state.api, Utc::now())
        .await
        .map_err(error_response)
}

async fn http_list_persons(State(state): State<Arc<AppState>>) -> ApiResult<Json<Vec<Contact>>> {
    list_persons(&state.api)
        .await
        .map(Json)
        .map_err(error_response)
}

async fn http_get_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Contact>> {
    get_person(&state.api, &ContactId::new(id))
        .await
        .map(Json)
        .map_err(error_response)
}

async fn http_create_person(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewContact>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<Contact>)> {
    let Json(candidate) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected malformed contact payload");
        (
            rejection.status(),
            Json(ApiError::new(ErrorCode::Malformed, rejection.body_text())),
        )
    })?;
    let contact = create_person(&state.api, candidate)
        .await
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(contact)))
}

async fn http_delete_person(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    delete_person(&state.api, &ContactId::new(id))
        .await
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
