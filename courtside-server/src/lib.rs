use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::Filter;
use warp::http::StatusCode;
use warp::reply::{Reply, Response};

use crate::app_state::{AppState, ExportFile};
use crate::auth::{Account, AuthService};
use crate::local_migration::MigrationOutcome;
use crate::websocket::ConnectionManager;
use courtside_types::{ApiError, GameEdit, PlayerDraft};

pub mod app_state;
pub mod auth;
pub mod config;
pub mod local_migration;
pub mod observers;
pub mod sync;
pub mod timer;
pub mod websocket;

const JSON_BODY_LIMIT: u64 = 16 * 1024;
const IMPORT_BODY_LIMIT: u64 = 4 * 1024 * 1024;

#[derive(Deserialize)]
struct SignInRequest {
    token: String,
}

#[derive(Serialize)]
struct SignInResponse {
    account: Account,
    /// Absent when the upload of local data failed; it is retried next time.
    migration: Option<MigrationOutcome>,
}

pub fn create_routes(
    state: Arc<AppState>,
    connection_manager: Arc<ConnectionManager>,
    auth_service: Arc<AuthService>,
) -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone {
    let state_filter = warp::any().map({
        let state = state.clone();
        move || state.clone()
    });

    let connection_manager_filter = warp::any().map({
        let connection_manager = connection_manager.clone();
        move || connection_manager.clone()
    });

    let auth_filter = warp::any().map({
        let auth_service = auth_service.clone();
        move || auth_service.clone()
    });

    let websocket = warp::path("ws")
        .and(warp::ws())
        .and(connection_manager_filter)
        .and(state_filter.clone())
        .and(auth_filter.clone())
        .map(|ws: warp::ws::Ws, conn_mgr, state, auth| {
            ws.on_upgrade(move |socket| websocket::handle_connection(socket, conn_mgr, state, auth))
        });

    let health = warp::path("health")
        .and(warp::get())
        .map(|| warp::reply::with_status("OK", StatusCode::OK));

    // Identity
    let sign_in = warp::path!("auth" / "sign-in")
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and(auth_filter)
        .and_then(handle_sign_in);

    let sign_out = warp::path!("auth" / "sign-out")
        .and(warp::post())
        .and(state_filter.clone())
        .and_then(|state: Arc<AppState>| async move {
            state.sign_out().await;
            Ok::<_, warp::Rejection>(StatusCode::NO_CONTENT)
        });

    let account = warp::path!("auth" / "account")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(|state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(json_reply(state.require_account().await, StatusCode::OK))
        });

    // Roster
    let list_players = warp::path!("players")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(|state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(json_reply(Ok(state.players().await), StatusCode::OK))
        });

    let create_player = warp::path!("players")
        .and(warp::post())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(|draft: PlayerDraft, state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(json_reply(
                state.add_player(draft).await,
                StatusCode::CREATED,
            ))
        });

    let update_player = warp::path!("players" / String)
        .and(warp::put())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(
            |player_id: String, draft: PlayerDraft, state: Arc<AppState>| async move {
                Ok::<_, warp::Rejection>(json_reply(
                    state.update_player(&player_id, draft).await,
                    StatusCode::OK,
                ))
            },
        );

    let delete_player = warp::path!("players" / String)
        .and(warp::delete())
        .and(state_filter.clone())
        .and_then(|player_id: String, state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(empty_reply(state.remove_player(&player_id).await))
        });

    // History
    let list_games = warp::path!("games")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(|state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(json_reply(Ok(state.history().await), StatusCode::OK))
        });

    let update_game = warp::path!("games" / String)
        .and(warp::put())
        .and(warp::body::content_length_limit(JSON_BODY_LIMIT))
        .and(warp::body::json())
        .and(state_filter.clone())
        .and_then(|game_id: String, edit: GameEdit, state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(json_reply(
                state.update_game(&game_id, edit).await,
                StatusCode::OK,
            ))
        });

    let delete_game = warp::path!("games" / String)
        .and(warp::delete())
        .and(state_filter.clone())
        .and_then(|game_id: String, state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(empty_reply(state.remove_game(&game_id).await))
        });

    let game_report = warp::path!("games" / String / "report")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(|game_id: String, state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(json_reply(state.report(&game_id).await, StatusCode::OK))
        });

    let export_game = warp::path!("games" / String / "export")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(|game_id: String, state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(file_reply(state.export_game(&game_id).await))
        });

    let export_history = warp::path!("games" / "export")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(|state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(file_reply(state.export_history().await))
        });

    let import_games = warp::path!("games" / "import")
        .and(warp::post())
        .and(warp::body::content_length_limit(IMPORT_BODY_LIMIT))
        .and(warp::body::bytes())
        .and(state_filter.clone())
        .and_then(handle_import);

    // Dashboard
    let dashboard = warp::path!("dashboard")
        .and(warp::get())
        .and(state_filter.clone())
        .and_then(|state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(json_reply(Ok(state.dashboard(None).await), StatusCode::OK))
        });

    let player_dashboard = warp::path!("dashboard" / String)
        .and(warp::get())
        .and(state_filter)
        .and_then(|player_id: String, state: Arc<AppState>| async move {
            Ok::<_, warp::Rejection>(json_reply(
                Ok(state.dashboard(Some(&player_id)).await),
                StatusCode::OK,
            ))
        });

    let cors = warp::cors()
        .allow_any_origin()
        .allow_headers(vec!["content-type", "authorization"])
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE"]);

    websocket
        .or(health)
        .or(sign_in)
        .or(sign_out)
        .or(account)
        .or(list_players)
        .or(create_player)
        .or(update_player)
        .or(delete_player)
        .or(list_games)
        .or(export_history)
        .or(import_games)
        .or(update_game)
        .or(delete_game)
        .or(game_report)
        .or(export_game)
        .or(dashboard)
        .or(player_dashboard)
        .with(cors)
        .with(warp::log("courtside"))
}

async fn handle_sign_in(
    request: SignInRequest,
    state: Arc<AppState>,
    auth_service: Arc<AuthService>,
) -> Result<Response, warp::Rejection> {
    let account = match auth_service.validate_token(&request.token) {
        Ok(account) => account,
        Err(e) => {
            tracing::warn!("Sign-in rejected: {}", e);
            return Ok(error_reply(ApiError::AuthenticationFailed {
                reason: e.to_string(),
            }));
        }
    };

    let migration = state.sign_in(account.clone()).await;
    Ok(json_reply(Ok(SignInResponse { account, migration }), StatusCode::OK))
}

async fn handle_import(
    body: warp::hyper::body::Bytes,
    state: Arc<AppState>,
) -> Result<Response, warp::Rejection> {
    let text = match std::str::from_utf8(&body) {
        Ok(text) => text,
        Err(_) => {
            return Ok(error_reply(ApiError::InvalidImport {
                reason: "file is not UTF-8 text".to_string(),
            }));
        }
    };
    Ok(json_reply(state.import_games(text).await, StatusCode::OK))
}

pub fn status_for(error: &ApiError) -> StatusCode {
    match error {
        ApiError::AuthenticationRequired | ApiError::AuthenticationFailed { .. } => {
            StatusCode::UNAUTHORIZED
        }
        ApiError::PlayerNotFound { .. } | ApiError::GameNotFound { .. } => StatusCode::NOT_FOUND,
        ApiError::NoActiveSession
        | ApiError::FouledOut
        | ApiError::ConfirmationRequired { .. } => StatusCode::CONFLICT,
        ApiError::StatUnavailable { .. }
        | ApiError::InvalidImport { .. }
        | ApiError::InvalidRequest { .. } => StatusCode::BAD_REQUEST,
        ApiError::RemoteFailure { .. } => StatusCode::BAD_GATEWAY,
        ApiError::RateLimitExceeded => StatusCode::TOO_MANY_REQUESTS,
    }
}

fn error_reply(error: ApiError) -> Response {
    let status = status_for(&error);
    warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": error,
            "message": error.message(),
        })),
        status,
    )
    .into_response()
}

fn json_reply<T: Serialize>(result: Result<T, ApiError>, status: StatusCode) -> Response {
    match result {
        Ok(value) => warp::reply::with_status(warp::reply::json(&value), status).into_response(),
        Err(error) => error_reply(error),
    }
}

fn empty_reply(result: Result<(), ApiError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(error) => error_reply(error),
    }
}

fn file_reply(result: Result<ExportFile, ApiError>) -> Response {
    match result {
        Ok(file) => {
            let disposition = format!("attachment; filename=\"{}\"", file.file_name);
            let reply = warp::reply::with_header(file.contents, "content-type", "application/json");
            warp::reply::with_header(reply, "content-disposition", disposition).into_response()
        }
        Err(error) => error_reply(error),
    }
}
