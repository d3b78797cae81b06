//! Account endpoints

use std::sync::Arc;

use axum::{body::Bytes, extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::auth::{AccountService, Registration};
use crate::http::error::ApiError;
use crate::http::extractors::JsonBody;
use crate::http::response::{success, Envelope};
use crate::http::server::AppState;
use crate::models::{require, AccountView};

/// Register request. Accepts the web client's `userName` spelling.
#[derive(Deserialize)]
pub struct RegisterRequest {
    pub account: Option<String>,
    #[serde(alias = "userName")]
    pub username: Option<String>,
    #[serde(alias = "passwd")]
    pub password: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub account: Option<String>,
    #[serde(alias = "passwd")]
    pub password: Option<String>,
}

#[derive(Deserialize, Default)]
pub struct LogoutRequest {
    pub token: Option<String>,
}

fn service(state: &AppState) -> AccountService<'_> {
    AccountService::new(state.store(), &state.sessions, state.session_config.bcrypt_cost)
}

/// POST /account/register
async fn register(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<RegisterRequest>,
) -> Result<Json<Envelope<AccountView>>, ApiError> {
    let account = require(req.account, "account")?;
    let username = require(req.username, "username")?;
    let password = require(req.password, "password")?;
    let registration = Registration::new(&account, &username, &password)?;

    let view = service(&state).register(registration).await?;
    Ok(success(view))
}

/// POST /account/login
async fn login(
    State(state): State<Arc<AppState>>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<Envelope<AccountView>>, ApiError> {
    let account = require(req.account, "account")?;
    let password = require(req.password, "password")?;

    let view = service(&state).login(&account, &password).await?;
    Ok(success(view))
}

/// POST /account/logout
///
/// Always succeeds. A body carrying `token` revokes that session; an empty
/// or unreadable body is accepted as a no-op.
async fn logout(State(state): State<Arc<AppState>>, body: Bytes) -> Json<Envelope<()>> {
    let req: LogoutRequest = serde_json::from_slice(&body).unwrap_or_default();
    service(&state).logout(req.token.as_deref()).await;
    success(())
}

/// Account routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/account/register", post(register))
        .route("/account/login", post(login))
        .route("/account/logout", post(logout))
}
