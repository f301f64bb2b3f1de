//! Bearer-token endpoints: create a pair from credentials, refresh an access
//! token, verify any token.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use quill_core::models::TokenPair;

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CreateIn {
    pub username: Option<String>,
    pub password: Option<String>,
}

pub async fn create(
    State(state): State<AppState>,
    Json(input): Json<CreateIn>,
) -> Result<Json<TokenPair>, ApiError> {
    let username = input.username.ok_or_else(|| ApiError::field("username", "This field is required."))?;
    let password = input.password.ok_or_else(|| ApiError::field("password", "This field is required."))?;

    match state.auth.authenticate(&username, &password).await? {
        Some(user) => Ok(Json(state.tokens.issue_pair(user.id)?)),
        None => Err(ApiError::Unauthenticated(
            "No active account found with the given credentials",
        )),
    }
}

#[derive(Debug, Deserialize)]
pub struct RefreshIn {
    pub refresh: Option<String>,
}

pub async fn refresh(
    State(state): State<AppState>,
    Json(input): Json<RefreshIn>,
) -> Result<Json<Value>, ApiError> {
    let token = input.refresh.ok_or_else(|| ApiError::field("refresh", "This field is required."))?;
    let access = state
        .tokens
        .refresh(&token)
        .map_err(|_| ApiError::Unauthenticated("Token is invalid or expired"))?;
    Ok(Json(json!({ "access": access })))
}

#[derive(Debug, Deserialize)]
pub struct VerifyIn {
    pub token: Option<String>,
}

pub async fn verify(
    State(state): State<AppState>,
    Json(input): Json<VerifyIn>,
) -> Result<Json<Value>, ApiError> {
    let token = input.token.ok_or_else(|| ApiError::field("token", "This field is required."))?;
    state
        .tokens
        .validate(&token)
        .map_err(|_| ApiError::Unauthenticated("Token is invalid or expired"))?;
    Ok(Json(json!({})))
}
