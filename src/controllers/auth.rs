use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::post, Json, Router};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};
use validator::Validate;

use crate::error::ApiError;
use crate::models::User;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/signup", post(signup))
        .route("/auth/login", post(login))
}

#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    #[validate(length(min = 3, max = 32, message = "username must be 3-32 characters"))]
    pub username: String,
    #[validate(email(message = "email must be valid"))]
    pub email: String,
    #[validate(length(min = 6, message = "password must be at least 6 characters"))]
    pub password: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "password is required"))]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
}

// POST /api/auth/signup
async fn signup(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE username = $1 OR email = $2)",
    )
    .bind(&req.username)
    .bind(&req.email)
    .fetch_one(&state.db.pool)
    .await?;

    if taken {
        warn!("signup rejected, username or email already in use");
        return Err(ApiError::validation("username or email is already taken"));
    }

    let hash = bcrypt::hash(&req.password, bcrypt::DEFAULT_COST)?;
    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(&req.username)
    .bind(&req.email)
    .bind(hash)
    .fetch_one(&state.db.pool)
    .await?;

    info!(user_id, username = %req.username, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({ "id": user_id, "message": "user registered" })),
    ))
}

// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    req.validate()
        .map_err(|e| ApiError::validation(e.to_string()))?;

    let user = User::find_by_username(&req.username, &state.db)
        .await?
        .ok_or(ApiError::Unauthorized)?;

    if !user.verify_password(&req.password) {
        warn!(username = %req.username, "failed login attempt");
        return Err(ApiError::Unauthorized);
    }

    let token = crate::auth::issue_token(user.id, &user.username, &state.config.jwt)?;
    info!(username = %user.username, "login successful");

    Ok(Json(TokenResponse {
        token,
        user_id: user.id,
        username: user.username,
        email: user.email,
    }))
}
