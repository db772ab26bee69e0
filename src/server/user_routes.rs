//! Account routes. No tokens or sessions are issued: a successful login only
//! returns the profile, later calls identify the user by handle.

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::server::error::ApiResult;
use crate::server::extract::{ApiJson, ApiPath};
use crate::server::metrics::record_login_attempt;
use crate::server::state::{GuardedUserManager, ServerState};
use crate::user::{NewUser, User, UserError, UserUpdate};

#[derive(Deserialize)]
pub struct LoginBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub message: &'static str,
    pub username: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub email: String,
    pub username: String,
    pub full_name: String,
    pub dob: Option<NaiveDate>,
}

async fn signup(
    State(user_manager): State<GuardedUserManager>,
    ApiJson(body): ApiJson<NewUser>,
) -> ApiResult<(StatusCode, Json<SignupResponse>)> {
    let user = user_manager.sign_up(&body)?;
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully",
            username: user.handle,
        }),
    ))
}

async fn login(
    State(user_manager): State<GuardedUserManager>,
    ApiJson(body): ApiJson<LoginBody>,
) -> ApiResult<Json<LoginResponse>> {
    debug!("login() called for {}", body.email);
    let start = Instant::now();
    let result = user_manager.login(&body.email, &body.password);
    let status = match &result {
        Ok(_) => "success",
        Err(UserError::InvalidCredentials) => "failure",
        Err(_) => "error",
    };
    record_login_attempt(status, start.elapsed());

    let user = result?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        email: user.email,
        username: user.handle,
        full_name: user.full_name,
        dob: user.dob,
    }))
}

async fn get_user(
    State(user_manager): State<GuardedUserManager>,
    ApiPath(id): ApiPath<usize>,
) -> ApiResult<Json<User>> {
    Ok(Json(user_manager.get_user(id)?))
}

async fn update_user(
    State(user_manager): State<GuardedUserManager>,
    ApiPath(id): ApiPath<usize>,
    ApiJson(update): ApiJson<UserUpdate>,
) -> ApiResult<Json<User>> {
    Ok(Json(user_manager.update_user(id, &update)?))
}

pub fn user_routes() -> Router<ServerState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/{id}", get(get_user).put(update_user))
}
