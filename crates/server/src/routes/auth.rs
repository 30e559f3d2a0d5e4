use axum::{extract::{rejection::JsonRejection, State}, http::StatusCode, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use common::ApiResponse;
use serde::Serialize;
use serde_json::Value;

use service::auth::domain::{AuthUser, LoginInput, RegisterInput};

use crate::{errors::ApiError, extract::{CurrentUser, AUTH_COOKIE}, state::ServerState};

#[derive(Debug, Serialize)]
pub struct LoginOutput {
    pub success: bool,
    pub token: String,
    pub data: AuthUser,
}

#[utoipa::path(post, path = "/auth/register", tag = "auth", request_body = crate::openapi::RegisterRequest, responses((status = 201, description = "Registered"), (status = 400, description = "Bad Request"), (status = 409, description = "Conflict")))]
pub async fn register(
    State(state): State<ServerState>,
    body: Result<Json<RegisterInput>, JsonRejection>,
) -> Result<(StatusCode, Json<ApiResponse<AuthUser>>), ApiError> {
    let Json(input) = body?;
    let user = state.auth.register(input).await?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(user))))
}

/// Issues a JWT in the body and as an http-only `auth_token` cookie.
#[utoipa::path(post, path = "/auth/login", tag = "auth", request_body = crate::openapi::LoginRequest, responses((status = 200, description = "Logged In"), (status = 401, description = "Unauthorized")))]
pub async fn login(
    State(state): State<ServerState>,
    jar: CookieJar,
    body: Result<Json<LoginInput>, JsonRejection>,
) -> Result<(CookieJar, Json<LoginOutput>), ApiError> {
    let Json(input) = body?;
    let session = state.auth.login(input).await?;
    let mut cookie = Cookie::new(AUTH_COOKIE, session.token.clone());
    cookie.set_path("/");
    cookie.set_http_only(true);
    cookie.set_secure(false);
    cookie.set_same_site(SameSite::Lax);
    let jar = jar.add(cookie);
    Ok((jar, Json(LoginOutput { success: true, token: session.token, data: session.user })))
}

#[utoipa::path(post, path = "/auth/logout", tag = "auth", responses((status = 200, description = "Cookie cleared")))]
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<ApiResponse<Value>>) {
    let jar = jar.remove(Cookie::build(AUTH_COOKIE).path("/"));
    (jar, Json(ApiResponse::done()))
}

#[utoipa::path(get, path = "/auth/me", tag = "auth", responses((status = 200, description = "Current user"), (status = 401, description = "Unauthorized")), security(("bearer" = [])))]
pub async fn me(
    State(state): State<ServerState>,
    CurrentUser(requester): CurrentUser,
) -> Result<Json<ApiResponse<AuthUser>>, ApiError> {
    let user = state.auth.current_user(&requester).await?;
    Ok(Json(ApiResponse::ok(user)))
}
