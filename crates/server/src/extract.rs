//! Identity resolution for protected routes.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum_extra::extract::cookie::CookieJar;
use service::auth::errors::AuthError;
use service::Requester;
use tracing::warn;

use crate::errors::ApiError;
use crate::state::ServerState;

pub const AUTH_COOKIE: &str = "auth_token";

/// Authenticated requester. Reads `Authorization: Bearer <jwt>`, falling back
/// to the `auth_token` cookie.
#[derive(Debug, Clone, Copy)]
pub struct CurrentUser(pub Requester);

/// Token from the request headers, if any.
pub fn bearer_token(parts: &Parts) -> Result<Option<String>, ApiError> {
    if let Some(h) = parts.headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok()) {
        return match h.strip_prefix("Bearer ") {
            Some(t) if !t.trim().is_empty() => Ok(Some(t.trim().to_string())),
            _ => {
                warn!(path = %parts.uri.path(), "invalid Authorization format (expect Bearer)");
                Err(ApiError::unauthorized())
            }
        };
    }

    let token = CookieJar::from_headers(&parts.headers)
        .get(AUTH_COOKIE)
        .map(|c| c.value().trim().to_string())
        .filter(|t| !t.is_empty());
    Ok(token)
}

#[axum::async_trait]
impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ServerState) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts)? else {
            warn!(path = %parts.uri.path(), "missing Authorization header and auth_token cookie");
            return Err(AuthError::MissingToken.into());
        };
        let requester = state.auth.authenticate(&token).await?;
        Ok(CurrentUser(requester))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut b = Request::builder().uri("/service-providers");
        for (k, v) in headers {
            b = b.header(*k, *v);
        }
        b.body(()).unwrap().into_parts().0
    }

    #[test]
    fn header_wins_over_cookie() {
        let p = parts(&[("authorization", "Bearer abc"), ("cookie", "auth_token=def")]);
        assert_eq!(bearer_token(&p).unwrap().as_deref(), Some("abc"));
    }

    #[test]
    fn cookie_is_the_fallback() {
        let p = parts(&[("cookie", "theme=dark; auth_token=def")]);
        assert_eq!(bearer_token(&p).unwrap().as_deref(), Some("def"));
        assert_eq!(bearer_token(&parts(&[])).unwrap(), None);
    }

    #[test]
    fn empty_or_lookalike_cookies_are_ignored() {
        assert_eq!(bearer_token(&parts(&[("cookie", "auth_token=")])).unwrap(), None);
        assert_eq!(bearer_token(&parts(&[("cookie", "auth_token_old=stale")])).unwrap(), None);
    }

    #[test]
    fn non_bearer_scheme_is_rejected() {
        let p = parts(&[("authorization", "Basic dXNlcjpwdw==")]);
        assert!(bearer_token(&p).is_err());
    }
}
