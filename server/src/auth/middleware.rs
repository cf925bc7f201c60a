//! Authentication middleware
//!
//! Bearer-token verification. Role gating happens inside the workflow
//! engine, which authorizes every privileged operation against the
//! account store before executing it.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{CurrentUser, JwtService};
use crate::core::ServerState;
use crate::db::repository::AccountRepository;
use crate::security_log;
use crate::utils::AppError;

/// Authentication middleware.
///
/// Extracts and verifies the `Authorization: Bearer <token>` header and
/// injects [`CurrentUser`] into the request extensions. On a principal's
/// first sign-in the backing account record is created (`user` role, no
/// entitlements).
///
/// Skipped for:
/// - `OPTIONS *` (CORS preflight)
/// - non-`/api/` paths
/// - `/api/health`
/// - `/api/payments/reconcile` (provider callback; authenticity comes from
///   re-fetching the session upstream, not from a bearer token)
/// - `GET /api/parcels` and `GET /api/assets` (public listings)
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    let is_public_api_route = path == "/api/health"
        || path == "/api/payments/reconcile"
        || (req.method() == http::Method::GET && (path == "/api/parcels" || path == "/api/assets"));
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or(AppError::InvalidToken)?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::Unauthorized);
        }
    };

    match state.jwt_service.validate_token(token) {
        Ok(claims) => {
            let user = CurrentUser::from(claims);

            // First sign-in creates the account record
            let accounts = AccountRepository::new(state.db.clone());
            accounts
                .find_or_create(&user.email)
                .await
                .map_err(AppError::from)?;

            req.extensions_mut().insert(user);
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            match e {
                crate::auth::JwtError::ExpiredToken => Err(AppError::TokenExpired),
                _ => Err(AppError::InvalidToken),
            }
        }
    }
}

