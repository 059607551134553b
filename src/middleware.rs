use axum::{
    extract::Request, http::header::AUTHORIZATION, middleware::Next, response::Response,
};

use crate::{app_error::AppError, auth};

fn bearer_claims(request: &Request) -> Result<auth::Claims, AppError> {
    let auth_header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|header| header.to_str().ok())
        .ok_or(AppError::Unauthorized)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AppError::Unauthorized)?;

    auth::verify_token(token)
}

/// Requires a valid bearer token and exposes the user id as an extension.
pub async fn customers_authorization(
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = bearer_claims(&request)?;
    request.extensions_mut().insert(claims.sub);
    Ok(next.run(request).await)
}

/// As `customers_authorization`, but only lets ristoratori through.
pub async fn ristoratori_authorization(
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let claims = bearer_claims(&request)?;
    if !claims.is_ristoratore {
        return Err(AppError::ForbiddenResource(
            "Only ristoratori may manage orders".to_string(),
        ));
    }
    request.extensions_mut().insert(claims.sub);
    Ok(next.run(request).await)
}
