use anyhow::Context;
use axum::{Extension, Form, extract::State, response::IntoResponse};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel::result::DatabaseErrorKind;
use diesel_async::{AsyncConnection, RunQueryDsl};
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, DieselError, StdResponse},
    app_state::AppState,
    auth::{self, TokenResponse},
    coupon_codes,
    middleware,
    models::{CreateCartEntity, CreateUserEntity, UserEntity},
    schema::{carts, coupons, users},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(register))
        .routes(utoipa_axum::routes!(login))
        .routes(utoipa_axum::routes!(ristoratore_login))
        .merge(
            OpenApiRouter::new()
                .routes(utoipa_axum::routes!(logout))
                .route_layer(axum::middleware::from_fn(
                    middleware::customers_authorization,
                )),
        )
}

#[derive(Deserialize, ToSchema)]
struct CredentialsReq {
    username: String,
    password: String,
}

/// Register a new customer. The user, their cart and their coupon batch are
/// created in one transaction; the response logs them straight in.
#[utoipa::path(
    post,
    path = "/register",
    tags = ["Users"],
    request_body(content = CredentialsReq, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Registered successfully", body = StdResponse<TokenResponse, String>)
    )
)]
async fn register(
    State(state): State<AppState>,
    Form(body): Form<CredentialsReq>,
) -> Result<impl IntoResponse, AppError> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(AppError::Validation(
            "Username and password are required".to_string(),
        ));
    }

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let password_hash = auth::hash_password(&body.password)?;
    let username = body.username.clone();

    let user = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let user: UserEntity = diesel::insert_into(users::table)
                    .values(CreateUserEntity {
                        username,
                        password_hash,
                    })
                    .returning(UserEntity::as_returning())
                    .get_result(conn)
                    .await
                    .map_err(|err| match err {
                        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                            AppError::Validation("Username already taken".to_string())
                        }
                        other => other.into(),
                    })?;

                diesel::insert_into(carts::table)
                    .values(CreateCartEntity { user_id: user.id })
                    .execute(conn)
                    .await
                    .context("Failed to create cart")?;

                diesel::insert_into(coupons::table)
                    .values(coupon_codes::issue_batch(user.id))
                    .execute(conn)
                    .await
                    .context("Failed to issue coupons")?;

                Ok::<UserEntity, AppError>(user)
            })
        })
        .await?;

    tracing::info!("Registered user #{} ({})", user.id, user.username);

    let token = auth::generate_token(&user)?;

    Ok(StdResponse {
        data: Some(token),
        message: Some("Registered successfully"),
    })
}

/// Log in as a customer.
#[utoipa::path(
    post,
    path = "/login",
    tags = ["Users"],
    request_body(content = CredentialsReq, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in successfully", body = StdResponse<TokenResponse, String>)
    )
)]
async fn login(
    State(state): State<AppState>,
    Form(body): Form<CredentialsReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let user = find_by_credentials(conn, &body).await?;

    let token = auth::generate_token(&user)?;

    Ok(StdResponse {
        data: Some(token),
        message: Some("Logged in successfully"),
    })
}

/// Log in to the staff surface. Requires the ristoratore flag.
#[utoipa::path(
    post,
    path = "/ristoratore/login",
    tags = ["Users"],
    request_body(content = CredentialsReq, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Logged in successfully", body = StdResponse<TokenResponse, String>)
    )
)]
async fn ristoratore_login(
    State(state): State<AppState>,
    Form(body): Form<CredentialsReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let user = find_by_credentials(conn, &body).await?;
    if !user.is_ristoratore {
        return Err(AppError::InvalidCredentials);
    }

    let token = auth::generate_token(&user)?;

    Ok(StdResponse {
        data: Some(token),
        message: Some("Logged in successfully"),
    })
}

/// Tokens are stateless, so logout is a client-side discard; the endpoint
/// only confirms the token was valid.
#[utoipa::path(
    post,
    path = "/logout",
    tags = ["Users"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Logged out", body = StdResponse<String, String>)
    )
)]
async fn logout(Extension(customer_id): Extension<i32>) -> impl IntoResponse {
    tracing::debug!("User #{customer_id} logged out");
    StdResponse::<String, _> {
        data: None,
        message: Some("Logged out"),
    }
}

async fn find_by_credentials(
    conn: &mut diesel_async::AsyncPgConnection,
    credentials: &CredentialsReq,
) -> Result<UserEntity, AppError> {
    let user: Option<UserEntity> = users::table
        .filter(users::username.eq(&credentials.username))
        .first(conn)
        .await
        .optional()
        .context("Failed to look up user")?;

    match user {
        Some(user) if auth::verify_password(&credentials.password, &user.password_hash) => Ok(user),
        _ => Err(AppError::InvalidCredentials),
    }
}
