use anyhow::Context;
use axum::{
    Extension,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, QueryResult, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, DieselError, StdResponse},
    app_state::AppState,
    middleware,
    models::CouponEntity,
    schema::coupons,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_coupons))
        .routes(utoipa_axum::routes!(reveal_coupon))
        .route_layer(axum::middleware::from_fn(
            middleware::customers_authorization,
        ))
}

/// A coupon as shown to its owner; the code stays hidden until revealed.
#[derive(Serialize, ToSchema)]
struct CouponView {
    pub id: i32,
    pub code: Option<String>,
    pub discount: i32,
    pub description: String,
    pub is_revealed: bool,
}

impl From<CouponEntity> for CouponView {
    fn from(coupon: CouponEntity) -> Self {
        CouponView {
            id: coupon.id,
            code: coupon.is_revealed.then_some(coupon.code),
            discount: coupon.discount,
            description: coupon.description,
            is_revealed: coupon.is_revealed,
        }
    }
}

/// The authenticated customer's active coupons.
#[utoipa::path(
    get,
    path = "/coupon",
    tags = ["Coupons"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List my coupons", body = StdResponse<Vec<CouponView>, String>)
    )
)]
async fn get_coupons(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let coupons: Vec<CouponEntity> = coupons::table
        .filter(coupons::user_id.eq(customer_id))
        .filter(coupons::is_active.eq(true))
        .order_by(coupons::id.asc())
        .get_results(conn)
        .await
        .context("Failed to get coupons")?;

    let coupons: Vec<CouponView> = coupons.into_iter().map(CouponView::from).collect();

    Ok(StdResponse {
        data: Some(coupons),
        message: Some("Get coupons successfully"),
    })
}

/// Reveal the code of one of the customer's active coupons. A coupon that is
/// missing, foreign or already inactive leaves the store untouched and the
/// response carries no data.
#[utoipa::path(
    post,
    path = "/reveal_coupon/{coupon_id}",
    tags = ["Coupons"],
    security(("bearerAuth" = [])),
    params(
        ("coupon_id" = i32, Path, description = "Coupon to reveal")
    ),
    responses(
        (status = 200, description = "Reveal outcome", body = StdResponse<CouponView, String>)
    )
)]
async fn reveal_coupon(
    Path(coupon_id): Path<i32>,
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let revealed: QueryResult<CouponEntity> = diesel::update(
        coupons::table
            .find(coupon_id)
            .filter(coupons::user_id.eq(customer_id))
            .filter(coupons::is_active.eq(true)),
    )
    .set(coupons::is_revealed.eq(true))
    .returning(CouponEntity::as_returning())
    .get_result(conn)
    .await;

    match revealed {
        Ok(coupon) => Ok(StdResponse {
            data: Some(CouponView::from(coupon)),
            message: Some("Coupon revealed"),
        }),
        Err(DieselError::NotFound) => Ok(StdResponse {
            data: None,
            message: Some("Coupon not available"),
        }),
        Err(err) => Err(AppError::Other(err.into())),
    }
}
