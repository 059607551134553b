use anyhow::Context;
use axum::{Extension, Form, extract::State, response::IntoResponse};
use diesel_async::RunQueryDsl;
use serde::Deserialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    middleware,
    models::ProductEntity,
    routes::customers::carts::{AddToCartRes, add_product_to_cart},
    schema::products,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_products, add_product))
        .route_layer(axum::middleware::from_fn(
            middleware::customers_authorization,
        ))
}

/// The full product catalog.
#[utoipa::path(
    get,
    path = "/prodotti",
    tags = ["Products"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List products", body = StdResponse<Vec<ProductEntity>, String>)
    )
)]
async fn get_products(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let products: Vec<ProductEntity> = products::table
        .get_results(conn)
        .await
        .context("Failed to get products")?;

    Ok(StdResponse {
        data: Some(products),
        message: Some("Get products successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct AddProductReq {
    product_id: i32,
}

/// Form submission from the products page; adds one unit to the cart.
#[utoipa::path(
    post,
    path = "/prodotti",
    tags = ["Products"],
    security(("bearerAuth" = [])),
    request_body(content = AddProductReq, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Added product to cart", body = StdResponse<AddToCartRes, String>)
    )
)]
async fn add_product(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
    Form(body): Form<AddProductReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let res = add_product_to_cart(conn, customer_id, body.product_id).await?;

    Ok(StdResponse {
        data: Some(res),
        message: Some("Added product to cart successfully"),
    })
}
