use anyhow::Context;
use axum::{
    Extension, Form,
    extract::{Path, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, OptionalExtension, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, AsyncPgConnection, RunQueryDsl};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, DieselError, StdResponse},
    app_state::AppState,
    middleware,
    models::{
        CartEntity, CartItemEntity, CouponEntity, CreateCartEntity, CreateCartItemEntity,
        ProductEntity,
    },
    pricing,
    schema::{cart_items, carts, coupons, products},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_cart))
        .routes(utoipa_axum::routes!(add_to_cart))
        .routes(utoipa_axum::routes!(remove_from_cart))
        .routes(utoipa_axum::routes!(apply_coupon))
        .route_layer(axum::middleware::from_fn(
            middleware::customers_authorization,
        ))
}

#[derive(Serialize, ToSchema)]
struct CartLine {
    pub cart_item: CartItemEntity,
    pub product: ProductEntity,
}

#[derive(Serialize, ToSchema)]
struct GetCartRes {
    pub cart: CartEntity,
    pub items: Vec<CartLine>,
    pub coupon: Option<CouponEntity>,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub discount: Decimal,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

/// Fetch the authenticated customer's cart. Totals are recomputed from the
/// line items, not read from the cached column.
#[utoipa::path(
    get,
    path = "/cart",
    tags = ["Carts"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "Get cart successfully", body = StdResponse<GetCartRes, String>)
    )
)]
async fn get_cart(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let cart = get_or_create_cart(conn, customer_id).await?;

    let lines: Vec<(CartItemEntity, ProductEntity)> = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::cart_id.eq(cart.id))
        .select((CartItemEntity::as_select(), ProductEntity::as_select()))
        .get_results(conn)
        .await
        .context("Failed to get cart items")?;

    let subtotal = pricing::subtotal(
        lines
            .iter()
            .map(|(item, product)| (item.quantity, product.price)),
    );

    let coupon: Option<CouponEntity> = match cart.coupon_id {
        Some(coupon_id) => Some(
            coupons::table
                .find(coupon_id)
                .get_result(conn)
                .await
                .context("Failed to get applied coupon")?,
        ),
        None => None,
    };

    let (discount, total_price) = match &coupon {
        Some(coupon) => (
            pricing::discount_amount(subtotal, coupon.discount),
            pricing::discounted_total(subtotal, coupon.discount),
        ),
        None => (Decimal::ZERO, subtotal),
    };

    Ok(StdResponse {
        data: Some(GetCartRes {
            cart,
            items: lines
                .into_iter()
                .map(|(cart_item, product)| CartLine { cart_item, product })
                .collect(),
            coupon,
            subtotal,
            discount,
            total_price,
        }),
        message: Some("Get cart successfully"),
    })
}

#[derive(Serialize, ToSchema)]
pub struct AddToCartRes {
    pub cart_item: CartItemEntity,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

/// Add one unit of a product to the cart, creating the line item if needed.
#[utoipa::path(
    post,
    path = "/add_to_cart/{product_id}",
    tags = ["Carts"],
    security(("bearerAuth" = [])),
    params(
        ("product_id" = i32, Path, description = "Product to add")
    ),
    responses(
        (status = 200, description = "Added product to cart", body = StdResponse<AddToCartRes, String>)
    )
)]
async fn add_to_cart(
    Path(product_id): Path<i32>,
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let res = add_product_to_cart(conn, customer_id, product_id).await?;

    Ok(StdResponse {
        data: Some(res),
        message: Some("Added product to cart successfully"),
    })
}

#[derive(Serialize, ToSchema)]
struct RemoveFromCartRes {
    pub removed_item: CartItemEntity,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

/// Remove a line item. Items in other customers' carts are out of reach.
#[utoipa::path(
    post,
    path = "/remove_from_cart/{cart_item_id}",
    tags = ["Carts"],
    security(("bearerAuth" = [])),
    params(
        ("cart_item_id" = i32, Path, description = "Cart item to remove")
    ),
    responses(
        (status = 200, description = "Removed item from cart", body = StdResponse<RemoveFromCartRes, String>)
    )
)]
async fn remove_from_cart(
    Path(cart_item_id): Path<i32>,
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let res = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let cart: CartEntity = carts::table
                    .filter(carts::user_id.eq(customer_id))
                    .first(conn)
                    .await?;

                let removed_item: CartItemEntity = diesel::delete(
                    cart_items::table
                        .find(cart_item_id)
                        .filter(cart_items::cart_id.eq(cart.id)),
                )
                .returning(CartItemEntity::as_returning())
                .get_result(conn)
                .await?;

                let total_price = refresh_cart_total(conn, cart.id).await?;

                Ok::<RemoveFromCartRes, AppError>(RemoveFromCartRes {
                    removed_item,
                    total_price,
                })
            })
        })
        .await?;

    Ok(StdResponse {
        data: Some(res),
        message: Some("Removed item from cart successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct ApplyCouponReq {
    coupon_code: String,
}

#[derive(Serialize, ToSchema)]
struct ApplyCouponRes {
    pub cart: CartEntity,
    pub coupon: CouponEntity,
    #[schema(value_type = String)]
    pub subtotal: Decimal,
    #[schema(value_type = String)]
    pub discount: Decimal,
    #[schema(value_type = String)]
    pub total_price: Decimal,
}

/// Apply one of the customer's own active coupons to their cart. The coupon
/// is deactivated in the same transaction; a cart holds at most one coupon.
#[utoipa::path(
    post,
    path = "/apply_coupon",
    tags = ["Carts"],
    security(("bearerAuth" = [])),
    request_body(content = ApplyCouponReq, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Applied coupon to cart", body = StdResponse<ApplyCouponRes, String>)
    )
)]
async fn apply_coupon(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
    Form(body): Form<ApplyCouponReq>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let res = conn
        .transaction(move |conn| {
            Box::pin(async move {
                let cart: CartEntity = carts::table
                    .filter(carts::user_id.eq(customer_id))
                    .first(conn)
                    .await?;

                if cart.coupon_id.is_some() {
                    return Err(AppError::Validation(
                        "A coupon is already applied to this cart".to_string(),
                    ));
                }

                let coupon: Option<CouponEntity> = coupons::table
                    .filter(coupons::code.eq(&body.coupon_code))
                    .filter(coupons::user_id.eq(customer_id))
                    .filter(coupons::is_active.eq(true))
                    .first(conn)
                    .await
                    .optional()
                    .context("Failed to look up coupon")?;

                let Some(coupon) = coupon else {
                    return Err(AppError::Validation(
                        "Coupon code is invalid or already used".to_string(),
                    ));
                };

                let cart: CartEntity = diesel::update(carts::table.find(cart.id))
                    .set((
                        carts::coupon_id.eq(coupon.id),
                        carts::updated_at.eq(diesel::dsl::now),
                    ))
                    .returning(CartEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to attach coupon to cart")?;

                let coupon: CouponEntity = diesel::update(coupons::table.find(coupon.id))
                    .set(coupons::is_active.eq(false))
                    .returning(CouponEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to deactivate coupon")?;

                let subtotal = cart_subtotal(conn, cart.id).await?;

                Ok::<ApplyCouponRes, AppError>(ApplyCouponRes {
                    subtotal,
                    discount: pricing::discount_amount(subtotal, coupon.discount),
                    total_price: pricing::discounted_total(subtotal, coupon.discount),
                    cart,
                    coupon,
                })
            })
        })
        .await?;

    Ok(StdResponse {
        data: Some(res),
        message: Some("Applied coupon successfully"),
    })
}

/// Customers get their cart lazily; registration creates it, but older rows
/// may predate that.
pub(crate) async fn get_or_create_cart(
    conn: &mut AsyncPgConnection,
    customer_id: i32,
) -> Result<CartEntity, AppError> {
    let cart: Option<CartEntity> = carts::table
        .filter(carts::user_id.eq(customer_id))
        .first(conn)
        .await
        .optional()
        .context("Failed to get cart")?;

    if let Some(cart) = cart {
        return Ok(cart);
    }

    diesel::insert_into(carts::table)
        .values(CreateCartEntity {
            user_id: customer_id,
        })
        .on_conflict(carts::user_id)
        .do_nothing()
        .execute(conn)
        .await
        .context("Failed to create cart")?;

    let cart = carts::table
        .filter(carts::user_id.eq(customer_id))
        .first(conn)
        .await
        .context("Failed to get created cart")?;

    Ok(cart)
}

/// Live subtotal over `cart_items × products`.
pub(crate) async fn cart_subtotal(
    conn: &mut AsyncPgConnection,
    cart_id: i32,
) -> Result<Decimal, AppError> {
    let rows: Vec<(i32, Decimal)> = cart_items::table
        .inner_join(products::table)
        .filter(cart_items::cart_id.eq(cart_id))
        .select((cart_items::quantity, products::price))
        .get_results(conn)
        .await
        .context("Failed to load cart lines")?;

    Ok(pricing::subtotal(rows))
}

/// Recomputes the subtotal and writes it back to the cached column. Must run
/// inside the same transaction as the mutation that invalidated it.
pub(crate) async fn refresh_cart_total(
    conn: &mut AsyncPgConnection,
    cart_id: i32,
) -> Result<Decimal, AppError> {
    let subtotal = cart_subtotal(conn, cart_id).await?;

    diesel::update(carts::table.find(cart_id))
        .set((
            carts::total_price.eq(subtotal),
            carts::updated_at.eq(diesel::dsl::now),
        ))
        .execute(conn)
        .await
        .context("Failed to refresh cart total")?;

    Ok(subtotal)
}

/// Upserts the (cart, product) line and refreshes the cached total, all in
/// one transaction. Shared with the products page's form submission.
pub(crate) async fn add_product_to_cart(
    conn: &mut AsyncPgConnection,
    customer_id: i32,
    product_id: i32,
) -> Result<AddToCartRes, AppError> {
    conn.transaction(move |conn| {
        Box::pin(async move {
            let product: ProductEntity = products::table
                .find(product_id)
                .get_result(conn)
                .await
                .map_err(|err| match err {
                    DieselError::NotFound => AppError::NotFound,
                    other => AppError::Other(other.into()),
                })?;

            let cart = get_or_create_cart(conn, customer_id).await?;

            let cart_item: CartItemEntity = diesel::insert_into(cart_items::table)
                .values(CreateCartItemEntity {
                    cart_id: cart.id,
                    product_id: product.id,
                    quantity: 1,
                })
                .on_conflict((cart_items::cart_id, cart_items::product_id))
                .do_update()
                .set(cart_items::quantity.eq(cart_items::quantity + 1))
                .returning(CartItemEntity::as_returning())
                .get_result(conn)
                .await
                .context("Failed to upsert cart item")?;

            let total_price = refresh_cart_total(conn, cart.id).await?;

            Ok::<AddToCartRes, AppError>(AddToCartRes {
                cart_item,
                total_price,
            })
        })
    })
    .await
}
