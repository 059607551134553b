use anyhow::Context;
use axum::{Extension, Form, extract::State, response::IntoResponse};
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::{AsyncConnection, RunQueryDsl};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    middleware,
    models::{
        CartEntity, CartItemEntity, CouponEntity, CreateOrderEntity, FastFoodEntity, OrderEntity,
        OrderStatus, OrderType, ProductEntity,
    },
    pricing,
    routes::format_order_timestamp,
    schema::{cart_items, carts, coupons, fast_foods, orders, products},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(get_my_orders))
        .routes(utoipa_axum::routes!(create_order))
        .route_layer(axum::middleware::from_fn(
            middleware::customers_authorization,
        ))
}

#[derive(Serialize, ToSchema)]
struct GetOrderRes {
    pub order: OrderEntity,
    pub created_at_local: String,
}

impl From<OrderEntity> for GetOrderRes {
    fn from(order: OrderEntity) -> Self {
        GetOrderRes {
            created_at_local: format_order_timestamp(order.created_at),
            order,
        }
    }
}

/// Fetch all orders belonging to the authenticated customer, newest first.
#[utoipa::path(
    get,
    path = "/orders",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    responses(
        (status = 200, description = "List my orders", body = StdResponse<Vec<GetOrderRes>, String>)
    )
)]
async fn get_my_orders(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let orders: Vec<OrderEntity> = orders::table
        .filter(orders::user_id.eq(customer_id))
        .order_by(orders::created_at.desc())
        .get_results(conn)
        .await
        .context("Failed to get my orders")?;

    let orders: Vec<GetOrderRes> = orders.into_iter().map(GetOrderRes::from).collect();

    Ok(StdResponse {
        data: Some(orders),
        message: Some("Get my orders successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct CreateOrderReq {
    order_type: String,
    address: Option<String>,
    city: Option<String>,
    fast_food: Option<i32>,
}

/// Where a validated order goes: a delivery address or a fast food.
#[derive(Debug, PartialEq, Eq)]
enum OrderDestination {
    Delivery { address: String, city: String },
    InLoco { fast_food_id: i32 },
}

impl OrderDestination {
    fn order_type(&self) -> OrderType {
        match self {
            OrderDestination::Delivery { .. } => OrderType::Delivery,
            OrderDestination::InLoco { .. } => OrderType::InLoco,
        }
    }
}

fn validate_order_request(req: &CreateOrderReq) -> Result<OrderDestination, AppError> {
    let order_type = OrderType::parse_form_value(&req.order_type).ok_or_else(|| {
        AppError::BadRequest(format!("{} is not a valid order type", req.order_type))
    })?;

    match order_type {
        OrderType::Delivery => {
            let address = req.address.as_deref().unwrap_or("").trim();
            let city = req.city.as_deref().unwrap_or("").trim();
            if address.is_empty() || city.is_empty() {
                return Err(AppError::Validation(
                    "Address and city are required for delivery".to_string(),
                ));
            }
            Ok(OrderDestination::Delivery {
                address: address.to_string(),
                city: city.to_string(),
            })
        }
        OrderType::InLoco => match req.fast_food {
            Some(fast_food_id) => Ok(OrderDestination::InLoco { fast_food_id }),
            None => Err(AppError::Validation(
                "A fast food must be selected for on-site pickup".to_string(),
            )),
        },
    }
}

/// The line-item snapshot stored on the order record.
fn render_order_items(lines: &[(CartItemEntity, ProductEntity)]) -> String {
    lines
        .iter()
        .map(|(item, product)| format!("{}x {}", item.quantity, product.name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Place an order from the authenticated customer's cart. Snapshotting the
/// order and emptying the cart happen in one transaction; a failed
/// validation mutates nothing.
#[utoipa::path(
    post,
    path = "/create_order",
    tags = ["Orders"],
    security(("bearerAuth" = [])),
    request_body(content = CreateOrderReq, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Created order successfully", body = StdResponse<GetOrderRes, String>)
    )
)]
async fn create_order(
    State(state): State<AppState>,
    Extension(customer_id): Extension<i32>,
    Form(body): Form<CreateOrderReq>,
) -> Result<impl IntoResponse, AppError> {
    let destination = validate_order_request(&body)?;

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let order = conn
        .transaction(move |conn| {
            Box::pin(async move {
                if let OrderDestination::InLoco { fast_food_id } = destination {
                    let _: FastFoodEntity = fast_foods::table
                        .find(fast_food_id)
                        .get_result(conn)
                        .await?;
                }

                let cart: CartEntity = carts::table
                    .filter(carts::user_id.eq(customer_id))
                    .first(conn)
                    .await?;

                let lines: Vec<(CartItemEntity, ProductEntity)> = cart_items::table
                    .inner_join(products::table)
                    .filter(cart_items::cart_id.eq(cart.id))
                    .select((CartItemEntity::as_select(), ProductEntity::as_select()))
                    .get_results(conn)
                    .await
                    .context("Failed to get cart items")?;

                if lines.is_empty() {
                    return Err(AppError::Validation(
                        "Cannot place an order with an empty cart".to_string(),
                    ));
                }

                let subtotal = pricing::subtotal(
                    lines
                        .iter()
                        .map(|(item, product)| (item.quantity, product.price)),
                );

                let total_price = match cart.coupon_id {
                    Some(coupon_id) => {
                        let coupon: CouponEntity = coupons::table
                            .find(coupon_id)
                            .get_result(conn)
                            .await
                            .context("Failed to get applied coupon")?;
                        pricing::discounted_total(subtotal, coupon.discount)
                    }
                    None => subtotal,
                };

                let order_type = destination.order_type();
                let (fast_food_id, delivery_address, delivery_city) = match destination {
                    OrderDestination::Delivery { address, city } => (None, Some(address), Some(city)),
                    OrderDestination::InLoco { fast_food_id } => (Some(fast_food_id), None, None),
                };

                let order: OrderEntity = diesel::insert_into(orders::table)
                    .values(CreateOrderEntity {
                        user_id: customer_id,
                        total_price,
                        items: render_order_items(&lines),
                        status: OrderStatus::OrdineRicevuto.as_str().to_string(),
                        order_type: order_type.as_str().to_string(),
                        fast_food_id,
                        delivery_address,
                        delivery_city,
                    })
                    .returning(OrderEntity::as_returning())
                    .get_result(conn)
                    .await
                    .context("Failed to create order")?;

                diesel::delete(cart_items::table.filter(cart_items::cart_id.eq(cart.id)))
                    .execute(conn)
                    .await
                    .context("Failed to clear cart items")?;

                diesel::update(carts::table.find(cart.id))
                    .set((
                        carts::total_price.eq(Decimal::ZERO),
                        carts::coupon_id.eq(None::<i32>),
                        carts::updated_at.eq(diesel::dsl::now),
                    ))
                    .execute(conn)
                    .await
                    .context("Failed to reset cart")?;

                Ok::<OrderEntity, AppError>(order)
            })
        })
        .await?;

    tracing::info!(
        "Order #{} placed by user #{customer_id} ({})",
        order.id,
        order.order_type
    );

    Ok(StdResponse {
        data: Some(GetOrderRes::from(order)),
        message: Some("Order placed successfully"),
    })
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use super::*;

    fn delivery_req(address: Option<&str>, city: Option<&str>) -> CreateOrderReq {
        CreateOrderReq {
            order_type: "delivery".to_string(),
            address: address.map(str::to_string),
            city: city.map(str::to_string),
            fast_food: None,
        }
    }

    fn line(quantity: i32, name: &str, price: Decimal) -> (CartItemEntity, ProductEntity) {
        let now = Utc::now();
        (
            CartItemEntity {
                id: 1,
                cart_id: 1,
                product_id: 1,
                quantity,
                created_at: now,
                updated_at: now,
            },
            ProductEntity {
                id: 1,
                name: name.to_string(),
                price,
                image_name: None,
                created_at: now,
                updated_at: now,
            },
        )
    }

    #[test]
    fn delivery_requires_address_and_city() {
        assert!(matches!(
            validate_order_request(&delivery_req(None, None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_order_request(&delivery_req(Some("Via Roma 1"), None)),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            validate_order_request(&delivery_req(Some("  "), Some("Milano"))),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn valid_delivery_request_carries_trimmed_fields() {
        let destination =
            validate_order_request(&delivery_req(Some(" Via Roma 1 "), Some("Milano"))).unwrap();
        assert_eq!(
            destination,
            OrderDestination::Delivery {
                address: "Via Roma 1".to_string(),
                city: "Milano".to_string(),
            }
        );
        assert_eq!(destination.order_type(), OrderType::Delivery);
    }

    #[test]
    fn in_loco_requires_a_fast_food() {
        let req = CreateOrderReq {
            order_type: "in_loco".to_string(),
            address: None,
            city: None,
            fast_food: None,
        };
        assert!(matches!(
            validate_order_request(&req),
            Err(AppError::Validation(_))
        ));

        let req = CreateOrderReq {
            fast_food: Some(3),
            ..req
        };
        assert_eq!(
            validate_order_request(&req).unwrap(),
            OrderDestination::InLoco { fast_food_id: 3 }
        );
    }

    #[test]
    fn unknown_order_type_is_a_bad_request() {
        let req = CreateOrderReq {
            order_type: "asporto".to_string(),
            address: None,
            city: None,
            fast_food: None,
        };
        assert!(matches!(
            validate_order_request(&req),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn order_items_render_as_a_comma_separated_list() {
        let lines = vec![
            line(2, "Pizza Margherita", dec!(5.00)),
            line(1, "Coca Cola", dec!(2.50)),
        ];
        assert_eq!(
            render_order_items(&lines),
            "2x Pizza Margherita, 1x Coca Cola"
        );
    }

    #[test]
    fn empty_line_list_renders_empty() {
        assert_eq!(render_order_items(&[]), "");
    }
}
