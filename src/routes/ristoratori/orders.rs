use anyhow::Context;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use diesel::{ExpressionMethods, QueryDsl, SelectableHelper};
use diesel_async::RunQueryDsl;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    middleware,
    models::{FastFoodEntity, OrderEntity, OrderStatus},
    routes::format_order_timestamp,
    schema::{fast_foods, orders},
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(utoipa_axum::routes!(gestione_ordine))
        .routes(utoipa_axum::routes!(update_order_status))
        .route_layer(axum::middleware::from_fn(
            middleware::ristoratori_authorization,
        ))
}

#[derive(Serialize, ToSchema)]
struct GetOrderRes {
    pub order: OrderEntity,
    pub created_at_local: String,
}

#[derive(Serialize, ToSchema)]
struct GestioneOrdineRes {
    pub fast_foods: Vec<FastFoodEntity>,
    pub selected_fast_food: String,
    pub orders: Vec<GetOrderRes>,
}

#[derive(Deserialize)]
struct GestioneOrdineQuery {
    fast_food: Option<i32>,
}

/// The staff order board: every order, or one fast food's orders when the
/// filter is present.
#[utoipa::path(
    get,
    path = "/gestione_ordine",
    tags = ["Gestione"],
    security(("bearerAuth" = [])),
    params(
        ("fast_food" = Option<i32>, Query, description = "Only orders of this fast food")
    ),
    responses(
        (status = 200, description = "List orders for management", body = StdResponse<GestioneOrdineRes, String>)
    )
)]
async fn gestione_ordine(
    Query(query): Query<GestioneOrdineQuery>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let fast_foods: Vec<FastFoodEntity> = fast_foods::table
        .get_results(conn)
        .await
        .context("Failed to get fast foods")?;

    let (selected_fast_food, orders): (String, Vec<OrderEntity>) = match query.fast_food {
        Some(fast_food_id) => {
            let fast_food: FastFoodEntity = fast_foods::table
                .find(fast_food_id)
                .get_result(conn)
                .await?;

            let orders = orders::table
                .filter(orders::fast_food_id.eq(fast_food_id))
                .order_by(orders::created_at.desc())
                .get_results(conn)
                .await
                .context("Failed to get orders")?;

            (fast_food.name, orders)
        }
        None => {
            let orders = orders::table
                .order_by(orders::created_at.desc())
                .get_results(conn)
                .await
                .context("Failed to get orders")?;

            ("Tutti".to_string(), orders)
        }
    };

    let orders = orders
        .into_iter()
        .map(|order| GetOrderRes {
            created_at_local: format_order_timestamp(order.created_at),
            order,
        })
        .collect();

    Ok(StdResponse {
        data: Some(GestioneOrdineRes {
            fast_foods,
            selected_fast_food,
            orders,
        }),
        message: Some("Get orders successfully"),
    })
}

#[derive(Deserialize, ToSchema)]
struct UpdateOrderStatusReq {
    status: String,
}

/// Move an order to another workflow state. The state must belong to the
/// fixed set; no particular ordering is enforced between states.
#[utoipa::path(
    post,
    path = "/update_order_status/{order_id}",
    tags = ["Gestione"],
    security(("bearerAuth" = [])),
    params(
        ("order_id" = i32, Path, description = "Order to update")
    ),
    request_body(content = UpdateOrderStatusReq, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Updated order status", body = StdResponse<OrderEntity, String>)
    )
)]
async fn update_order_status(
    Path(order_id): Path<i32>,
    State(state): State<AppState>,
    Form(body): Form<UpdateOrderStatusReq>,
) -> Result<impl IntoResponse, AppError> {
    let Some(status) = OrderStatus::parse(&body.status) else {
        return Err(AppError::BadRequest(format!(
            "{} is not a valid order status",
            body.status
        )));
    };

    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let updated_order: OrderEntity = diesel::update(orders::table.find(order_id))
        .set((
            orders::status.eq(status.as_str()),
            orders::updated_at.eq(diesel::dsl::now),
        ))
        .returning(OrderEntity::as_returning())
        .get_result(conn)
        .await?;

    tracing::info!("Order #{} moved to {}", updated_order.id, updated_order.status);

    Ok(StdResponse {
        data: Some(updated_order),
        message: Some("Updated order status successfully"),
    })
}
