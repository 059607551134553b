use anyhow::Context;
use axum::{extract::State, response::IntoResponse};
use diesel_async::RunQueryDsl;
use serde::Serialize;
use utoipa::ToSchema;
use utoipa_axum::router::OpenApiRouter;

use crate::{
    app_error::{AppError, StdResponse},
    app_state::AppState,
    models::FastFoodEntity,
    schema::fast_foods,
};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(utoipa_axum::routes!(map))
}

#[derive(Serialize, ToSchema)]
struct MapPoint {
    pub lat: f64,
    pub lng: f64,
    pub name: String,
    pub address: String,
}

impl From<FastFoodEntity> for MapPoint {
    fn from(fast_food: FastFoodEntity) -> Self {
        MapPoint {
            lat: fast_food.latitude,
            lng: fast_food.longitude,
            name: fast_food.name,
            address: fast_food.address,
        }
    }
}

/// All fast-food locations as map points.
#[utoipa::path(
    get,
    path = "/map",
    tags = ["FastFoods"],
    responses(
        (status = 200, description = "List fast-food locations", body = StdResponse<Vec<MapPoint>, String>)
    )
)]
async fn map(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let conn = &mut state
        .db_pool
        .get()
        .await
        .context("Failed to obtain a DB connection pool")?;

    let fast_foods: Vec<FastFoodEntity> = fast_foods::table
        .get_results(conn)
        .await
        .context("Failed to get fast foods")?;

    let points: Vec<MapPoint> = fast_foods.into_iter().map(MapPoint::from).collect();

    Ok(StdResponse {
        data: Some(points),
        message: Some("Get fast foods successfully"),
    })
}
