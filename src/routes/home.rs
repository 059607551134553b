use axum::response::IntoResponse;
use utoipa_axum::router::OpenApiRouter;

use crate::{app_error::StdResponse, app_state::AppState};

pub fn routes_with_openapi() -> OpenApiRouter<AppState> {
    OpenApiRouter::new().routes(utoipa_axum::routes!(homepage))
}

/// Public service banner.
#[utoipa::path(
    get,
    path = "/",
    tags = ["Home"],
    responses(
        (status = 200, description = "Service banner", body = StdResponse<String, String>)
    )
)]
async fn homepage() -> impl IntoResponse {
    StdResponse::<String, _> {
        data: None,
        message: Some("Benvenuto da WDLand FoodService"),
    }
}
