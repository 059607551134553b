use anyhow::Result;
use axum::Router;
use diesel_migrations::{EmbeddedMigrations, embed_migrations};
use wdland_foodservice::{
    bootstrap::{self, bootstrap},
    config, db, routes, swagger,
};

/// Migrations embedded into the binary which helps with streamlining image building process
const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    bootstrap::init_tracing();
    bootstrap::init_env();

    let routes = routes::home::routes_with_openapi()
        .merge(routes::users::routes_with_openapi())
        .merge(routes::fast_foods::routes_with_openapi())
        .merge(routes::customers::products::routes_with_openapi())
        .merge(routes::customers::carts::routes_with_openapi())
        .merge(routes::customers::coupons::routes_with_openapi())
        .merge(routes::customers::orders::routes_with_openapi())
        .merge(routes::ristoratori::orders::routes_with_openapi());

    let mut openapi = routes.get_openapi().clone();
    openapi.info = utoipa::openapi::InfoBuilder::new()
        .title("WDLand FoodService API")
        .version("1.0.0")
        .build();
    let swagger_ui = swagger::create_swagger_ui(openapi)?;

    let app = Router::new().merge(routes).merge(swagger_ui);

    tracing::info!("Running migrations...");
    let config = config::load()?;
    let migrations_count = db::run_migrations_blocking(MIGRATIONS, &config.database.url).await?;
    tracing::info!("Run {} new migrations successfully", migrations_count);

    tracing::info!("Bootstrapping...");
    bootstrap("FoodService", app).await?;
    Ok(())
}
