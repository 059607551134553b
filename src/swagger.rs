use anyhow::Result;
use axum::Router;
use utoipa::openapi::{
    Components, OpenApi,
    security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_swagger_ui::SwaggerUi;

/// Serves the generated OpenAPI document plus the `bearerAuth` scheme the
/// route annotations reference.
pub fn create_swagger_ui<S>(mut openapi: OpenApi) -> Result<Router<S>>
where
    S: Clone + Send + Sync + 'static,
{
    let components = openapi.components.get_or_insert(Components::new());
    components.add_security_scheme(
        "bearerAuth",
        SecurityScheme::Http(
            HttpBuilder::new()
                .scheme(HttpAuthScheme::Bearer)
                .bearer_format("JWT")
                .build(),
        ),
    );

    Ok(SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", openapi)
        .into())
}
