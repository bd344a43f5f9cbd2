//! OpenAPI documentation.

use crate::api::handlers;
use crate::models::{
    HealthResponse, LoginRequest, MessageResponse, RandomNumberResponse, Record, TokenResponse,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Name of the bearer security scheme referenced by protected paths.
pub const BEARER_SECURITY: &str = "bearer";

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::root,
        handlers::health_check,
        handlers::login,
        handlers::hello,
        handlers::list_accounts,
        handlers::create_account,
        handlers::update_account,
        handlers::delete_account,
        handlers::restore_backup,
        handlers::random_number,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            TokenResponse,
            MessageResponse,
            Record,
            RandomNumberResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "Authentication", description = "Token issuance and checks"),
        (name = "Accounts", description = "Trading account records"),
        (name = "Random", description = "Random number log"),
    ),
    info(
        title = "Trading Accounts API",
        version = "0.1.0",
        description = "REST API for managing trading account records",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

/// Registers the bearer token scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            BEARER_SECURITY,
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_openapi_lists_all_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/",
            "/health",
            "/api/v1/auth/login",
            "/api/v1/hello",
            "/api/v1/accounts",
            "/api/v1/accounts/{user}",
            "/api/v1/backup/restore",
            "/api/v1/random",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_openapi_registers_bearer_scheme() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key(BEARER_SECURITY));
    }

    #[test]
    fn test_record_schema_uses_column_names() {
        let json = ApiDoc::openapi().to_json().unwrap();
        assert!(json.contains("API key"));
        assert!(json.contains("API secret"));
    }
}
