use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{IntoParams, Modify, OpenApi, ToSchema};
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(utoipa::ToSchema)]
pub struct RegisterRequest {
    pub email: String,
    pub name: String,
    pub password: String,
    /// `user` or `provider`
    pub role: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct LoginRequest { pub email: String, pub password: String }

/// Reserved list keys. Any other key filters: `field=value` or
/// `field[gt|gte|lt|lte|in]=value`.
#[allow(dead_code)]
#[derive(IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQueryDoc {
    /// Comma-separated fields to return; `id` is always included
    pub select: Option<String>,
    /// Comma-separated sort keys, `-` prefix for descending; default `-rating`
    pub sort: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ServiceProviderDoc {
    pub id: Uuid,
    pub user: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: f64,
    pub status: String,
    pub is_verified: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(utoipa::ToSchema)]
pub struct CreateServiceProviderDoc {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub status: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct UpdateServiceProviderDoc {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub rating: Option<f64>,
    pub status: Option<String>,
}

#[derive(utoipa::ToSchema)]
pub struct StatusRequest {
    /// `active`, `inactive` or `suspended`
    pub status: String,
}

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRequest { pub is_verified: bool }

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StatusViewDoc { pub id: Uuid, pub name: String, pub status: String, pub updated_at: String }

#[derive(serde::Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct VerificationViewDoc { pub id: Uuid, pub name: String, pub is_verified: bool, pub updated_at: String }

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::auth::register,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::me,
        crate::routes::service_providers::list,
        crate::routes::service_providers::get_one,
        crate::routes::service_providers::create,
        crate::routes::service_providers::update,
        crate::routes::service_providers::delete,
        crate::routes::service_providers::set_status,
        crate::routes::service_providers::set_verification,
    ),
    components(
        schemas(
            HealthResponse,
            RegisterRequest,
            LoginRequest,
            ServiceProviderDoc,
            CreateServiceProviderDoc,
            UpdateServiceProviderDoc,
            StatusRequest,
            VerificationRequest,
            StatusViewDoc,
            VerificationViewDoc,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health"),
        (name = "auth"),
        (name = "service-providers")
    )
)]
pub struct ApiDoc;
