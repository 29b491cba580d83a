// --- File: crates/services/agenda_backend/src/lib.rs ---
//! Router assembly for the Agenda server.
//!
//! Everything public lives under `/api`; `/health` sits outside it so load
//! balancers don't depend on the API prefix.

use agenda_common::SchedulingStore;
use agenda_config::AppConfig;
use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
#[allow(unused_imports)]
use tracing::{info, warn};

async fn health() -> &'static str {
    "OK"
}

/// Builds the complete application router.
///
/// Reminder routes are only mounted when `use_reminders` is set and the
/// gateway is configured; a broken gateway section disables reminders
/// without taking the booking API down.
pub fn build_app(config: &AppConfig, store: Arc<dyn SchedulingStore>) -> Router {
    #[allow(unused_mut)] // mutated only by optional features
    let mut api = Router::new()
        .route("/", get(|| async { "Welcome to the Agenda API!" }))
        .merge(agenda_slots::routes::routes(store.clone()));

    #[cfg(feature = "reminders")]
    if config.use_reminders {
        match agenda_reminders::routes::routes(config, store.clone()) {
            Ok(reminder_router) => {
                info!("Reminder routes enabled");
                api = api.merge(reminder_router);
            }
            Err(e) => warn!("Reminders disabled: {}", e),
        }
    }
    #[cfg(not(feature = "reminders"))]
    if config.use_reminders {
        warn!("use_reminders is set but the binary was built without the reminders feature");
    }

    #[allow(unused_mut)]
    let mut app = Router::new()
        .route("/health", get(health))
        .nest("/api", api);

    #[cfg(feature = "openapi")]
    {
        app = app.merge(swagger_ui());
    }

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

#[cfg(feature = "openapi")]
fn swagger_ui() -> utoipa_swagger_ui::SwaggerUi {
    use agenda_slots::doc::SlotsApiDoc;
    use utoipa::OpenApi;
    use utoipa_swagger_ui::SwaggerUi;

    #[derive(OpenApi)]
    #[openapi(
        info(
            title = "Agenda API",
            version = "0.1.0",
            description = "Salon booking and reminder endpoints"
        ),
        servers((url = "/api", description = "Main API Prefix"))
    )]
    struct ApiDoc;

    let mut openapi_doc = ApiDoc::openapi();
    openapi_doc.merge(SlotsApiDoc::openapi());
    #[cfg(feature = "reminders")]
    openapi_doc.merge(agenda_reminders::doc::RemindersApiDoc::openapi());
    info!("Adding Swagger UI at /api/docs");

    SwaggerUi::new("/api/docs").url("/api/docs/openapi.json", openapi_doc)
}
