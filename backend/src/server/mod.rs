//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};
use tracing::warn;
use url::Url;

use companion::Trace;
use companion::domain::TRACE_ID_HEADER;
#[cfg(debug_assertions)]
use companion::doc::ApiDoc;
use companion::inbound::http::configure;
use companion::inbound::http::health::{HealthState, live, ready};
use companion::inbound::http::state::HttpState;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

const CORS_MAX_AGE_SECS: usize = 3600;

/// Build the cross-origin policy for the mini-app frontend.
///
/// Entries that are not bare `http`/`https` origins are skipped with a
/// warning; a wildcard is never honoured because requests carry credentials.
pub(crate) fn cors_policy(allowed_origins: &[String]) -> Cors {
    allowed_origins.iter().fold(
        Cors::default()
            .allowed_methods(["GET", "PUT", "POST", "DELETE"])
            .allow_any_header()
            .expose_headers([TRACE_ID_HEADER])
            .supports_credentials()
            .max_age(CORS_MAX_AGE_SECS),
        |cors, origin| match web_origin(origin) {
            Some(origin) => cors.allowed_origin(&origin),
            None => {
                warn!(%origin, "ignoring unusable CORS origin");
                cors
            }
        },
    )
}

fn web_origin(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    if !matches!(url.scheme(), "http" | "https") || url.host().is_none() {
        return None;
    }
    Some(url.origin().ascii_serialization())
}

pub(crate) fn build_app(
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    allowed_origins: &[String],
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .wrap(cors_policy(allowed_origins))
        .configure(configure)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server and mark the service ready once the
/// listener is bound.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ServerConfig {
        bind_addr,
        http_state,
        allowed_origins,
    } = config;

    let server = HttpServer::new(move || {
        build_app(
            server_health_state.clone(),
            http_state.clone(),
            &allowed_origins,
        )
    })
        .bind(bind_addr)?
        .run();

    health_state.mark_ready();
    Ok(server)
}
