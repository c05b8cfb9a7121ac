//! REST API server implementation

use actix_cors::Cors;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::error::InternalError;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use futures::future::{ready, Either, FutureExt};
use std::sync::Arc;
use tracing::{debug, info};
use utoipa_swagger_ui::SwaggerUi;

use finder_common::config::{FinderConfig, ServerConfig};
use finder_common::error::Result;
use finder_common::types::ApiError;
use finder_store::RecordStore;

use crate::handlers;
use crate::openapi::api_doc;
use crate::ratelimit::{RateLimitConfig, RateLimiter};
use crate::service::RestaurantService;

/// Build the app configuration shared by every worker.
///
/// Registers the shared state, the `/health` route, the `/v1/restaurants`
/// scope and, when `docs` is given, Swagger UI at `/api/`. The rate limiter
/// wraps the whole scope so it runs before body and query extraction.
pub fn configure(
    service: Arc<RestaurantService>,
    rate_limiter: Arc<RateLimiter>,
    docs: Option<utoipa::openapi::OpenApi>,
) -> impl Fn(&mut web::ServiceConfig) + Clone + Send + 'static {
    move |cfg: &mut web::ServiceConfig| {
        let limiter = rate_limiter.clone();

        cfg.app_data(web::Data::new(service.clone()))
            .app_data(json_config())
            .app_data(query_config())
            // Health check (no rate limit)
            .route("/health", web::get().to(handlers::health_handler))
            .service(
                web::scope("/v1/restaurants")
                    .wrap_fn(move |req, srv| {
                        if let Some(response) = handlers::rate_limited(req.request(), &limiter) {
                            let limited = req.into_response(response).map_into_right_body();
                            return Either::Left(ready(Ok(limited)));
                        }
                        Either::Right(
                            srv.call(req)
                                .map(|res| res.map(ServiceResponse::map_into_left_body)),
                        )
                    })
                    .route("", web::get().to(handlers::search_handler))
                    .route("", web::post().to(handlers::add_handler))
                    .route("/{id}", web::get().to(handlers::get_handler))
                    .route("/{id}", web::put().to(handlers::update_handler))
                    .route("/{id}", web::delete().to(handlers::delete_handler)),
            );

        if let Some(doc) = &docs {
            cfg.service(SwaggerUi::new("/api/{_:.*}").url("/api-docs/openapi.json", doc.clone()));
        }
    }
}

/// Unreadable JSON bodies answer 400 in the API's error shape
fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        debug!("Rejected request body: {}", err);
        let response = HttpResponse::BadRequest().json(ApiError::new(
            "invalid_input",
            format!("Invalid JSON body: {err}"),
        ));
        InternalError::from_response(err, response).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest()
            .json(ApiError::new("invalid_input", "Invalid input parameters"));
        InternalError::from_response(err, response).into()
    })
}

fn cors(config: &ServerConfig) -> Cors {
    if config.cors_origins.iter().any(|origin| origin == "*") {
        return Cors::permissive();
    }

    config
        .cors_origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
}

/// Restaurant finder HTTP server
pub struct RestServer {
    config: FinderConfig,
    service: Arc<RestaurantService>,
    rate_limiter: Arc<RateLimiter>,
}

impl RestServer {
    /// Create a server over an already constructed record store
    pub fn new(config: &FinderConfig, store: Arc<dyn RecordStore>) -> Self {
        let service = Arc::new(RestaurantService::new(store));
        let rate_limiter = Arc::new(RateLimiter::new(RateLimitConfig::from(&config.rate_limit)));

        Self {
            config: config.clone(),
            service,
            rate_limiter,
        }
    }

    /// Get the restaurant service
    #[must_use]
    pub fn service(&self) -> Arc<RestaurantService> {
        self.service.clone()
    }

    /// Get the rate limiter
    #[must_use]
    pub fn rate_limiter(&self) -> Arc<RateLimiter> {
        self.rate_limiter.clone()
    }

    /// Run the HTTP server until it is stopped
    ///
    /// # Errors
    /// Returns an error if the listen address cannot be bound.
    pub async fn run(&self) -> Result<()> {
        let server_config = self.config.server.clone();
        let host = server_config.host.clone();
        let port = server_config.port;
        let docs = self
            .config
            .docs
            .enabled
            .then(|| api_doc(&self.config.docs));

        info!("Starting REST API server on {}:{}", host, port);
        let limits = self.rate_limiter.config();
        if limits.enabled {
            info!(
                "  Rate limiting: {} req per {}s per IP",
                limits.max_requests,
                limits.window.as_secs()
            );
            self.spawn_cleanup();
        }
        if docs.is_some() {
            info!("  API docs: http://{}:{}/api/", host, port);
        }

        let app_config = configure(self.service.clone(), self.rate_limiter.clone(), docs);

        HttpServer::new(move || {
            App::new()
                .wrap(cors(&server_config))
                .wrap(middleware::Compress::default())
                .wrap(middleware::Logger::default())
                .configure(app_config.clone())
        })
        .workers(self.config.server.workers)
        .bind((host.as_str(), port))?
        .run()
        .await?;

        Ok(())
    }

    /// Periodically drop elapsed rate limit windows
    fn spawn_cleanup(&self) {
        let limiter = self.rate_limiter.clone();
        let period = limiter.config().window;
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            loop {
                interval.tick().await;
                limiter.cleanup();
                debug!(clients = limiter.tracked_clients(), "Rate limit windows pruned");
            }
        });
    }
}
