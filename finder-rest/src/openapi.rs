//! OpenAPI document for the restaurant API

use utoipa::OpenApi;

use finder_common::config::DocsConfig;

/// Generated description of every `/v1/restaurants` operation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Restaurant Finder",
        version = "1.0",
        description = "Find restaurants near you"
    ),
    paths(
        crate::handlers::search_handler,
        crate::handlers::add_handler,
        crate::handlers::get_handler,
        crate::handlers::update_handler,
        crate::handlers::delete_handler,
    ),
    components(
        schemas(
            finder_common::restaurant::Restaurant,
            finder_common::restaurant::RestaurantInput,
            finder_common::restaurant::CreatedRestaurant,
            finder_common::restaurant::SearchResults,
            finder_common::types::DeletedResponse,
            finder_common::types::ApiError,
        )
    ),
    tags(
        (name = "restaurants", description = "Restaurant records and proximity search"),
    ),
)]
pub struct ApiDoc;

/// The document with title, description and version taken from configuration
#[must_use]
pub fn api_doc(config: &DocsConfig) -> utoipa::openapi::OpenApi {
    let mut doc = ApiDoc::openapi();
    doc.info.title.clone_from(&config.title);
    doc.info.description = Some(config.description.clone());
    doc.info.version.clone_from(&config.version);
    doc
}
