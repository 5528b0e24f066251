//! HTTP surface: the `/api/v1` router and its shared state.
//!
//! # Routes
//!
//! - `GET /` health text
//! - `GET /api/v1/bootcamps` list, courses populated
//! - `GET /api/v1/bootcamps/{id}` read
//! - `GET|POST /api/v1/bootcamps/{id}/courses` list scoped to the bootcamp, or create in it
//! - `GET /api/v1/bootcamps/{id}/reviews` list scoped to the bootcamp
//! - `GET|POST /api/v1/courses` list with bootcamp name and description, or create
//! - `GET|PUT|DELETE /api/v1/courses/{id}`
//! - `GET /api/v1/reviews` list with bootcamp name and description
//! - `GET /api/v1/reviews/{id}` read

mod error;
mod handlers;

pub use error::ApiResult;

use crate::advanced::{AdvancedResults, PaginationConfig};
use crate::engine::Engine;
use crate::resources;
use crate::store::{DocumentStore, Populate};
use axum::Router;
use axum::routing::get;
use std::sync::Arc;

pub const API_PREFIX: &str = "/api/v1";

/// A list endpoint: the store it reads and the pipeline settings fixed for the route.
#[derive(Clone)]
pub struct Listing {
    pub store: Arc<dyn DocumentStore>,
    pub results: AdvancedResults,
}

impl Listing {
    pub fn new(store: Arc<dyn DocumentStore>, results: AdvancedResults) -> Self {
        Self { store, results }
    }
}

/// Shared state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    engine: Arc<Engine>,
    pub bootcamps: Listing,
    pub courses: Listing,
    pub reviews: Listing,
}

impl AppState {
    /// Wire the standard listings over `engine`, installing the collections if needed.
    pub fn new(engine: Arc<Engine>, pagination: PaginationConfig) -> Self {
        resources::install(&engine);
        let base = AdvancedResults::new().with_pagination(pagination);
        let bootcamp_summary = || Populate::path("bootcamp").select("name description");
        Self {
            bootcamps: Listing::new(
                Arc::new(resources::bootcamp_store(Arc::clone(&engine))),
                base.clone().with_populate("courses"),
            ),
            courses: Listing::new(
                Arc::new(resources::course_store(Arc::clone(&engine))),
                base.clone().with_populate(bootcamp_summary()),
            ),
            reviews: Listing::new(
                Arc::new(resources::review_store(Arc::clone(&engine))),
                base.with_populate(bootcamp_summary()),
            ),
            engine,
        }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .route("/bootcamps", get(handlers::list_bootcamps))
        .route("/bootcamps/{id}", get(handlers::get_bootcamp))
        .route(
            "/bootcamps/{id}/courses",
            get(handlers::list_bootcamp_courses).post(handlers::create_bootcamp_course),
        )
        .route("/bootcamps/{id}/reviews", get(handlers::list_bootcamp_reviews))
        .route("/courses", get(handlers::list_courses).post(handlers::create_course))
        .route(
            "/courses/{id}",
            get(handlers::get_course).put(handlers::update_course).delete(handlers::delete_course),
        )
        .route("/reviews", get(handlers::list_reviews))
        .route("/reviews/{id}", get(handlers::get_review));

    Router::new()
        .route("/", get(handlers::hello))
        .nest(API_PREFIX, api)
        .with_state(state)
}
