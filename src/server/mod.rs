//! HTTP server: extractors, handlers, routes and the builder that wires them

pub mod builder;
pub mod extractors;
pub mod handlers;
pub mod router;

pub use builder::ServerBuilder;
pub use handlers::AppState;
pub use router::build_router;
