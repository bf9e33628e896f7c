//! HTTP API handlers for toktune

pub mod health;
pub mod postlink;

pub use health::health_routes;
pub use postlink::post_link;
