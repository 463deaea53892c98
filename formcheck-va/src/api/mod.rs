//! API route handlers

pub mod analyze;
pub mod health;
pub mod posture;

pub use analyze::analyze_routes;
pub use health::health_routes;
pub use posture::posture_routes;
