//! HTTP REST API interfaces
//!
//! - `middleware`: Bearer-JWT authentication middleware and the owner check
//! - `modules`: Request handlers, one module per resource
//! - `router`: API router with Swagger documentation

pub mod common;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::create_api_router;
