//! # plant-tracker-api
//!
//! Shared wire types for the plant-tracker service.
//! This crate has no server dependencies so it can be reused by a WASM
//! frontend or a test client.
//!
//! ## Contents
//!
//! - Request bodies (`PlantRequest`, `OAuthCallbackQuery`)
//! - Flash messages carried in the session cookie (`Flash`, `FlashKind`)
//! - Error response format (`ErrorResponse`)
//!
//! ## Example
//!
//! ```rust
//! use plant_tracker_api::PlantRequest;
//!
//! let request = PlantRequest {
//!     id: None,
//!     plant_type: "fern".to_string(),
//!     description: "north window".to_string(),
//! };
//! assert!(request.reference().is_none());
//! ```

pub mod error;
pub mod requests;
pub mod responses;

// Re-exports for convenient access
pub use error::ErrorResponse;
pub use requests::*;
pub use responses::*;
