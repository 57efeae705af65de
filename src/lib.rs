//! Servform - Service Request Form Library
//!
//! The interaction layer of a service-request page: a multi-step form
//! wizard with client-side validation, a signature pad, a file upload
//! preview and the page's smaller helpers. The same application layer is
//! driven by a terminal host and, with the `web` feature, by the browser.

pub mod domain;
pub mod application;
pub mod infrastructure;
#[cfg(not(target_arch = "wasm32"))]
pub mod presentation;
#[cfg(feature = "web")]
pub mod web;

pub use domain::*;
pub use application::*;
