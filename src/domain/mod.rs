pub mod models;
pub mod services;
pub mod signature;
pub mod errors;

pub use models::*;
pub use services::*;
pub use signature::*;
pub use errors::*;
