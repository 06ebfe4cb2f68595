pub(crate) mod client;
mod error;
pub mod messages;
pub mod notifications;
pub mod token;
mod validation;

pub use client::ApiClient;
pub use error::ApiError;
pub use validation::FieldErrors;

pub type Result<T> = std::result::Result<T, ApiError>;
