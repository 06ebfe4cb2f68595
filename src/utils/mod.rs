mod base_url;
mod non_empty_string;

pub use base_url::*;
pub use non_empty_string::*;
