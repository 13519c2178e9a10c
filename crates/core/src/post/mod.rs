mod error;
mod requests;
mod types;

pub use error::PostValidationError;
pub use requests::{PostCreateRequest, PostUpdateRequest};
pub use types::{by_post_id, Post};
