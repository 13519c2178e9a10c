//! Application services orchestrating cached repositories.

mod post;

pub use post::PostService;
