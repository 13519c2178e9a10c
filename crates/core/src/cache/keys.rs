use uuid::Uuid;

/// Returns the cache key for a single post, keyed by its business id.
pub fn post_key(post_id: Uuid) -> String {
    format!("post:{}", post_id)
}
