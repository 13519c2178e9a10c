//! Document capability and query predicates.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};
use uuid::Uuid;

/// A typed document persisted in a named collection.
///
/// `id` is the sole identity of a document. It is assigned before insertion
/// and never changes afterwards, as does `created_at`. `updated_at` is
/// stamped by the repository on every successful update.
pub trait Document: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Name of the collection documents of this type are stored in.
    const COLLECTION: &'static str;

    fn id(&self) -> &str;

    fn created_at(&self) -> DateTime<Utc>;

    fn updated_at(&self) -> Option<DateTime<Utc>>;

    fn set_updated_at(&mut self, at: DateTime<Utc>);
}

/// Generates a new document id (32 lowercase hex characters).
pub fn new_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

type Matcher<T> = dyn Fn(&T) -> bool + Send + Sync;

/// Opaque boolean matcher over a document's fields.
///
/// Cloning is cheap; the underlying closure is shared.
pub struct Predicate<T> {
    matcher: Arc<Matcher<T>>,
}

impl<T: 'static> Predicate<T> {
    /// Creates a predicate from a closure.
    pub fn new<F>(matcher: F) -> Self
    where
        F: Fn(&T) -> bool + Send + Sync + 'static,
    {
        Self {
            matcher: Arc::new(matcher),
        }
    }

    /// A predicate that matches every document.
    pub fn all() -> Self {
        Self::new(|_| true)
    }

    /// Returns true if `document` satisfies this predicate.
    pub fn matches(&self, document: &T) -> bool {
        (self.matcher)(document)
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            matcher: Arc::clone(&self.matcher),
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

/// Applies an optional predicate, where `None` matches everything.
pub fn matches_optional<T: 'static>(predicate: Option<&Predicate<T>>, document: &T) -> bool {
    predicate.is_none_or(|p| p.matches(document))
}

/// Returns a copy of `document` stamped as updated at `now`.
///
/// The stamp never moves backwards: a document already carrying a later
/// `updated_at` keeps it.
pub fn stamped_for_update<T: Document>(document: &T, now: DateTime<Utc>) -> T {
    let mut stamped = document.clone();
    let at = document.updated_at().map_or(now, |previous| previous.max(now));
    stamped.set_updated_at(at);
    stamped
}
