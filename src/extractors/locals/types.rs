/*
 * Responsibility
 * - Request-scoped, string-keyed storage shared between middleware and handlers
 * - The token gate writes the verified token under its context key; handlers read it back
 *
 * Notes
 * - Values are type-erased; reads name the expected type and get `None` on mismatch
 */
use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use axum::http::Extensions;

#[derive(Clone, Default)]
pub struct RequestLocals {
    values: HashMap<String, Arc<dyn Any + Send + Sync>>,
}

impl fmt::Debug for RequestLocals {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestLocals")
            .field("keys", &self.values.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl RequestLocals {
    /// Locals of a request, created empty on first use.
    pub fn of(extensions: &mut Extensions) -> &mut Self {
        extensions.get_or_insert_default::<Self>()
    }

    pub fn insert<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Any + Send + Sync,
    {
        self.values.insert(key.into(), Arc::new(value));
    }

    pub fn get<T: Any>(&self, key: &str) -> Option<&T> {
        self.values.get(key).and_then(|v| v.downcast_ref::<T>())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typed_reads() {
        let mut locals = RequestLocals::default();
        locals.insert("user", "alice".to_string());

        assert_eq!(locals.get::<String>("user").map(String::as_str), Some("alice"));
        assert!(locals.get::<u64>("user").is_none());
        assert!(locals.get::<String>("other").is_none());
    }

    #[test]
    fn of_reuses_existing_locals() {
        let mut extensions = Extensions::new();
        RequestLocals::of(&mut extensions).insert("a", 1u8);
        RequestLocals::of(&mut extensions).insert("b", 2u8);

        let locals = extensions.get::<RequestLocals>().unwrap();
        assert!(locals.contains_key("a"));
        assert!(locals.contains_key("b"));
    }
}
