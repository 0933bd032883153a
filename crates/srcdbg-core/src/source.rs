#![forbid(unsafe_code)]

//! Registry of known sources.
//!
//! A source must be registered before a tab can be opened for it; the
//! registry is where the display URL of each [`SourceId`] lives.

use ahash::AHashMap;

use crate::location::SourceId;

/// A source file known to the debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    pub id: SourceId,
    pub url: String,
}

impl Source {
    #[must_use]
    pub fn new(id: impl Into<SourceId>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
        }
    }
}

/// Sources acknowledged by the source service, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SourceRegistry {
    sources: AHashMap<SourceId, Source>,
}

impl SourceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a source. Returns the previous entry, if any.
    pub fn insert(&mut self, source: Source) -> Option<Source> {
        self.sources.insert(source.id.clone(), source)
    }

    #[must_use]
    pub fn get(&self, id: &SourceId) -> Option<&Source> {
        self.sources.get(id)
    }

    #[must_use]
    pub fn url_of(&self, id: &SourceId) -> Option<&str> {
        self.sources.get(id).map(|source| source.url.as_str())
    }

    #[must_use]
    pub fn contains(&self, id: &SourceId) -> bool {
        self.sources.contains_key(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.sources.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_lookup() {
        let mut registry = SourceRegistry::new();
        assert!(registry.is_empty());
        assert!(
            registry
                .insert(Source::new("foo.js", "http://localhost:8000/static/foo.js"))
                .is_none()
        );
        let id = SourceId::new("foo.js");
        assert!(registry.contains(&id));
        assert_eq!(
            registry.url_of(&id),
            Some("http://localhost:8000/static/foo.js")
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn reinsert_replaces_url() {
        let mut registry = SourceRegistry::new();
        registry.insert(Source::new("foo.js", "a"));
        let previous = registry.insert(Source::new("foo.js", "b"));
        assert_eq!(previous.map(|s| s.url), Some("a".to_string()));
        assert_eq!(registry.url_of(&SourceId::new("foo.js")), Some("b"));
        assert_eq!(registry.len(), 1);
    }
}
