//! Location vocabulary
//!
//! Ids are handed out in first-seen order of the ingestion pass, so the same
//! fuzzlogs ingested in a different order produce a different (but internally
//! consistent) numbering. Id 0 is never assigned: the encoder uses it as the
//! pad / unknown slot.

use std::collections::HashMap;

/// Integer id of a registered location tag (always ≥ 1).
pub type LocationId = u64;

/// Id reserved for padding and for tags never seen during ingestion.
pub const PAD_ID: LocationId = 0;

/// Maps location tags to stable ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationIndex {
    ids: HashMap<String, LocationId>,
    tags: Vec<String>,
}

impl LocationIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild an index whose ids are the positions of `tags` plus one.
    ///
    /// Duplicate tags keep their first id.
    pub fn from_tags<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut index = Self::new();
        for tag in tags {
            index.register(tag.into());
        }
        index
    }

    /// Return the id of `tag`, assigning the next free id if it is new.
    pub fn register(&mut self, tag: impl AsRef<str> + Into<String>) -> LocationId {
        if let Some(&id) = self.ids.get(tag.as_ref()) {
            return id;
        }
        let tag: String = tag.into();
        let id = self.tags.len() as LocationId + 1;
        self.ids.insert(tag.clone(), id);
        self.tags.push(tag);
        id
    }

    /// Id of a previously registered tag, `None` if unknown.
    pub fn get_index(&self, tag: &str) -> Option<LocationId> {
        self.ids.get(tag).copied()
    }

    /// `1 +` the number of registered tags; the embedding vocabulary size.
    pub fn watermark(&self) -> usize {
        self.tags.len() + 1
    }

    /// Number of registered tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether no tag has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Registered tags in id order (`tags()[i]` has id `i + 1`).
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}
