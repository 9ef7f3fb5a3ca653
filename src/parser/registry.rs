use indexmap::IndexMap;

use crate::error::{Position, SheetError};

/// Natural key to id lookup for one entity kind, alive for a single read or write.
///
/// A miss is not an error here: the caller knows who asked and turns it into
/// a [`SheetError::Reference`] with [`Registry::reference_error`].
#[derive(Debug)]
pub struct Registry<I> {
    /// Plural entity name used in messages, e.g. `airports`
    kind: &'static str,
    /// Sheet the keys come from
    sheet: &'static str,
    entries: IndexMap<String, I>,
}

impl<I: Copy> Registry<I> {
    pub fn new(kind: &'static str, sheet: &'static str) -> Self {
        Self {
            kind,
            sheet,
            entries: IndexMap::new(),
        }
    }

    /// Add a key. A key that is already present keeps its first id,
    /// which is returned as the error.
    pub fn register(&mut self, key: &str, id: I) -> Result<(), I> {
        if let Some(existing) = self.entries.get(key) {
            return Err(*existing);
        }
        self.entries.insert(key.to_string(), id);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<I> {
        self.entries.get(key).copied()
    }

    /// Known keys in registration order
    pub fn known_keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn reference_error(
        &self,
        position: Position,
        owner: String,
        field: &'static str,
        key: &str,
    ) -> SheetError {
        SheetError::Reference {
            position,
            owner,
            field,
            key: key.to_string(),
            registry: self.kind,
            sheet: self.sheet,
            known: self.known_keys(),
        }
    }
}
