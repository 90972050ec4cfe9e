use crate::shared::hash::stable_hash_bytes;
use std::fmt;

/// One component of an entity identity. `Any` leaves the position
/// unconstrained when the entity is turned into a lookup path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Value(Vec<u8>),
    Any,
}

impl Entry {
    pub fn value(bytes: impl AsRef<[u8]>) -> Self {
        Entry::Value(bytes.as_ref().to_vec())
    }

    pub fn is_any(&self) -> bool {
        matches!(self, Entry::Any)
    }

    /// Raw bytes of the entry; `Any` hashes as the empty slice.
    pub fn bytes(&self) -> &[u8] {
        match self {
            Entry::Value(v) => v,
            Entry::Any => &[],
        }
    }
}

/// The ordered tuple of entries identifying a series.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Entity(Vec<Entry>);

impl Entity {
    pub fn new(entries: Vec<Entry>) -> Self {
        Self(entries)
    }

    pub fn entries(&self) -> &[Entry] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when no position is left unconstrained.
    pub fn is_full(&self) -> bool {
        self.0.iter().all(|e| !e.is_any())
    }

    /// The series key: 8 hash bytes per entry, concatenated. Two entities
    /// are the same series iff their keys are byte-equal.
    pub fn hash_key(&self) -> Vec<u8> {
        let mut key = Vec::with_capacity(self.0.len() * 8);
        for entry in &self.0 {
            key.extend_from_slice(&stable_hash_bytes(entry.bytes()));
        }
        key
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| match e {
                Entry::Any => "*".to_string(),
                Entry::Value(v) => String::from_utf8_lossy(v).into_owned(),
            })
            .collect();
        write!(f, "[{}]", parts.join(","))
    }
}

impl From<Vec<&str>> for Entity {
    fn from(values: Vec<&str>) -> Self {
        Entity::new(values.into_iter().map(Entry::value).collect())
    }
}
