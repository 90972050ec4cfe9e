use crate::engine::series::entity::{Entity, Entry};
use crate::shared::hash::stable_hash_bytes;

const ONES: [u8; 8] = [0xff; 8];
const ZEROS: [u8; 8] = [0; 8];

/// Lookup template derived from an entity. `template` holds the per-entry
/// hash (zeros at ANY positions), `mask` is all-ones per concrete entry,
/// and `prefix` is the longest all-concrete leading slice of the template.
/// A key matches iff `(key & mask) == template`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Path {
    prefix: Vec<u8>,
    mask: Vec<u8>,
    template: Vec<u8>,
    is_full: bool,
}

impl Path {
    pub fn new(entity: &Entity) -> Self {
        let mut mask = Vec::with_capacity(entity.len() * 8);
        let mut template = Vec::with_capacity(entity.len() * 8);
        let mut offset = 0;
        let mut encountered_any = false;
        for entry in entity.entries() {
            match entry {
                Entry::Any => {
                    encountered_any = true;
                    mask.extend_from_slice(&ZEROS);
                    template.extend_from_slice(&ZEROS);
                }
                Entry::Value(value) => {
                    if !encountered_any {
                        offset += 8;
                    }
                    mask.extend_from_slice(&ONES);
                    template.extend_from_slice(&stable_hash_bytes(value));
                }
            }
        }
        let prefix = template[..offset].to_vec();
        Self {
            prefix,
            mask,
            template,
            is_full: !encountered_any,
        }
    }

    pub fn prefix(&self) -> &[u8] {
        &self.prefix
    }

    pub fn mask(&self) -> &[u8] {
        &self.mask
    }

    pub fn template(&self) -> &[u8] {
        &self.template
    }

    /// True when the path has no ANY position, so a single point get on
    /// `prefix` resolves it.
    pub fn is_full(&self) -> bool {
        self.is_full
    }

    /// The mask/template admission test. Keys of a different arity can
    /// share the prefix and are never a match.
    pub fn matches(&self, key: &[u8]) -> bool {
        if key.len() != self.template.len() {
            return false;
        }
        key.iter()
            .zip(self.mask.iter())
            .map(|(k, m)| k & m)
            .eq(self.template.iter().copied())
    }
}
