//! Key buffer — the keys of a command that is not finished yet.

use n_input::{KeyToken, format_keys};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyBuffer {
    keys: Vec<KeyToken>,
}

impl KeyBuffer {
    #[must_use]
    pub const fn new() -> Self {
        Self { keys: Vec::new() }
    }

    pub fn append(&mut self, key: KeyToken) {
        self.keys.push(key);
    }

    pub fn clear(&mut self) {
        self.keys.clear();
    }

    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> &[KeyToken] {
        &self.keys
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// The buffer with `key` appended, leaving the buffer itself alone.
    #[must_use]
    pub fn with(&self, key: KeyToken) -> Vec<KeyToken> {
        let mut candidate = Vec::with_capacity(self.keys.len() + 1);
        candidate.extend_from_slice(&self.keys);
        candidate.push(key);
        candidate
    }

    /// The pending keys in key notation (`"d2"`, `"<C-v>"`).
    #[must_use]
    pub fn notation(&self) -> String {
        format_keys(&self.keys)
    }
}
