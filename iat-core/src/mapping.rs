use crate::Atom;

/// Category label such as `Self` or `Science`.
pub type Label = Atom;
/// Key symbol as reported by the input layer, e.g. `e` or `escape`.
pub type Key = Atom;

/// Insertion-ordered mapping from category label to response key.
///
/// Order matters: inverting a mapping keeps the label order and reverses the
/// key column, so `{a: e, b: i}` becomes `{a: i, b: e}`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ResponseMapping {
    entries: Vec<(Label, Key)>,
}

impl ResponseMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pairs labels with keys position by position; surplus on either side is ignored.
    pub fn from_pairs<L, K>(labels: &[L], keys: &[K]) -> Self
    where
        L: AsRef<str>,
        K: AsRef<str>,
    {
        let mut mapping = Self::new();
        for (label, key) in labels.iter().zip(keys) {
            mapping.insert(Label::from(label.as_ref()), Key::from(key.as_ref()));
        }
        mapping
    }

    /// Inserts or overwrites in place; a new label goes to the end.
    pub fn insert(&mut self, label: Label, key: Key) {
        match self.entries.iter_mut().find(|(l, _)| *l == label) {
            Some(entry) => entry.1 = key,
            None => self.entries.push((label, key)),
        }
    }

    pub fn get(&self, label: &str) -> Option<&Key> {
        self.entries
            .iter()
            .find(|(l, _)| &**l == label)
            .map(|(_, k)| k)
    }

    /// Same labels in the same order, key column reversed.
    pub fn inverted(&self) -> Self {
        let keys = self.entries.iter().rev().map(|(_, k)| k.clone());
        Self {
            entries: self
                .entries
                .iter()
                .map(|(l, _)| l.clone())
                .zip(keys)
                .collect(),
        }
    }

    /// Entries of `self` followed by those of `other`; `other` wins on a shared label.
    pub fn union(&self, other: &Self) -> Self {
        let mut merged = self.clone();
        for (label, key) in &other.entries {
            merged.insert(label.clone(), key.clone());
        }
        merged
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.entries.iter().map(|(l, _)| l)
    }

    /// Distinct keys in order of first appearance.
    pub fn keys(&self) -> Vec<Key> {
        let mut keys: Vec<Key> = Vec::with_capacity(2);
        for (_, key) in &self.entries {
            if !keys.contains(key) {
                keys.push(key.clone());
            }
        }
        keys
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Label, &Key)> {
        self.entries.iter().map(|(l, k)| (l, k))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
