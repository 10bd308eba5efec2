use ahash::AHashSet;

/// Membership set over record identifiers (bookmark hashes, repository
/// names) that are already materialised somewhere in the vault.
#[derive(Debug, Default, Clone)]
pub struct DeduplicatingSet {
    ids: AHashSet<String>,
}

impl DeduplicatingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    /// Returns `false` if the identifier was already present.
    pub fn add(&mut self, id: impl Into<String>) -> bool {
        self.ids.insert(id.into())
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for DeduplicatingSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut set = DeduplicatingSet::new();
        for id in iter {
            set.add(id);
        }
        set
    }
}
