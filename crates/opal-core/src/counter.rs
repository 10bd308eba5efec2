use ahash::AHashMap;

#[derive(Debug, Clone)]
struct Tally {
    value: String,
    count: usize,
}

/// Counts occurrences per key, remembering the first value seen for each key.
/// Only "more than once" matters, so later values are not kept.
#[derive(Debug, Default)]
pub struct FrequencyCounter {
    data: AHashMap<String, Tally>,
}

/// A key seen more than once, with its representative value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Duplicate {
    pub key: String,
    pub value: String,
    pub count: usize,
}

impl FrequencyCounter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.data
            .entry(key.into())
            .and_modify(|tally| tally.count += 1)
            .or_insert_with(|| Tally {
                value: value.into(),
                count: 1,
            });
    }

    pub fn count(&self, key: &str) -> usize {
        self.data.get(key).map(|tally| tally.count).unwrap_or(0)
    }

    /// Representative values of every key counted more than once, sorted.
    pub fn duplicates(&self) -> Vec<String> {
        let mut values: Vec<String> = self
            .data
            .values()
            .filter(|tally| tally.count > 1)
            .map(|tally| tally.value.clone())
            .collect();
        values.sort();
        values
    }

    /// Same selection as [`duplicates`](Self::duplicates) with keys and
    /// counts attached, sorted by key.
    pub fn duplicate_entries(&self) -> Vec<Duplicate> {
        let mut entries: Vec<Duplicate> = self
            .data
            .iter()
            .filter(|(_, tally)| tally.count > 1)
            .map(|(key, tally)| Duplicate {
                key: key.clone(),
                value: tally.value.clone(),
                count: tally.count,
            })
            .collect();
        entries.sort_by(|a, b| a.key.cmp(&b.key));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_only_reports_repeated_keys() {
        let mut counter = FrequencyCounter::new();
        counter.add("h1", "/vault/a.md");
        counter.add("h2", "/vault/b.md");
        counter.add("h1", "/vault/c.md");
        counter.add("h3", "/vault/d.md");
        counter.add("h3", "/vault/e.md");
        counter.add("h3", "/vault/f.md");

        assert_eq!(
            counter.duplicates(),
            vec!["/vault/a.md".to_string(), "/vault/d.md".to_string()]
        );
        assert_eq!(counter.count("h3"), 3);
        assert_eq!(counter.count("h2"), 1);
        assert_eq!(counter.count("missing"), 0);
    }

    #[test]
    fn test_first_value_is_representative() {
        let mut counter = FrequencyCounter::new();
        counter.add("k", "first");
        counter.add("k", "second");

        let entries = counter.duplicate_entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].value, "first");
        assert_eq!(entries[0].count, 2);
    }

    #[test]
    fn test_no_duplicates() {
        let mut counter = FrequencyCounter::new();
        counter.add("a", "1");
        counter.add("b", "2");
        assert!(counter.duplicates().is_empty());
    }
}
