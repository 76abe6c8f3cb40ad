//! The coverage table: one record per instrumented condition.

/// A single instrumented condition.
///
/// `start` is a printable `"<path>:<line>:<col>"` location pointing at the
/// original, pre-rewrite source; `text` is the condition's normalized
/// source rendering. The condition's index is its position in the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    pub start: String,
    pub text: String,
}

/// Ordered sequence of conditions, indexed from 0 in the order the replace
/// pass emits cover wrappers.
#[derive(Debug, Default)]
pub struct CoverageTable {
    conds: Vec<Condition>,
}

impl CoverageTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a condition and return its index.
    pub fn add(&mut self, start: String, text: String) -> usize {
        self.conds.push(Condition { start, text });
        self.conds.len() - 1
    }

    pub fn len(&self) -> usize {
        self.conds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conds.is_empty()
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn indices_are_dense_and_ordered() {
        let mut table = CoverageTable::new();
        assert_eq!(table.add("a.go:1:1".into(), "x > 0".into()), 0);
        assert_eq!(table.add("a.go:2:1".into(), "y > 0".into()), 1);
        assert_eq!(table.len(), 2);
        assert_eq!(table.conditions()[1].text, "y > 0");
    }
}
