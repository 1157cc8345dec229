use std::collections::HashSet;

use tracing::debug;

use crate::model::action::{ActionCategory, KeywordTable};

/// Classifies free-text player input into a coarse action category and keeps
/// the set of distinct non-general actions ever seen (analytics only).
#[derive(Debug)]
pub struct ActionClassifier {
    table: KeywordTable,
    seen: HashSet<ActionCategory>,
}

impl ActionClassifier {
    pub fn new(table: KeywordTable) -> Self {
        Self {
            table,
            seen: HashSet::new(),
        }
    }

    pub fn classify(&mut self, input: &str) -> ActionCategory {
        let category = self.table.classify(input);
        if category != ActionCategory::General {
            self.seen.insert(category);
        }
        debug!(action = category.as_str(), "classified player input");
        category
    }

    pub fn seen_actions(&self) -> &HashSet<ActionCategory> {
        &self.seen
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracks_distinct_actions_but_not_general() {
        let mut classifier = ActionClassifier::new(KeywordTable::default());
        classifier.classify("我想购买一把剑");
        classifier.classify("再买一把匕首");
        classifier.classify("随便逛逛");
        classifier.classify("探索城外的废墟");

        let seen = classifier.seen_actions();
        assert_eq!(seen.len(), 2);
        assert!(seen.contains(&ActionCategory::Purchase));
        assert!(seen.contains(&ActionCategory::Explore));
    }
}
