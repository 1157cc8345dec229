use serde::{Deserialize, Serialize};

/// Coarse classification of what the player just tried to do. Sent verbatim
/// to the event generator as `playerAction`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionCategory {
    Purchase,
    Sell,
    Recruit,
    Invest,
    Join,
    Accept,
    Choose,
    Visit,
    Explore,
    General,
}

impl ActionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionCategory::Purchase => "purchase",
            ActionCategory::Sell => "sell",
            ActionCategory::Recruit => "recruit",
            ActionCategory::Invest => "invest",
            ActionCategory::Join => "join",
            ActionCategory::Accept => "accept",
            ActionCategory::Choose => "choose",
            ActionCategory::Visit => "visit",
            ActionCategory::Explore => "explore",
            ActionCategory::General => "general",
        }
    }
}

/// Ordered keyword -> category table. Order matters: classification takes the
/// first entry whose keyword occurs in the input. Kept as data so the table
/// can be localised or swapped without touching code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordTable {
    pub entries: Vec<KeywordEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeywordEntry {
    pub keyword: String,
    pub category: ActionCategory,
}

impl Default for KeywordTable {
    fn default() -> Self {
        use ActionCategory::*;
        let entries = [
            ("购买", Purchase),
            ("买", Purchase),
            ("卖", Sell),
            ("出售", Sell),
            ("招募", Recruit),
            ("雇佣", Recruit),
            ("投资", Invest),
            ("加入", Join),
            ("接受", Accept),
            ("同意", Accept),
            ("选择", Choose),
            ("拜访", Visit),
            ("探索", Explore),
        ]
        .into_iter()
        .map(|(keyword, category)| KeywordEntry {
            keyword: keyword.to_string(),
            category,
        })
        .collect();

        Self { entries }
    }
}

impl KeywordTable {
    pub fn classify(&self, input: &str) -> ActionCategory {
        self.entries
            .iter()
            .find(|entry| input.contains(entry.keyword.as_str()))
            .map(|entry| entry.category)
            .unwrap_or(ActionCategory::General)
    }
}
