/// Stat values the narrator reported inside a reply, e.g.
/// `💰金钱：650，⭐声望：30`. Values are absolute, not deltas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportedStats {
    pub money: Option<i64>,
    pub reputation: Option<i64>,
}

pub fn parse_reported_stats(text: &str) -> ReportedStats {
    ReportedStats {
        money: value_after(text, "金钱："),
        reputation: value_after(text, "声望："),
    }
}

fn value_after(text: &str, marker: &str) -> Option<i64> {
    let start = text.find(marker)? + marker.len();
    let digits: String = text[start..]
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_both_stats_from_a_reply() {
        let stats = parse_reported_stats("你卖出了货物。💰金钱：650，⭐声望：30");
        assert_eq!(stats.money, Some(650));
        assert_eq!(stats.reputation, Some(30));
    }

    #[test]
    fn missing_markers_yield_none() {
        let stats = parse_reported_stats("商贩朝你挥了挥手。");
        assert_eq!(stats, ReportedStats::default());
    }

    #[test]
    fn marker_without_digits_is_ignored() {
        let stats = parse_reported_stats("金钱：不详");
        assert_eq!(stats.money, None);
    }

    #[test]
    fn first_occurrence_wins() {
        let stats = parse_reported_stats("金钱：100 ……后来 金钱：900");
        assert_eq!(stats.money, Some(100));
    }
}
