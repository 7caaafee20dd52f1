use serde::{Deserialize, Serialize};

/// Ranking strategy. Wire values match the public API (`sort=sumup|created`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortMode {
    /// Relevance ranking via the engine's scoring function.
    #[serde(rename = "sumup")]
    Relevance,
    /// Ranking by topic creation timestamp.
    #[serde(rename = "created")]
    Recency,
}

impl SortMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "sumup" => Some(SortMode::Relevance),
            "created" => Some(SortMode::Recency),
            _ => None,
        }
    }
}

/// Sort direction. Wire values are numeric (`order=0|1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Descending,
    Ascending,
}

impl SortOrder {
    pub fn parse(n: i64) -> Option<Self> {
        match n {
            0 => Some(SortOrder::Descending),
            1 => Some(SortOrder::Ascending),
            _ => None,
        }
    }

    /// Value used in engine sort clauses.
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Descending => "desc",
            SortOrder::Ascending => "asc",
        }
    }
}

/// How analyzed keyword terms combine in full-text match clauses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchOperator {
    /// Any analyzed term may match.
    Or,
    /// All analyzed terms must be present.
    And,
}

impl MatchOperator {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "or" => Some(MatchOperator::Or),
            "and" => Some(MatchOperator::And),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchOperator::Or => "or",
            MatchOperator::And => "and",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_values_round_trip() {
        assert_eq!(SortMode::parse("sumup"), Some(SortMode::Relevance));
        assert_eq!(SortMode::parse("created"), Some(SortMode::Recency));
        assert_eq!(SortMode::parse("relevance"), None);

        assert_eq!(SortOrder::parse(0), Some(SortOrder::Descending));
        assert_eq!(SortOrder::parse(1), Some(SortOrder::Ascending));
        assert_eq!(SortOrder::parse(2), None);
        assert_eq!(SortOrder::Ascending.as_str(), "asc");

        assert_eq!(MatchOperator::parse("and"), Some(MatchOperator::And));
        assert_eq!(MatchOperator::parse("xor"), None);
    }
}
