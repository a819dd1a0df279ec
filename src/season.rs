use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Season label as it appears in the league config, e.g. `"S5"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeasonId(String);

impl SeasonId {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Digits embedded in the label (`"S12"` -> 12).
    pub fn number(&self) -> Option<u32> {
        let digits: String = self
            .0
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();
        digits.parse().ok()
    }
}

impl Ord for SeasonId {
    fn cmp(&self, other: &Self) -> Ordering {
        // Unnumbered labels sort after numbered ones.
        match (self.number(), other.number()) {
            (Some(a), Some(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for SeasonId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for SeasonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SeasonId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

#[cfg(test)]
mod tests {
    use super::SeasonId;

    #[test]
    fn numeric_order_beats_lexical_order() {
        let mut seasons = vec![SeasonId::new("S10"), SeasonId::new("S2"), SeasonId::new("S1")];
        seasons.sort();
        let labels: Vec<&str> = seasons.iter().map(|s| s.as_str()).collect();
        assert_eq!(labels, vec!["S1", "S2", "S10"]);
    }

    #[test]
    fn number_is_extracted_from_label() {
        assert_eq!(SeasonId::new(" S7 ").number(), Some(7));
        assert_eq!(SeasonId::new("Pilot").number(), None);
    }
}
