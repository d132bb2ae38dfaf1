use indexmap::IndexMap;
use serde::Serialize;

pub const UNKNOWN_LABEL: &str = "unknown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassificationResult {
    pub label: String,
    pub pixel_count: u32,
    /// Matching pixels per window, in table order.
    pub counts: IndexMap<String, u32>,
}

impl ClassificationResult {
    /// Picks the window with the strictly greatest count. Earlier entries win
    /// ties, and an all-zero tally yields the unknown label.
    pub fn from_counts(counts: IndexMap<String, u32>) -> Self {
        let mut best: Option<(&String, u32)> = None;
        for (name, &count) in &counts {
            if count > best.map_or(0, |(_, c)| c) {
                best = Some((name, count));
            }
        }

        let (label, pixel_count) = match best {
            Some((name, count)) => (name.clone(), count),
            None => (UNKNOWN_LABEL.to_string(), 0),
        };

        Self {
            label,
            pixel_count,
            counts,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.label == UNKNOWN_LABEL
    }
}
