//! Catalog records as they appear in the JSON datasets.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single learning resource from a category dataset.
///
/// Unknown JSON fields are kept in `extra` so a resource serializes back
/// to the shape it was loaded from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub difficulty: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub rating: f64,
    #[serde(default)]
    pub featured: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Resource {
    /// Lower-cased text the search matches against.
    pub fn searchable_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.title,
            self.description,
            self.tags.join(" "),
            self.author
        )
        .to_lowercase()
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A curated learning path aimed at one or more audiences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningPath {
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub target_audience: Vec<String>,
    #[serde(default)]
    pub duration: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LearningPath {
    pub fn targets(&self, audience: &str) -> bool {
        self.target_audience.iter().any(|a| a == audience)
    }

    /// Recommendation score for `audience`.
    ///
    /// 10 points for an audience match, plus one point per month under ten
    /// when the duration is expressed in months.
    pub fn score(&self, audience: &str) -> i64 {
        let mut score = 0;
        if self.targets(audience) {
            score += 10;
        }
        if let Some(months) = parse_months(&self.duration) {
            score += (10 - i64::from(months)).max(0);
        }
        score
    }
}

/// A stored learner profile from the `user_profiles` dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub user_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Parse a duration like `"3月"`, `"6 months"` or `"3-6月"` into months.
///
/// Takes the leading integer; the remainder must name the month unit.
pub fn parse_months(duration: &str) -> Option<u32> {
    let duration = duration.trim();
    let digits_end = duration
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(duration.len());
    if digits_end == 0 {
        return None;
    }

    let (number, unit) = duration.split_at(digits_end);
    let unit = unit.trim_start().to_lowercase();
    let is_months = unit.contains('月') || unit.starts_with("month");
    if !is_months {
        return None;
    }
    number.parse().ok()
}
