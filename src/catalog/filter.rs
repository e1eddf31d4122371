//! Resource filters and search queries.

use super::model::Resource;

/// Value that disables a filter key.
const ANY: &str = "all";

/// Listing and search filters.
///
/// Each key is either unconstrained (`None`) or an exact value the resource
/// must have. `tags` checks membership in the resource's tag list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceFilter {
    pub difficulty: Option<String>,
    pub language: Option<String>,
    pub subcategory: Option<String>,
    pub tags: Option<String>,
}

impl ResourceFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a filter from loose key/value pairs.
    ///
    /// Unrecognized keys are ignored; `"all"` and `""` leave a key
    /// unconstrained.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = Self::default();
        for (key, value) in pairs {
            let value = constraint(value.as_ref());
            match key.as_ref() {
                "difficulty" => filter.difficulty = value,
                "language" => filter.language = value,
                "subcategory" => filter.subcategory = value,
                "tags" | "tag" => filter.tags = value,
                _ => {}
            }
        }
        filter
    }

    pub fn difficulty(mut self, value: &str) -> Self {
        self.difficulty = constraint(value);
        self
    }

    pub fn language(mut self, value: &str) -> Self {
        self.language = constraint(value);
        self
    }

    pub fn subcategory(mut self, value: &str) -> Self {
        self.subcategory = constraint(value);
        self
    }

    pub fn tag(mut self, value: &str) -> Self {
        self.tags = constraint(value);
        self
    }

    pub fn matches(&self, resource: &Resource) -> bool {
        if let Some(difficulty) = &self.difficulty
            && resource.difficulty != *difficulty
        {
            return false;
        }
        if let Some(language) = &self.language
            && resource.language != *language
        {
            return false;
        }
        if let Some(subcategory) = &self.subcategory
            && resource.subcategory.as_deref() != Some(subcategory.as_str())
        {
            return false;
        }
        if let Some(tag) = &self.tags
            && !resource.has_tag(tag)
        {
            return false;
        }
        true
    }
}

fn constraint(value: &str) -> Option<String> {
    (!value.is_empty() && value != ANY).then(|| value.to_string())
}

/// Whitespace-tokenized, lower-cased search query with AND semantics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    terms: Vec<String>,
}

impl SearchQuery {
    pub fn new(query: &str) -> Self {
        let terms = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        Self { terms }
    }

    pub fn terms(&self) -> &[String] {
        &self.terms
    }

    /// Every term must occur as a substring of the searchable text.
    pub fn matches(&self, resource: &Resource) -> bool {
        let text = resource.searchable_text();
        self.terms.iter().all(|term| text.contains(term.as_str()))
    }
}
