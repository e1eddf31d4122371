//! Fragment history (`#route` entries) with back/forward.

/// Session history of location fragments, without the leading `#`.
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<String>,
    index: usize,
}

impl History {
    /// Start with the given fragment (e.g. from the initial URL).
    pub fn new(initial: impl Into<String>) -> Self {
        Self {
            entries: vec![normalize(&initial.into()).to_string()],
            index: 0,
        }
    }

    pub fn fragment(&self) -> &str {
        &self.entries[self.index]
    }

    /// Push a fragment, dropping any forward entries.
    pub fn push(&mut self, fragment: &str) {
        self.entries.truncate(self.index + 1);
        self.entries.push(normalize(fragment).to_string());
        self.index += 1;
    }

    /// Move one entry back. Returns false at the first entry.
    pub fn back(&mut self) -> bool {
        if self.index == 0 {
            return false;
        }
        self.index -= 1;
        true
    }

    /// Move one entry forward. Returns false at the last entry.
    pub fn forward(&mut self) -> bool {
        if self.index + 1 >= self.entries.len() {
            return false;
        }
        self.index += 1;
        true
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new("")
    }
}

fn normalize(fragment: &str) -> &str {
    fragment.strip_prefix('#').unwrap_or(fragment)
}

/// Route id addressed by a fragment; empty means `home`.
pub fn route_from_fragment<'a>(fragment: &'a str, home: &'a str) -> &'a str {
    match normalize(fragment) {
        "" => home,
        route => route,
    }
}
