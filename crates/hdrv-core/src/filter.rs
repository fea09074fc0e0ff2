//! Comma-separated include/exclude text filters.

/// Case-insensitive substring filter.
///
/// Terms are separated by commas and trimmed. A term starting with `-`
/// excludes matching text; any other term includes it. Text passes if it
/// matches no exclude term and either matches an include term or the
/// filter has no include terms. An empty filter passes everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextFilter {
    source: String,
    terms: Vec<Term>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Term {
    needle: String,
    exclude: bool,
}

impl TextFilter {
    /// Parses `pattern`.
    pub fn new(pattern: &str) -> Self {
        let terms = pattern
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty() && *t != "-")
            .map(|t| match t.strip_prefix('-') {
                Some(rest) => Term { needle: rest.to_lowercase(), exclude: true },
                None => Term { needle: t.to_lowercase(), exclude: false },
            })
            .collect();
        Self { source: pattern.to_string(), terms }
    }

    /// The pattern this filter was built from.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// True if the filter has no terms.
    pub fn is_active(&self) -> bool {
        !self.terms.is_empty()
    }

    /// Tests `text` against the filter.
    pub fn pass(&self, text: &str) -> bool {
        if self.terms.is_empty() {
            return true;
        }
        let text = text.to_lowercase();
        let mut has_include = false;
        for term in &self.terms {
            let hit = text.contains(&term.needle);
            if term.exclude {
                if hit {
                    return false;
                }
            } else {
                if hit {
                    return true;
                }
                has_include = true;
            }
        }
        !has_include
    }
}

impl From<&str> for TextFilter {
    fn from(pattern: &str) -> Self {
        Self::new(pattern)
    }
}
