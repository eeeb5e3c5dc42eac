//! Structured answer types produced by the sectionizer.

use serde::{Deserialize, Serialize};

/// One named block of the model's answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub body: String,
}

impl Section {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

/// Ordered sections parsed from a raw completion.
///
/// Order is the order of appearance in the raw text. Titles may repeat.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredAnswer {
    pub sections: Vec<Section>,

    /// Positions in `sections` that came from a fragment with no body
    /// (title-only fallback)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub malformed: Vec<usize>,
}

impl StructuredAnswer {
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Section> {
        self.sections.iter()
    }

    /// Section titles as `(title, body)` pairs, convenient for assertions
    /// and plain rendering.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.sections
            .iter()
            .map(|s| (s.title.as_str(), s.body.as_str()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a StructuredAnswer {
    type Item = &'a Section;
    type IntoIter = std::slice::Iter<'a, Section>;

    fn into_iter(self) -> Self::IntoIter {
        self.sections.iter()
    }
}
