use serde::Serialize;

// Substrings that identify polymorphic relationship scripts.
// The later entries all contain the first; the list is kept verbatim so edits stay explicit.
pub const POLYMORPHIC_KEYWORDS: [&str; 4] = [
    "polymorphic_validations",
    "item_polymorphic_validations",
    "booking_polymorphic_validations",
    "location_polymorphic_validations",
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords.into_iter().map(Into::into).collect(),
        }
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    /// True when `basename` contains any keyword as a literal substring.
    pub fn is_polymorphic(&self, basename: &str) -> bool {
        self.keywords
            .iter()
            .any(|keyword| basename.contains(keyword.as_str()))
    }
}

impl Default for KeywordSet {
    fn default() -> Self {
        Self::new(POLYMORPHIC_KEYWORDS)
    }
}
