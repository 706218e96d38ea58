use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

/// Matches `{{key}}`, tolerating spaces inside the braces.
pub(crate) fn placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX
        .get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("Invalid regex pattern"))
}

/// Values substituted for `{{key}}` placeholders in a Word template.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateFields {
    values: BTreeMap<String, String>,
}

impl TemplateFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// The key when `text` is exactly one placeholder, ignoring surrounding
    /// whitespace.
    pub(crate) fn sole_placeholder(text: &str) -> Option<&str> {
        let captures = placeholder_regex().captures(text.trim())?;
        let whole = captures.get(0)?;
        (whole.start() == 0 && whole.end() == text.trim().len())
            .then(|| captures.get(1).map(|m| m.as_str()))
            .flatten()
    }

    /// Replaces every known placeholder in `text`. Returns the new text and
    /// the keys that had no value.
    pub(crate) fn substitute(&self, text: &str) -> (String, Vec<String>) {
        let mut unknown = Vec::new();
        let replaced = placeholder_regex().replace_all(text, |caps: &regex::Captures<'_>| {
            match self.get(&caps[1]) {
                Some(value) => value.to_string(),
                None => {
                    unknown.push(caps[1].to_string());
                    caps[0].to_string()
                }
            }
        });
        (replaced.into_owned(), unknown)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TemplateFields {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut fields = Self::new();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}
