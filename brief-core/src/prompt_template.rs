use crate::{BriefError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Matches template placeholders like {company} or {research?}.
/// Matches {+[^{}]*}+ so doubled or nested braces are captured as one token.
static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();

fn get_placeholder_regex() -> &'static Regex {
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(r"\{+[^{}]*\}+").expect("Invalid regex pattern"))
}

/// Must start with a letter or underscore, followed by letters, digits, or underscores.
fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

fn replace_match(vars: &HashMap<&str, &str>, match_str: &str) -> Result<String> {
    let var_name = match_str.trim_matches(|c| c == '{' || c == '}').trim();

    let (var_name, optional) = match var_name.strip_suffix('?') {
        Some(name) => (name, true),
        None => (var_name, false),
    };

    if !is_identifier(var_name) {
        // Literal braces, e.g. the JSON skeleton inside a prompt.
        return Ok(match_str.to_string());
    }

    match vars.get(var_name) {
        Some(value) => Ok((*value).to_string()),
        None if optional => Ok(String::new()),
        None => Err(BriefError::Template(format!("prompt variable '{var_name}' not provided"))),
    }
}

/// Renders a prompt template.
///
/// Supports the following placeholder syntax:
/// - `{name}` - required variable (errors if missing)
/// - `{name?}` - optional variable (empty string if missing)
///
/// Any brace group whose content is not an identifier is copied verbatim, so a
/// prompt can embed a JSON skeleton without escaping.
///
/// # Examples
///
/// ```
/// use std::collections::HashMap;
/// use brief_core::render_prompt;
///
/// let vars = HashMap::from([("company", "Contoso")]);
/// let prompt = render_prompt("Audit {company}. Reply as {\"title\": \"...\"}", &vars).unwrap();
/// assert_eq!(prompt, "Audit Contoso. Reply as {\"title\": \"...\"}");
/// ```
pub fn render_prompt(template: &str, vars: &HashMap<&str, &str>) -> Result<String> {
    let regex = get_placeholder_regex();
    let mut result = String::with_capacity(template.len());
    let mut last_end = 0;

    for found in regex.find_iter(template) {
        let range = found.range();
        result.push_str(&template[last_end..range.start]);
        result.push_str(&replace_match(vars, found.as_str())?);
        last_end = range.end;
    }

    result.push_str(&template[last_end..]);
    Ok(result)
}
