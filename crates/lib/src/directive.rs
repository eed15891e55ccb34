//! Structured view of directive-bearing map keys.
//!
//! Authors steer resolution by gluing tokens onto keys (see
//! [`crate::constants`]). [`KeyDirectives::parse`] splits a raw key once into
//! its base name and the set of directives it carries, so the resolver and
//! the cleaner never scan key strings themselves.
//!
//! Directives are detected by containment, not only as suffixes: a key that
//! happens to contain `@if:` is a presence test wherever the token appears.

use std::sync::LazyLock;

use regex::Regex;

use crate::constants::{
    DELETE_PREFIX, GROUP_PREFIX, PRESENCE_TEST_MARKER, TEMPLATE_DEFINITION_MARKER,
    TEMPLATE_USE_MARKER,
};

static DISAMBIGUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"##[A-Za-z0-9_\-]*").expect("invalid disambiguation pattern"));

/// A map key split into base name and directives.
///
/// ```
/// # use blueprint::directive::KeyDirectives;
/// let key = KeyDirectives::parse("web##2@use:service@if:${Debug}");
/// assert_eq!(key.base_name, "web");
/// assert!(key.disambiguated);
/// assert_eq!(key.template_use.as_deref(), Some("service"));
/// assert_eq!(key.presence_test.as_deref(), Some("${Debug}"));
/// assert_eq!(key.without_presence_test(), "web@use:service");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyDirectives {
    /// The key as written, disambiguation marker included
    pub raw: String,
    /// The key with disambiguation markers removed from its name part
    pub key: String,
    /// Text before the first directive token
    pub base_name: String,
    /// Key starts with the delete prefix
    pub delete: bool,
    /// Key carried a disambiguation marker
    pub disambiguated: bool,
    /// Key defines a template
    pub template_definition: bool,
    /// Expression following the presence-test marker
    pub presence_test: Option<String>,
    /// Template name following the template-use marker
    pub template_use: Option<String>,
}

impl KeyDirectives {
    pub fn parse(raw: &str) -> Self {
        let delete = raw.starts_with(DELETE_PREFIX);
        // Presence-test expressions are left as written
        let name_end = raw.find(PRESENCE_TEST_MARKER).unwrap_or(raw.len());
        let (name, test) = raw.split_at(name_end);
        let disambiguated = DISAMBIGUATION.is_match(name);
        let key = if disambiguated {
            format!("{}{test}", DISAMBIGUATION.replace_all(name, ""))
        } else {
            raw.to_string()
        };
        let template_definition = key.contains(TEMPLATE_DEFINITION_MARKER);

        let (head, presence_test) = match key.split_once(PRESENCE_TEST_MARKER) {
            Some((head, test)) => (head, Some(test.to_string())),
            None => (key.as_str(), None),
        };
        let (head, template_use) = match head.split_once(TEMPLATE_USE_MARKER) {
            Some((head, name)) => (head, Some(name.to_string())),
            None => (head, None),
        };
        let base_name = match head.find(TEMPLATE_DEFINITION_MARKER) {
            Some(pos) => &head[..pos],
            None => head,
        };

        Self {
            raw: raw.to_string(),
            base_name: base_name.to_string(),
            key,
            delete,
            disambiguated,
            template_definition,
            presence_test,
            template_use,
        }
    }

    /// The key with the presence test (and its expression) removed.
    pub fn without_presence_test(&self) -> &str {
        match self.key.find(PRESENCE_TEST_MARKER) {
            Some(pos) => &self.key[..pos],
            None => &self.key,
        }
    }

    /// Returns `true` if the key carries no directive at all.
    pub fn is_plain(&self) -> bool {
        !self.delete
            && !self.disambiguated
            && !self.template_definition
            && self.presence_test.is_none()
            && self.template_use.is_none()
    }

    /// Group name for a group key (`Group:<name>`), possibly empty.
    pub fn group_name(&self) -> Option<&str> {
        group_name(&self.base_name)
    }
}

/// Group name carried by a key, if it is a group key.
pub fn group_name(key: &str) -> Option<&str> {
    key.strip_prefix(GROUP_PREFIX)
}

/// Returns `true` if `key` defines a template.
pub fn is_template_definition(key: &str) -> bool {
    key.contains(TEMPLATE_DEFINITION_MARKER)
}

/// Template name of a whole-string template use (`"@use:name"`).
pub fn template_use_value(text: &str) -> Option<&str> {
    text.strip_prefix(TEMPLATE_USE_MARKER)
}
