//! Semantic pattern library
//!
//! A closed set of named string checks ([`SemanticRule`]) backed by fixed
//! regular expressions, plus a per-validator registry of caller-defined
//! patterns ([`PatternLibrary`]) that `ruleTitle` can also refer to.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{EngineError, Result};
use crate::ordered::OrderedMap;

/// Built-in semantic rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SemanticRule {
    /// Starts with a letter, then letters, digits, `-` or `_`
    UserName,
    /// ASCII letters only
    AlphaOnly,
    /// ASCII letters and digits
    AlphaNumeric,
    /// Lowercase ASCII letters only
    LowerAlpha,
    /// Uppercase ASCII letters only
    UpperAlpha,
    /// ASCII letters and whitespace
    AlphaSpaces,
    /// Email address
    Email,
    /// At least 8 characters with a digit, a lowercase and an uppercase letter
    StrongPassword,
    /// Letters, digits, whitespace and common punctuation
    GeneralText,
    /// http(s) URL
    Url,
}

impl SemanticRule {
    /// Every built-in rule, in declaration order
    pub const ALL: [SemanticRule; 10] = [
        SemanticRule::UserName,
        SemanticRule::AlphaOnly,
        SemanticRule::AlphaNumeric,
        SemanticRule::LowerAlpha,
        SemanticRule::UpperAlpha,
        SemanticRule::AlphaSpaces,
        SemanticRule::Email,
        SemanticRule::StrongPassword,
        SemanticRule::GeneralText,
        SemanticRule::Url,
    ];

    /// Name used in schemas (`ruleTitle`)
    pub fn as_str(&self) -> &'static str {
        match self {
            SemanticRule::UserName => "userName",
            SemanticRule::AlphaOnly => "alphaOnly",
            SemanticRule::AlphaNumeric => "alphaNumeric",
            SemanticRule::LowerAlpha => "lowerAlpha",
            SemanticRule::UpperAlpha => "upperAlpha",
            SemanticRule::AlphaSpaces => "alphaSpaces",
            SemanticRule::Email => "email",
            SemanticRule::StrongPassword => "strongPassword",
            SemanticRule::GeneralText => "generalText",
            SemanticRule::Url => "url",
        }
    }

    /// Source patterns; a value passes when it matches all of them
    fn sources(&self) -> &'static [&'static str] {
        match self {
            SemanticRule::UserName => &[r"^[a-zA-Z][a-zA-Z0-9_-]+$"],
            SemanticRule::AlphaOnly => &[r"^[a-zA-Z]+$"],
            SemanticRule::AlphaNumeric => &[r"^[a-zA-Z0-9]+$"],
            SemanticRule::LowerAlpha => &[r"^[a-z]+$"],
            SemanticRule::UpperAlpha => &[r"^[A-Z]+$"],
            SemanticRule::AlphaSpaces => &[r"^[a-zA-Z\s]+$"],
            SemanticRule::Email => {
                &[r#"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)+$"#]
            }
            SemanticRule::StrongPassword => &[r"^[^\r\n]{8,}$", r"[0-9]", r"[a-z]", r"[A-Z]"],
            SemanticRule::GeneralText => &[r#"^[a-zA-Z0-9\s,.'"_)(\[\]?!&:;/-]+$"#],
            SemanticRule::Url => &[
                r"(?i)^https?://(?:www\.)?(?:[a-z0-9]+\.[a-z]{3}|\d{1,3}\.\d{1,3}\.\d{1,3}\.\d{1,3}(?::\d+)?)[/a-z0-9.]*$",
            ],
        }
    }

    /// Test a value against this rule
    pub fn matches(&self, value: &str) -> bool {
        COMPILED
            .get(self)
            .is_some_and(|regexes| regexes.iter().all(|re| re.is_match(value)))
    }

    /// Default failure message for this rule
    pub fn default_message(&self) -> &'static str {
        match self {
            SemanticRule::UserName => "Username contains invalid characters",
            SemanticRule::AlphaOnly => "Only letters are allowed",
            SemanticRule::AlphaNumeric => "Only letters and numbers are allowed",
            SemanticRule::LowerAlpha => "Only lowercase letters are allowed",
            SemanticRule::UpperAlpha => "Only uppercase letters are allowed",
            SemanticRule::AlphaSpaces => "Only letters and spaces are allowed",
            SemanticRule::Email => "Please provide a valid email address",
            SemanticRule::StrongPassword => {
                "Password must have at least 8 characters with an uppercase letter, a lowercase letter and a number"
            }
            SemanticRule::GeneralText => "This field contains invalid characters",
            SemanticRule::Url => "Please provide a valid URL",
        }
    }
}

static COMPILED: LazyLock<HashMap<SemanticRule, Vec<Regex>>> = LazyLock::new(|| {
    SemanticRule::ALL
        .iter()
        .map(|rule| {
            let regexes = rule
                .sources()
                .iter()
                .map(|src| Regex::new(src).expect("built-in semantic pattern must compile"))
                .collect();
            (*rule, regexes)
        })
        .collect()
});

impl fmt::Display for SemanticRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SemanticRule {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        SemanticRule::ALL
            .iter()
            .copied()
            .find(|rule| rule.as_str() == s)
            .ok_or_else(|| format!("Unknown semantic rule: {}", s))
    }
}

/// What a `ruleTitle` resolves to
#[derive(Debug, Clone)]
pub enum PatternMatcher {
    /// One of the built-in semantic rules
    Builtin(SemanticRule),
    /// A caller-registered pattern
    Custom { name: String, regex: Regex },
}

impl PatternMatcher {
    /// Test a value against the resolved pattern
    pub fn matches(&self, value: &str) -> bool {
        match self {
            PatternMatcher::Builtin(rule) => rule.matches(value),
            PatternMatcher::Custom { regex, .. } => regex.is_match(value),
        }
    }

    /// Name the pattern was resolved from
    pub fn name(&self) -> &str {
        match self {
            PatternMatcher::Builtin(rule) => rule.as_str(),
            PatternMatcher::Custom { name, .. } => name,
        }
    }

    /// Default failure message
    pub fn default_message(&self) -> String {
        match self {
            PatternMatcher::Builtin(rule) => rule.default_message().to_string(),
            PatternMatcher::Custom { name, .. } => {
                format!("This field does not satisfy the '{}' rule", name)
            }
        }
    }
}

/// Built-in rules plus custom patterns registered on a validator
#[derive(Debug, Clone, Default)]
pub struct PatternLibrary {
    custom: OrderedMap<String, Regex>,
}

impl PatternLibrary {
    /// Create a library with only the built-in rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom named pattern
    ///
    /// Built-in rule names cannot be redefined. Registering an existing
    /// custom name replaces its pattern.
    pub fn register(&mut self, name: &str, pattern: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(EngineError::schema_error("custom rule name must not be empty"));
        }
        if name.parse::<SemanticRule>().is_ok() {
            return Err(EngineError::schema_error(format!(
                "'{}' is a built-in rule and cannot be redefined",
                name
            )));
        }
        if pattern.is_empty() {
            return Err(EngineError::schema_error(format!(
                "custom rule '{}' has an empty pattern",
                name
            )));
        }
        let regex = compile_pattern(pattern).map_err(|e| {
            EngineError::schema_error(format!("custom rule '{}': {}", name, e))
        })?;
        self.custom.insert(name.to_string(), regex);
        Ok(())
    }

    /// Resolve a `ruleTitle` to a matcher
    pub fn resolve(&self, name: &str) -> Option<PatternMatcher> {
        if let Ok(rule) = name.parse::<SemanticRule>() {
            return Some(PatternMatcher::Builtin(rule));
        }
        self.custom.get(name).map(|regex| PatternMatcher::Custom {
            name: name.to_string(),
            regex: regex.clone(),
        })
    }

    /// Names of registered custom rules, in registration order
    pub fn custom_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.custom.iter().map(|(name, _)| name.as_str())
    }
}

/// Compile a user pattern
///
/// Accepts a plain regular expression or a `/body/flags` literal. Flags `i`,
/// `m` and `s` map to the regex options of the same name; `g`, `y` and `u`
/// are accepted and have no effect.
pub fn compile_pattern(source: &str) -> std::result::Result<Regex, String> {
    let (body, flags) = split_literal(source);

    let mut builder = RegexBuilder::new(body);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'g' | 'y' | 'u' => {}
            other => return Err(format!("unsupported regex flag '{}'", other)),
        }
    }

    builder
        .build()
        .map_err(|e| format!("invalid pattern '{}': {}", source, e))
}

fn split_literal(source: &str) -> (&str, &str) {
    if let Some(rest) = source.strip_prefix('/') {
        if let Some(end) = rest.rfind('/') {
            let flags = &rest[end + 1..];
            if flags.chars().all(|c| c.is_ascii_alphabetic()) {
                return (&rest[..end], flags);
            }
        }
    }
    (source, "")
}
