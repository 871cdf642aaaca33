//! Error store and report model
//!
//! A [`Report`] maps session → field → rule key → message. Every level keeps
//! insertion order, which is what makes "the most recent error" well defined
//! (see [`Report::last_message`]). A field entry exists only while at least
//! one of its rules is failing.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::ordered::OrderedMap;
use crate::schema::RuleKey;

/// Failing rules of one field, in the order they were first recorded
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldErrors {
    rules: OrderedMap<RuleKey, String>,
}

impl FieldErrors {
    /// Message recorded for a rule
    pub fn get(&self, rule: RuleKey) -> Option<&str> {
        self.rules.get(&rule).map(String::as_str)
    }

    pub fn contains(&self, rule: RuleKey) -> bool {
        self.rules.contains_key(&rule)
    }

    /// Iterate `(rule, message)` pairs in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (RuleKey, &str)> + '_ {
        self.rules.iter().map(|(rule, msg)| (*rule, msg.as_str()))
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Failing fields of one session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionErrors {
    fields: OrderedMap<String, FieldErrors>,
}

impl SessionErrors {
    /// Errors recorded for a field
    pub fn field(&self, name: &str) -> Option<&FieldErrors> {
        self.fields.get(name)
    }

    /// Iterate `(field, errors)` pairs in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &FieldErrors)> + '_ {
        self.fields.iter().map(|(name, errors)| (name.as_str(), errors))
    }

    /// Number of failing fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Structured validation report: session → field → rule → message
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Report {
    sessions: OrderedMap<String, SessionErrors>,
}

impl Report {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record (or overwrite) the message of a failing rule
    pub fn add_error(&mut self, session: &str, field: &str, rule: RuleKey, message: impl Into<String>) {
        let message = message.into();
        tracing::debug!(session, field, rule = %rule, message = %message, "validation rule failed");

        self.sessions
            .entry_or_default(session.to_string())
            .fields
            .entry_or_default(field.to_string())
            .rules
            .insert(rule, message);
    }

    /// Forget the message of a rule; a field left without failures is dropped
    ///
    /// Removing an entry that does not exist is a no-op.
    pub fn remove_error(&mut self, session: &str, field: &str, rule: RuleKey) {
        let Some(session_errors) = self.sessions.get_mut(session) else {
            return;
        };
        let Some(field_errors) = session_errors.fields.get_mut(field) else {
            return;
        };
        if field_errors.rules.remove(&rule).is_some() {
            tracing::trace!(session, field, rule = %rule, "validation rule cleared");
        }
        if field_errors.is_empty() {
            session_errors.fields.remove(field);
        }
    }

    /// Drop every error recorded for a field
    pub fn clear_field(&mut self, session: &str, field: &str) {
        if let Some(session_errors) = self.sessions.get_mut(session) {
            session_errors.fields.remove(field);
        }
    }

    /// Reset the whole report if `session` is present with no failing fields
    ///
    /// Returns whether the report was reset.
    pub fn prune(&mut self, session: &str) -> bool {
        let idle = self.sessions.get(session).is_some_and(SessionErrors::is_empty);
        if idle {
            self.sessions.clear();
        }
        idle
    }

    /// Errors of one session
    pub fn session(&self, session: &str) -> Option<&SessionErrors> {
        self.sessions.get(session)
    }

    /// Message recorded for a (session, field, rule) triple
    pub fn message(&self, session: &str, field: &str, rule: RuleKey) -> Option<&str> {
        self.session(session)?.field(field)?.get(rule)
    }

    /// Whether any field of the session is failing
    pub fn has_errors(&self, session: &str) -> bool {
        self.session(session).is_some_and(|s| !s.is_empty())
    }

    /// Last message of the last failing field of the last session
    pub fn last_message(&self) -> Option<&str> {
        self.sessions.values().rev().find_map(|session| {
            session
                .fields
                .values()
                .rev()
                .find_map(|field| field.rules.values().next_back().map(String::as_str))
        })
    }

    /// Total number of failing (field, rule) pairs across sessions
    pub fn error_count(&self) -> usize {
        self.sessions
            .values()
            .flat_map(|s| s.fields.values())
            .map(FieldErrors::len)
            .sum()
    }

    /// Iterate sessions in insertion order
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&str, &SessionErrors)> + '_ {
        self.sessions.iter().map(|(id, errors)| (id.as_str(), errors))
    }

    /// Whether the report holds no session at all
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Serialize for FieldErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.rules.len()))?;
        for (rule, message) in self.rules.iter() {
            map.serialize_entry(rule.as_str(), message)?;
        }
        map.end()
    }
}

impl Serialize for SessionErrors {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.fields.iter())
    }
}

impl Serialize for Report {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.sessions.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_add_and_read_back() {
        let mut report = Report::new();
        report.add_error("form", "email", RuleKey::Required, "Email is required");

        assert!(report.has_errors("form"));
        assert_eq!(
            report.message("form", "email", RuleKey::Required),
            Some("Email is required")
        );
        assert_eq!(report.message("form", "email", RuleKey::Pattern), None);
        assert_eq!(report.message("other", "email", RuleKey::Required), None);
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_upsert_overwrites_message() {
        let mut report = Report::new();
        report.add_error("form", "age", RuleKey::MaxLength, "first");
        report.add_error("form", "age", RuleKey::MaxLength, "second");
        assert_eq!(report.message("form", "age", RuleKey::MaxLength), Some("second"));
        assert_eq!(report.error_count(), 1);
    }

    #[test]
    fn test_remove_drops_empty_field() {
        let mut report = Report::new();
        report.add_error("form", "age", RuleKey::Required, "required");
        report.add_error("form", "age", RuleKey::Type, "type");

        report.remove_error("form", "age", RuleKey::Required);
        assert!(report.session("form").unwrap().field("age").is_some());

        report.remove_error("form", "age", RuleKey::Type);
        assert!(report.session("form").unwrap().field("age").is_none());
        assert!(!report.has_errors("form"));

        // absent keys are a no-op
        report.remove_error("form", "age", RuleKey::Type);
        report.remove_error("nope", "age", RuleKey::Type);
    }

    #[test]
    fn test_prune_resets_idle_session() {
        let mut report = Report::new();
        report.add_error("form", "age", RuleKey::Required, "required");
        assert!(!report.prune("form"));

        report.remove_error("form", "age", RuleKey::Required);
        assert!(!report.is_empty());
        assert!(report.prune("form"));
        assert!(report.is_empty());
        assert!(!report.prune("form"));
    }

    #[test]
    fn test_last_message_follows_insertion_order() {
        let mut report = Report::new();
        assert_eq!(report.last_message(), None);

        report.add_error("form", "name", RuleKey::Required, "name required");
        report.add_error("form", "email", RuleKey::Required, "email required");
        report.add_error("form", "email", RuleKey::Pattern, "email pattern");
        assert_eq!(report.last_message(), Some("email pattern"));

        report.remove_error("form", "email", RuleKey::Required);
        report.remove_error("form", "email", RuleKey::Pattern);
        assert_eq!(report.last_message(), Some("name required"));
    }

    #[test]
    fn test_serializes_as_nested_object() {
        let mut report = Report::new();
        report.add_error("login", "email", RuleKey::RuleTitle, "bad email");
        report.add_error("login", "password", RuleKey::MinLength, "too short");

        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(
            value,
            json!({
                "login": {
                    "email": { "ruleTitle": "bad email" },
                    "password": { "minLength": "too short" }
                }
            })
        );
    }
}
