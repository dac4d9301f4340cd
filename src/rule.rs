use regex::Regex;

use crate::action::Action;

/// A lexing rule: name, priority, compiled regex, and action.
/// Rules are tried in ascending priority order; first match wins.
#[derive(Clone)]
pub struct Rule {
    pub name: String,
    pub priority: u32,
    pub pattern: Regex,
    pub action: Action,
}

impl Rule {
    /// Create a new rule. The pattern is compiled case-insensitive with
    /// dot-matches-newline and anchored at the current scan position.
    pub fn new(name: &str, priority: u32, pattern: &str, action: Action) -> Self {
        let full_pattern = format!(r"(?si)\A(?:{})", pattern);
        let compiled = Regex::new(&full_pattern)
            .unwrap_or_else(|e| panic!("Invalid regex for rule '{}': {}", name, e));
        Self {
            name: name.to_string(),
            priority,
            pattern: compiled,
            action,
        }
    }

    /// Length in bytes of this rule's match at the start of `remaining`.
    pub fn match_len(&self, remaining: &str) -> Option<usize> {
        self.pattern
            .find(remaining)
            .map(|m| m.end())
            .filter(|&len| len > 0)
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("priority", &self.priority)
            .field("action", &self.action)
            .finish()
    }
}
