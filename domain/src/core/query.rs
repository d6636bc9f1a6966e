//! Query value object

use serde::{Deserialize, Serialize};

/// A user query to be answered by the orchestrated agents (Value Object)
///
/// Represents the input text that drives pattern selection, routing
/// decisions, and every worker-agent invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Query {
    content: String,
}

impl Query {
    /// Create a new query
    ///
    /// # Panics
    /// Panics if the content is empty or only whitespace
    pub fn new(content: impl Into<String>) -> Self {
        let content = content.into();
        assert!(!content.trim().is_empty(), "Query cannot be empty");
        Self { content }
    }

    /// Try to create a new query, returning None if invalid
    pub fn try_new(content: impl Into<String>) -> Option<Self> {
        let content = content.into();
        if content.trim().is_empty() {
            None
        } else {
            Some(Self { content })
        }
    }

    /// Get the query content
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Lowercased whitespace-separated terms, for routing decisions
    pub fn terms(&self) -> impl Iterator<Item = String> + '_ {
        self.content
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
            .filter(|t| !t.is_empty())
    }
}

impl std::fmt::Display for Query {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.content)
    }
}

impl From<&str> for Query {
    fn from(s: &str) -> Self {
        Query::new(s)
    }
}

impl From<String> for Query {
    fn from(s: String) -> Self {
        Query::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_creation() {
        let q = Query::new("paint sprayer turbo price 750");
        assert_eq!(q.content(), "paint sprayer turbo price 750");
    }

    #[test]
    #[should_panic]
    fn test_empty_query_panics() {
        Query::new("   ");
    }

    #[test]
    fn test_try_new() {
        assert!(Query::try_new("").is_none());
        assert!(Query::try_new("where is it?").is_some());
    }

    #[test]
    fn test_terms_are_normalized() {
        let q = Query::new("Where's the PAINT sprayer, aisle 7?");
        let terms: Vec<String> = q.terms().collect();
        assert!(terms.contains(&"paint".to_string()));
        assert!(terms.contains(&"aisle".to_string()));
        assert!(terms.contains(&"7".to_string()));
    }
}
