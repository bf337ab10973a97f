// 🔐 Access Policy - Rules as Data
// Ordered (path matcher → requirement) pairs evaluated top to bottom.
// The first rule whose matcher accepts the path decides.

use super::Principal;

// ============================================================================
// PATH MATCHING
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathMatcher {
    /// `/design` matches `/design` and `/design/`, nothing below it
    Exact(String),

    /// `/api/**` matches `/api` and everything below it; `/**` matches all
    Prefix(String),
}

impl PathMatcher {
    /// Parse an ant-style pattern. Only a trailing `/**` is special.
    pub fn parse(pattern: &str) -> Self {
        match pattern.strip_suffix("/**") {
            Some(prefix) => PathMatcher::Prefix(prefix.to_string()),
            None => PathMatcher::Exact(pattern.to_string()),
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            PathMatcher::Exact(exact) => {
                path == exact || (path.len() > 1 && path.strip_suffix('/') == Some(exact.as_str()))
            }
            PathMatcher::Prefix(prefix) => {
                path == prefix
                    || path
                        .strip_prefix(prefix.as_str())
                        .map_or(false, |rest| rest.starts_with('/'))
            }
        }
    }
}

// ============================================================================
// RULES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    PermitAll,
    Authenticated,
    HasRole(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// No principal; send the client to the login form
    LoginRequired,
    /// Authenticated but missing the required role
    Forbidden,
}

#[derive(Debug, Clone)]
pub struct AccessRule {
    pub matchers: Vec<PathMatcher>,
    pub requirement: Requirement,
}

impl AccessRule {
    pub fn new(patterns: &[&str], requirement: Requirement) -> Self {
        AccessRule {
            matchers: patterns.iter().map(|p| PathMatcher::parse(p)).collect(),
            requirement,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}

// ============================================================================
// POLICY
// ============================================================================

#[derive(Debug, Clone)]
pub struct AccessPolicy {
    rules: Vec<AccessRule>,
}

impl AccessPolicy {
    /// Empty policy: every path is allowed
    pub fn new() -> Self {
        AccessPolicy { rules: Vec::new() }
    }

    /// Append a rule. Rules are evaluated in insertion order.
    pub fn rule(mut self, patterns: &[&str], requirement: Requirement) -> Self {
        self.rules.push(AccessRule::new(patterns, requirement));
        self
    }

    pub fn evaluate(&self, path: &str, principal: Option<&Principal>) -> Decision {
        let Some(rule) = self.rules.iter().find(|r| r.matches(path)) else {
            return Decision::Allow;
        };

        match (&rule.requirement, principal) {
            (Requirement::PermitAll, _) => Decision::Allow,
            (_, None) => Decision::LoginRequired,
            (Requirement::Authenticated, Some(_)) => Decision::Allow,
            (Requirement::HasRole(role), Some(p)) if p.has_role(role) => Decision::Allow,
            (Requirement::HasRole(_), Some(_)) => Decision::Forbidden,
        }
    }
}

impl Default for AccessPolicy {
    /// Designing tacos and placing orders need a USER; the rest is open.
    fn default() -> Self {
        AccessPolicy::new()
            .rule(&["/design", "/orders"], Requirement::HasRole("USER".to_string()))
            .rule(&["/", "/**"], Requirement::PermitAll)
    }
}
