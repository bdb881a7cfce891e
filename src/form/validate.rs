//! Validation hooks run before a submission is dispatched

use serde::Serialize;
use serde_json::Value;

use super::path::PropertyPath;
use super::state::FormState;

/// A path-addressed validation message
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    pub path: PropertyPath,
    pub message: String,
}

impl FieldIssue {
    pub fn new(path: PropertyPath, message: impl Into<String>) -> Self {
        Self {
            path,
            message: message.into(),
        }
    }
}

/// Externally supplied validation rules
pub trait Validator: Send + Sync {
    fn validate(&self, state: &FormState) -> Result<(), Vec<FieldIssue>>;
}

/// Accepts everything
pub struct NoValidation;

impl Validator for NoValidation {
    fn validate(&self, _state: &FormState) -> Result<(), Vec<FieldIssue>> {
        Ok(())
    }
}

/// Requires each listed path to hold a non-empty value.
///
/// A `[*]` pattern applies to every list item present in the state and is
/// satisfied by an empty list.
pub struct RequiredFields {
    paths: Vec<PropertyPath>,
}

impl RequiredFields {
    pub fn new(paths: Vec<PropertyPath>) -> Self {
        Self { paths }
    }
}

fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        _ => false,
    }
}

impl Validator for RequiredFields {
    fn validate(&self, state: &FormState) -> Result<(), Vec<FieldIssue>> {
        let mut issues = Vec::new();

        for pattern in &self.paths {
            if pattern.has_wildcard() {
                for (path, value) in state.iter() {
                    if path.matches(pattern) && is_blank(value) {
                        issues.push(FieldIssue::new(path.clone(), format!("Missing {}", pattern)));
                    }
                }
                continue;
            }

            match state.get(pattern) {
                Some(value) if !is_blank(value) => {}
                _ => issues.push(FieldIssue::new(pattern.clone(), format!("{} is required", pattern))),
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(issues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn p(s: &str) -> PropertyPath {
        PropertyPath::parse(s)
    }

    #[test]
    fn test_required_fields_reports_missing_and_blank() {
        let mut state = FormState::new();
        state.set(p("name"), json!("  "));
        state.set(p("port"), json!(0));

        let validator = RequiredFields::new(vec![p("name"), p("description"), p("port")]);
        let issues = validator.validate(&state).unwrap_err();

        let paths: Vec<String> = issues.iter().map(|i| i.path.to_string()).collect();
        assert_eq!(paths, vec!["name", "description"]);
    }

    #[test]
    fn test_wildcard_checks_each_item() {
        let mut state = FormState::new();
        state.set(p("appIds[0]"), json!("a"));
        state.set(p("appIds[1]"), json!(""));

        let validator = RequiredFields::new(vec![p("appIds[*]")]);
        let issues = validator.validate(&state).unwrap_err();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].path, p("appIds[1]"));
        assert_eq!(issues[0].message, "Missing appIds[*]");

        let empty = FormState::new();
        assert!(validator.validate(&empty).is_ok());
    }
}
