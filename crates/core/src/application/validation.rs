// Declarative Argument Validation
//
// Field tags ("required,oneof=web app") are compiled once per method at
// registration and checked against every decoded argument before the method
// runs.

use crate::domain::{RecordShape, SchemaError, TypeRef, TypeShape};
use serde_json::Value;
use std::any::TypeId;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq)]
pub enum Rule {
    /// Present and not the zero value
    Required,
    OneOf(Vec<String>),
    /// Lower bound: numeric value, string length or element count
    Min(f64),
    /// Upper bound: numeric value, string length or element count
    Max(f64),
}

impl Rule {
    /// Parse a comma-separated tag into rules
    pub fn parse_tag(field: &str, tag: &str) -> Result<Vec<Rule>, SchemaError> {
        let invalid = |rule: &str, reason: &str| SchemaError::InvalidRule {
            field: field.to_string(),
            rule: rule.to_string(),
            reason: reason.to_string(),
        };

        let mut rules = Vec::new();
        for raw in tag.split(',').map(str::trim).filter(|r| !r.is_empty()) {
            let (name, param) = match raw.split_once('=') {
                Some((name, param)) => (name.trim(), Some(param.trim())),
                None => (raw, None),
            };
            let rule = match (name, param) {
                ("required", None) => Rule::Required,
                ("omitempty", None) => continue,
                ("oneof", Some(options)) => {
                    let options: Vec<String> =
                        options.split_whitespace().map(str::to_string).collect();
                    if options.is_empty() {
                        return Err(invalid(raw, "oneof needs at least one alternative"));
                    }
                    Rule::OneOf(options)
                }
                ("min", Some(bound)) => Rule::Min(
                    bound
                        .parse()
                        .map_err(|_| invalid(raw, "bound is not a number"))?,
                ),
                ("max", Some(bound)) => Rule::Max(
                    bound
                        .parse()
                        .map_err(|_| invalid(raw, "bound is not a number"))?,
                ),
                _ => return Err(invalid(raw, "unknown rule")),
            };
            rules.push(rule);
        }
        Ok(rules)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Rule::Required => "required",
            Rule::OneOf(_) => "oneof",
            Rule::Min(_) => "min",
            Rule::Max(_) => "max",
        }
    }

    fn check(&self, path: &str, value: Option<&Value>) -> Result<(), String> {
        let value = match value {
            None | Some(Value::Null) => {
                return match self {
                    Rule::Required => Err(format!("{} is required", path)),
                    _ => Ok(()),
                };
            }
            Some(value) => value,
        };

        match self {
            Rule::Required => {
                if is_zero(value) {
                    Err(format!("{} is required", path))
                } else {
                    Ok(())
                }
            }
            Rule::OneOf(options) => {
                let actual = match value {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    _ => return Err(format!("{} must be a string or number", path)),
                };
                if options.contains(&actual) {
                    Ok(())
                } else {
                    Err(format!("{} must be one of [{}]", path, options.join(" ")))
                }
            }
            Rule::Min(bound) => match measure(value) {
                Some(size) if size < *bound => Err(format!("{} must be at least {}", path, bound)),
                _ => Ok(()),
            },
            Rule::Max(bound) => match measure(value) {
                Some(size) if size > *bound => Err(format!("{} must be at most {}", path, bound)),
                _ => Ok(()),
            },
        }
    }
}

fn is_zero(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

fn measure(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => Some(s.chars().count() as f64),
        Value::Array(items) => Some(items.len() as f64),
        Value::Object(entries) => Some(entries.len() as f64),
        _ => None,
    }
}

/// A single failed rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the field, e.g. `filter.channel`
    pub field: String,
    pub rule: &'static str,
    pub message: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Every violation found in one argument
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}", summarize(.0))]
pub struct ValidationErrors(pub Vec<Violation>);

impl ValidationErrors {
    pub fn violations(&self) -> &[Violation] {
        &self.0
    }
}

fn summarize(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| v.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

#[derive(Debug, Clone)]
struct FieldCheck {
    name: &'static str,
    rules: Vec<Rule>,
    nested: Option<ValidationPlan>,
}

/// Compiled validation rules for one record type
#[derive(Debug, Clone, Default)]
pub struct ValidationPlan {
    checks: Vec<FieldCheck>,
}

impl ValidationPlan {
    /// Compile the tags of `ty` and of the records it contains.
    ///
    /// Embedded records contribute checks at the same level; nested records
    /// are checked under their field name.
    pub fn for_type(ty: TypeRef) -> Result<Self, SchemaError> {
        let (ty, shape) = ty.resolve();
        match &shape {
            TypeShape::Record(record) => Self::compile(ty, record, &mut Vec::new()),
            _ => Err(SchemaError::NotARecord(ty.name().to_string())),
        }
    }

    fn compile(
        ty: TypeRef,
        record: &RecordShape,
        open: &mut Vec<TypeId>,
    ) -> Result<Self, SchemaError> {
        open.push(ty.id());
        let mut checks = Vec::new();
        for field in record.fields() {
            let (field_ty, shape) = field.ty().resolve();
            let nested = match &shape {
                TypeShape::Record(inner) if !open.contains(&field_ty.id()) => {
                    Some(Self::compile(field_ty, inner, open)?)
                }
                _ => None,
            };

            if field.is_embedded() {
                if let Some(plan) = nested {
                    checks.extend(plan.checks);
                }
                continue;
            }

            let rules = match field.rules() {
                Some(tag) => Rule::parse_tag(field.name(), tag)?,
                None => Vec::new(),
            };
            let nested = nested.filter(|plan| !plan.is_empty());
            if !rules.is_empty() || nested.is_some() {
                checks.push(FieldCheck {
                    name: field.name(),
                    rules,
                    nested,
                });
            }
        }
        open.pop();
        Ok(Self { checks })
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    /// Check a decoded argument, collecting every violation
    pub fn validate(&self, value: &Value) -> Result<(), ValidationErrors> {
        let mut violations = Vec::new();
        self.walk(value, "", &mut violations);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(violations))
        }
    }

    fn walk(&self, value: &Value, prefix: &str, violations: &mut Vec<Violation>) {
        let object = value.as_object();
        for check in &self.checks {
            let path = format!("{}{}", prefix, check.name);
            let field = object.and_then(|o| o.get(check.name));

            for rule in &check.rules {
                if let Err(message) = rule.check(&path, field) {
                    violations.push(Violation {
                        field: path.clone(),
                        rule: rule.name(),
                        message,
                    });
                }
            }

            if let (Some(plan), Some(inner @ Value::Object(_))) = (&check.nested, field) {
                plan.walk(inner, &format!("{}.", path), violations);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Describe;
    use serde_json::json;

    struct LoginRequest;

    impl Describe for LoginRequest {
        fn shape() -> TypeShape {
            TypeShape::record::<Self>()
                .field_with::<String>("channel", "required,oneof=web app")
                .field_with::<String>("nickname", "min=2,max=8")
                .build()
        }
    }

    struct Paging;

    impl Describe for Paging {
        fn shape() -> TypeShape {
            TypeShape::record::<Self>()
                .field_with::<u32>("page", "required,min=1")
                .build()
        }
    }

    struct Search;

    impl Describe for Search {
        fn shape() -> TypeShape {
            TypeShape::record::<Self>()
                .embed::<LoginRequest>()
                .field::<Option<Paging>>("paging")
                .field_with::<Vec<String>>("tags", "max=2")
                .build()
        }
    }

    struct BadTag;

    impl Describe for BadTag {
        fn shape() -> TypeShape {
            TypeShape::record::<Self>()
                .field_with::<String>("x", "required,between=1 2")
                .build()
        }
    }

    #[test]
    fn test_parse_tag() {
        assert_eq!(
            Rule::parse_tag("channel", "required, oneof=web app").unwrap(),
            vec![
                Rule::Required,
                Rule::OneOf(vec!["web".to_string(), "app".to_string()])
            ]
        );
        assert_eq!(
            Rule::parse_tag("n", "omitempty,min=1.5").unwrap(),
            vec![Rule::Min(1.5)]
        );
        assert!(Rule::parse_tag("n", "min=abc").is_err());
        assert!(Rule::parse_tag("n", "oneof=").is_err());
    }

    #[test]
    fn test_unknown_rule_fails_compilation() {
        let err = ValidationPlan::for_type(TypeRef::of::<BadTag>()).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidRule { ref field, .. } if field == "x"));
    }

    #[test]
    fn test_required_and_oneof() {
        let plan = ValidationPlan::for_type(TypeRef::of::<LoginRequest>()).unwrap();

        assert!(plan.validate(&json!({"channel": "web"})).is_ok());

        let err = plan.validate(&json!({"channel": ""})).unwrap_err();
        assert_eq!(err.violations().len(), 2);
        assert_eq!(err.violations()[0].rule, "required");
        assert_eq!(err.violations()[1].rule, "oneof");

        let err = plan.validate(&json!({"channel": "tv"})).unwrap_err();
        assert_eq!(err.to_string(), "channel must be one of [web app]");

        let err = plan.validate(&json!({})).unwrap_err();
        assert_eq!(err.to_string(), "channel is required");
    }

    #[test]
    fn test_length_bounds() {
        let plan = ValidationPlan::for_type(TypeRef::of::<LoginRequest>()).unwrap();
        assert!(plan
            .validate(&json!({"channel": "app", "nickname": "bob"}))
            .is_ok());

        let err = plan
            .validate(&json!({"channel": "app", "nickname": "b"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "nickname must be at least 2");

        let err = plan
            .validate(&json!({"channel": "app", "nickname": "bartholomew"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "nickname must be at most 8");
    }

    #[test]
    fn test_embedded_and_nested_records() {
        let plan = ValidationPlan::for_type(TypeRef::of::<Search>()).unwrap();

        assert!(plan
            .validate(&json!({"channel": "web", "paging": {"page": 1}, "tags": []}))
            .is_ok());

        // absent nested record is not descended into
        assert!(plan.validate(&json!({"channel": "web"})).is_ok());

        let err = plan
            .validate(&json!({"channel": "x", "paging": {"page": 0}, "tags": ["a", "b", "c"]}))
            .unwrap_err();
        let fields: Vec<_> = err.violations().iter().map(|v| v.field.as_str()).collect();
        assert_eq!(fields, vec!["channel", "paging.page", "paging.page", "tags"]);
    }

    #[test]
    fn test_record_without_tags_has_empty_plan() {
        let plan = ValidationPlan::for_type(TypeRef::of::<Paging>()).unwrap();
        assert!(!plan.is_empty());

        struct Plain;
        impl Describe for Plain {
            fn shape() -> TypeShape {
                TypeShape::record::<Self>().field::<String>("a").build()
            }
        }
        assert!(ValidationPlan::for_type(TypeRef::of::<Plain>())
            .unwrap()
            .is_empty());
    }
}
