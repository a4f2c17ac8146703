//! Declarative request validation.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

/// One failed rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// All failed rules for a request, grouped by field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationFailure {
    errors: BTreeMap<String, Vec<String>>,
}

impl ValidationFailure {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, error: FieldError) {
        self.errors
            .entry(error.field)
            .or_default()
            .push(error.message);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.contains_key(field)
    }

    pub fn messages(&self, field: &str) -> &[String] {
        self.errors.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.errors.keys().map(String::as_str)
    }

    pub fn errors(&self) -> &BTreeMap<String, Vec<String>> {
        &self.errors
    }
}

impl FromIterator<FieldError> for ValidationFailure {
    fn from_iter<I: IntoIterator<Item = FieldError>>(iter: I) -> Self {
        let mut failure = Self::new();
        for error in iter {
            failure.push(error);
        }
        failure
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.errors {
            for message in messages {
                if !first {
                    f.write_str("; ")?;
                }
                write!(f, "{field}: {message}")?;
                first = false;
            }
        }
        Ok(())
    }
}

/// Checks a request and reports every broken rule.
pub trait Validator<R>: Send + Sync {
    fn validate(&self, request: &R) -> Vec<FieldError>;
}

type Predicate<R> = Box<dyn Fn(&R) -> bool + Send + Sync>;

struct Rule<R> {
    fields: Vec<&'static str>,
    message: String,
    check: Predicate<R>,
    guard: Option<Predicate<R>>,
}

/// Rule list built fluently, evaluated without short-circuiting.
///
/// ```ignore
/// Rules::new()
///     .not_blank("name", |r: &CreateZone| r.name.as_str())
///     .max_len("code", 10, |r: &CreateZone| r.code.as_str())
///     .rule("description", "too long", |r| r.description.len() < 500)
///     .when(|r| r.description.is_some());
/// ```
pub struct Rules<R> {
    rules: Vec<Rule<R>>,
}

impl<R> Default for Rules<R> {
    fn default() -> Self {
        Self { rules: Vec::new() }
    }
}

impl<R> Rules<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule on `field`; `check` returns true when the request is valid.
    pub fn rule(
        mut self,
        field: &'static str,
        message: impl Into<String>,
        check: impl Fn(&R) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            fields: vec![field],
            message: message.into(),
            check: Box::new(check),
            guard: None,
        });
        self
    }

    /// Adds a rule spanning several fields. A failure is reported under each.
    pub fn cross_field(
        mut self,
        fields: &[&'static str],
        message: impl Into<String>,
        check: impl Fn(&R) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.rules.push(Rule {
            fields: fields.to_vec(),
            message: message.into(),
            check: Box::new(check),
            guard: None,
        });
        self
    }

    /// Only evaluates the previously added rule when `guard` holds.
    pub fn when(mut self, guard: impl Fn(&R) -> bool + Send + Sync + 'static) -> Self {
        if let Some(rule) = self.rules.last_mut() {
            rule.guard = Some(Box::new(guard));
        }
        self
    }

    pub fn not_blank(
        self,
        field: &'static str,
        get: impl Fn(&R) -> &str + Send + Sync + 'static,
    ) -> Self {
        self.rule(field, "must not be empty", move |r| !get(r).trim().is_empty())
    }

    pub fn max_len(
        self,
        field: &'static str,
        max: usize,
        get: impl Fn(&R) -> &str + Send + Sync + 'static,
    ) -> Self {
        self.rule(
            field,
            format!("must be at most {max} characters"),
            move |r| get(r).chars().count() <= max,
        )
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl<R> Validator<R> for Rules<R> {
    fn validate(&self, request: &R) -> Vec<FieldError> {
        let mut errors = Vec::new();
        for rule in &self.rules {
            if let Some(guard) = &rule.guard
                && !guard(request)
            {
                continue;
            }
            if !(rule.check)(request) {
                errors.extend(
                    rule.fields
                        .iter()
                        .map(|field| FieldError::new(*field, rule.message.clone())),
                );
            }
        }
        errors
    }
}

/// Runs every validator registered for one request type.
pub struct ValidationRunner<R> {
    validators: Vec<Box<dyn Validator<R>>>,
}

impl<R> Default for ValidationRunner<R> {
    fn default() -> Self {
        Self {
            validators: Vec::new(),
        }
    }
}

impl<R> ValidationRunner<R> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, validator: impl Validator<R> + 'static) {
        self.validators.push(Box::new(validator));
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }

    /// Evaluates every rule of every validator; an empty result means valid.
    pub fn validate(&self, request: &R) -> ValidationFailure {
        self.validators
            .iter()
            .flat_map(|validator| validator.validate(request))
            .collect()
    }
}

/// Validators keyed by request type.
#[derive(Default)]
pub struct ValidatorRegistry {
    runners: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a validator for `R`. Several validators per type are allowed.
    pub fn add<R: 'static>(&mut self, validator: impl Validator<R> + 'static) {
        let runner = self
            .runners
            .entry(TypeId::of::<R>())
            .or_insert_with(|| {
                Box::new(ValidationRunner::<R>::new()) as Box<dyn Any + Send + Sync>
            });
        if let Some(runner) = runner.downcast_mut::<ValidationRunner<R>>() {
            runner.add(validator);
        }
    }

    /// Returns the runner for `R`, or `None` when `R` has no validators.
    pub fn runner<R: 'static>(&self) -> Option<&ValidationRunner<R>> {
        self.runners
            .get(&TypeId::of::<R>())
            .and_then(|runner| runner.downcast_ref::<ValidationRunner<R>>())
    }

    pub fn len(&self) -> usize {
        self.runners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.runners.is_empty()
    }
}
