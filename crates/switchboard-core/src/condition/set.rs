//! Condition sets: namespaced bundles of fields bound to context kinds

use super::field::{label_from_name, Field};
use super::result::EvaluationResult;
use crate::context::{Context, ContextKind};
use crate::error::Result;
use crate::evaluator::NamespaceConditions;
use crate::types::{ValidationError, Value};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Pulls raw field values out of a context.
///
/// `Ok(None)` means the field is unavailable for this context. Errors are
/// reserved for inputs that make a value impossible to compute correctly,
/// such as a malformed address used as a bucket key.
pub trait FieldAccessor: Send + Sync {
    fn get_field_value(&self, context: &Context<'_>, field: &str) -> Result<Option<Value>>;
}

/// Plain attribute lookup by field name
#[derive(Debug, Default, Clone, Copy)]
pub struct AttributeAccessor;

impl FieldAccessor for AttributeAccessor {
    fn get_field_value(&self, context: &Context<'_>, field: &str) -> Result<Option<Value>> {
        Ok(context.lookup(field))
    }
}

/// Which contexts a condition set can run against
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Applicability {
    /// Every context, including the empty one
    Any,
    /// Only the listed context kinds
    Kinds(Vec<ContextKind>),
}

impl Applicability {
    pub fn allows(&self, kind: ContextKind) -> bool {
        match self {
            Applicability::Any => true,
            Applicability::Kinds(kinds) => kinds.contains(&kind),
        }
    }
}

/// Everything an override needs to decide a single field
pub struct OverrideScope<'a> {
    /// Set the field belongs to
    pub set: &'a ConditionSet,
    pub field: &'a Field,
    pub context: &'a Context<'a>,
    /// All configured conditions of the set's namespace
    pub conditions: &'a NamespaceConditions,
    /// Configured value for `field`, never null
    pub configured: &'a Value,
}

impl<'a> OverrideScope<'a> {
    /// Run the standard rule for this field
    pub fn default_evaluation(&self) -> Result<EvaluationResult> {
        self.set
            .evaluate_field_default(self.field, self.context, self.configured)
    }

    /// Configured value of another field in the same namespace
    pub fn condition(&self, name: &str) -> Option<&'a Value> {
        self.conditions.get(name).filter(|v| !v.is_unset())
    }
}

/// Replacement evaluation rule for one field name
pub type FieldOverride =
    Arc<dyn Fn(&OverrideScope<'_>) -> Result<EvaluationResult> + Send + Sync>;

/// Per-field evaluation record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldTrace {
    pub field: String,
    pub configured: Value,
    pub result: EvaluationResult,
}

/// A namespaced bundle of fields
pub struct ConditionSet {
    id: String,
    namespace: String,
    group_label: String,
    fields: IndexMap<String, Field>,
    applicability: Applicability,
    accessor: Arc<dyn FieldAccessor>,
    overrides: HashMap<String, FieldOverride>,
}

impl ConditionSet {
    /// Start building a set; `id` doubles as the default namespace
    pub fn builder(id: impl Into<String>) -> ConditionSetBuilder {
        ConditionSetBuilder::new(id)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Key of this set's data inside a switch's condition data
    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Display grouping for authoring tools
    pub fn group_label(&self) -> &str {
        &self.group_label
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.fields.values()
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.get(name)
    }

    pub fn applicability(&self) -> &Applicability {
        &self.applicability
    }

    pub fn has_override(&self, field: &str) -> bool {
        self.overrides.contains_key(field)
    }

    /// Whether this set can evaluate `context`
    pub fn can_execute(&self, context: &Context<'_>) -> bool {
        self.applicability.allows(context.kind())
    }

    /// Raw value of `field` for `context`, `None` when unavailable
    pub fn get_field_value(&self, context: &Context<'_>, field: &str) -> Result<Option<Value>> {
        self.accessor.get_field_value(context, field)
    }

    /// Clean a configured value for one of this set's fields.
    ///
    /// Arrays are cleaned element by element.
    pub fn clean(&self, field: &str, raw: &Value) -> std::result::Result<Value, ValidationError> {
        let field = self
            .fields
            .get(field)
            .ok_or_else(|| ValidationError::UnknownField {
                field: format!("{}.{}", self.namespace, field),
            })?;
        match raw {
            Value::Array(items) => items
                .iter()
                .map(|item| field.clean(item))
                .collect::<std::result::Result<Vec<_>, _>>()
                .map(Value::Array),
            single => field.clean(single),
        }
    }

    /// Evaluate the namespace's configured conditions against `context`.
    ///
    /// Every configured value is cleaned before any field is compared, so a
    /// malformed value fails the evaluation whichever context is supplied.
    pub fn evaluate(
        &self,
        context: &Context<'_>,
        conditions: &NamespaceConditions,
    ) -> Result<EvaluationResult> {
        self.evaluate_with(context, conditions, |_| {})
    }

    /// Like [`evaluate`](Self::evaluate), also returning per-field results
    pub fn evaluate_traced(
        &self,
        context: &Context<'_>,
        conditions: &NamespaceConditions,
    ) -> Result<(EvaluationResult, Vec<FieldTrace>)> {
        let mut traces = Vec::new();
        let result = self.evaluate_with(context, conditions, |trace| traces.push(trace))?;
        Ok((result, traces))
    }

    fn evaluate_with(
        &self,
        context: &Context<'_>,
        conditions: &NamespaceConditions,
        mut observe: impl FnMut(FieldTrace),
    ) -> Result<EvaluationResult> {
        for (key, value) in conditions {
            if !self.fields.contains_key(key) {
                tracing::debug!("Ignoring unknown field {}.{}", self.namespace, key);
            } else if !value.is_unset() {
                self.clean(key, value)?;
            }
        }

        let mut result = EvaluationResult::Abstain;
        for field in self.fields.values() {
            let configured = match conditions.get(field.name()) {
                Some(value) if !value.is_unset() => value,
                _ => continue,
            };

            let field_result = match self.overrides.get(field.name()) {
                Some(hook) => (**hook)(&OverrideScope {
                    set: self,
                    field,
                    context,
                    conditions,
                    configured,
                })?,
                None => self.evaluate_field_default(field, context, configured)?,
            };

            tracing::debug!(
                "Field {}.{} on {} context: {}",
                self.namespace,
                field.name(),
                context.kind(),
                field_result
            );
            observe(FieldTrace {
                field: field.name().to_string(),
                configured: configured.clone(),
                result: field_result,
            });

            result = result.or(field_result);
            if result.is_active() {
                break;
            }
        }
        Ok(result)
    }

    fn evaluate_field_default(
        &self,
        field: &Field,
        context: &Context<'_>,
        configured: &Value,
    ) -> Result<EvaluationResult> {
        let candidates: Vec<Value> = match configured {
            Value::Array(items) => items
                .iter()
                .map(|v| field.clean(v))
                .collect::<std::result::Result<_, _>>()?,
            single => vec![field.clean(single)?],
        };

        let actual = match self.get_field_value(context, field.name())? {
            Some(value) if field.accepts(&value) => value,
            _ => return Ok(EvaluationResult::Abstain),
        };

        let matched = candidates
            .iter()
            .any(|candidate| field.matches(candidate, &actual));
        Ok(EvaluationResult::from(matched))
    }
}

impl fmt::Debug for ConditionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionSet")
            .field("id", &self.id)
            .field("namespace", &self.namespace)
            .field("group_label", &self.group_label)
            .field("fields", &self.fields.keys().collect::<Vec<_>>())
            .field("applicability", &self.applicability)
            .field("overrides", &self.overrides.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ConditionSet`]
///
/// # Example
///
/// ```rust
/// use switchboard_core::{ConditionSet, ContextKind, Field};
///
/// let set = ConditionSet::builder("tenant")
///     .group_label("Tenant")
///     .applies_to(ContextKind::Request)
///     .field(Field::string("HTTP_X_TENANT").with_label("Tenant header"))
///     .build();
///
/// assert_eq!(set.namespace(), "tenant");
/// ```
pub struct ConditionSetBuilder {
    id: String,
    namespace: Option<String>,
    group_label: Option<String>,
    fields: IndexMap<String, Field>,
    applicability: Applicability,
    accessor: Option<Arc<dyn FieldAccessor>>,
    overrides: HashMap<String, FieldOverride>,
}

impl ConditionSetBuilder {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            namespace: None,
            group_label: None,
            fields: IndexMap::new(),
            applicability: Applicability::Any,
            accessor: None,
            overrides: HashMap::new(),
        }
    }

    /// Override the namespace (defaults to the id)
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    pub fn group_label(mut self, label: impl Into<String>) -> Self {
        self.group_label = Some(label.into());
        self
    }

    /// Declare a field; a repeated name replaces the earlier declaration in place
    pub fn field(mut self, field: Field) -> Self {
        self.fields.insert(field.name().to_string(), field);
        self
    }

    /// Restrict the set to a context kind (may be called repeatedly)
    pub fn applies_to(mut self, kind: ContextKind) -> Self {
        match &mut self.applicability {
            Applicability::Kinds(kinds) => {
                if !kinds.contains(&kind) {
                    kinds.push(kind);
                }
            }
            Applicability::Any => self.applicability = Applicability::Kinds(vec![kind]),
        }
        self
    }

    pub fn accessor(mut self, accessor: impl FieldAccessor + 'static) -> Self {
        self.accessor = Some(Arc::new(accessor));
        self
    }

    /// Replace the evaluation rule for one field name
    pub fn override_field<F>(mut self, field: impl Into<String>, hook: F) -> Self
    where
        F: Fn(&OverrideScope<'_>) -> Result<EvaluationResult> + Send + Sync + 'static,
    {
        self.overrides.insert(field.into(), Arc::new(hook));
        self
    }

    pub fn build(self) -> ConditionSet {
        let namespace = self.namespace.unwrap_or_else(|| self.id.clone());
        let group_label = self
            .group_label
            .unwrap_or_else(|| label_from_name(&self.id));

        for name in self.overrides.keys() {
            if !self.fields.contains_key(name) {
                tracing::warn!(
                    "Override for undeclared field {}.{} will never run",
                    namespace,
                    name
                );
            }
        }

        ConditionSet {
            id: self.id,
            namespace,
            group_label,
            fields: self.fields,
            applicability: self.applicability,
            accessor: self.accessor.unwrap_or_else(|| Arc::new(AttributeAccessor)),
            overrides: self.overrides,
        }
    }
}
