use std::sync::Arc;

use indexmap::IndexMap;

use super::controller::{FieldRecord, FormError, FormResult};
use super::values::{FieldErrors, FieldKey, FormValues};

/// Validates one field. Receives the field's own value, the full value map (so a rule may
/// look at sibling fields) and the external context.
pub trait FieldValidator<C>: Send + Sync {
    fn validate(&self, value: &str, values: &FormValues, context: &C) -> Option<String>;
}

impl<C, F> FieldValidator<C> for F
where
    F: Fn(&str, &FormValues, &C) -> Option<String> + Send + Sync,
{
    fn validate(&self, value: &str, values: &FormValues, context: &C) -> Option<String> {
        (self)(value, values, context)
    }
}

/// Validates the whole value map in one pass.
pub trait FormValidator<C>: Send + Sync {
    fn validate(&self, values: &FormValues, context: &C) -> FieldErrors;
}

impl<C, F> FormValidator<C> for F
where
    F: Fn(&FormValues, &C) -> FieldErrors + Send + Sync,
{
    fn validate(&self, values: &FormValues, context: &C) -> FieldErrors {
        (self)(values, context)
    }
}

/// The single validation shape the store works with.
pub type CanonicalValidator<C> = Arc<dyn Fn(&FormValues, &C) -> FieldErrors + Send + Sync>;

/// One validator per field. Declaration order is the form's field order.
pub struct ObjectValidator<C> {
    entries: IndexMap<FieldKey, Arc<dyn FieldValidator<C>>>,
    /// First key declared twice; reported when the form is created.
    duplicate: Option<FieldKey>,
}

impl<C> ObjectValidator<C> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
            duplicate: None,
        }
    }

    pub fn field<V>(mut self, key: impl Into<FieldKey>, validator: V) -> Self
    where
        V: FieldValidator<C> + 'static,
    {
        let key = key.into();
        if self.entries.contains_key(&key) {
            self.duplicate.get_or_insert(key);
        } else {
            self.entries.insert(key, Arc::new(validator));
        }
        self
    }

    /// Declares a field that never reports an error.
    pub fn unchecked(self, key: impl Into<FieldKey>) -> Self
    where
        C: 'static,
    {
        self.field(key, |_: &str, _: &FormValues, _: &C| -> Option<String> { None })
    }

    pub fn keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.entries.keys()
    }
}

impl<C> Default for ObjectValidator<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// The two accepted ways of declaring validation.
pub enum Validation<C> {
    PerField(ObjectValidator<C>),
    WholeObject(Arc<dyn FormValidator<C>>),
}

impl<C> Validation<C> {
    pub fn per_field() -> ObjectValidator<C> {
        ObjectValidator::new()
    }

    pub fn whole_object<V>(validator: V) -> Self
    where
        V: FormValidator<C> + 'static,
    {
        Self::WholeObject(Arc::new(validator))
    }
}

impl<C> From<ObjectValidator<C>> for Validation<C> {
    fn from(value: ObjectValidator<C>) -> Self {
        Self::PerField(value)
    }
}

/// Field keys in form order.
///
/// A per-field declaration fixes the order itself; a whole-object validator has no key
/// list of its own, so the order of the initial values is used.
pub(super) fn declared_keys<C>(
    validation: &Validation<C>,
    initial_values: &FormValues,
) -> FormResult<Vec<FieldKey>> {
    match validation {
        Validation::PerField(validators) => match &validators.duplicate {
            Some(key) => Err(FormError::DuplicateField(key.clone())),
            None => Ok(validators.keys().cloned().collect()),
        },
        Validation::WholeObject(_) => Ok(initial_values.keys().cloned().collect()),
    }
}

/// Resolves a declaration into the canonical whole-object function.
pub fn normalize<C>(validation: Validation<C>) -> CanonicalValidator<C>
where
    C: 'static,
{
    match validation {
        Validation::WholeObject(validator) => {
            Arc::new(move |values: &FormValues, context: &C| validator.validate(values, context))
        }
        Validation::PerField(validators) => {
            Arc::new(move |values: &FormValues, context: &C| {
                let mut errors = FieldErrors::with_capacity(validators.entries.len());
                for (key, validator) in &validators.entries {
                    let value = values.value(key.as_str());
                    debug_assert!(value.is_some(), "no value for declared field `{key}`");
                    let error = validator.validate(value.unwrap_or_default(), values, context);
                    errors.insert(key.clone(), error);
                }
                errors
            })
        }
    }
}

/// Builds the pristine record of every key and runs the first validation pass.
pub(super) fn initial_records<C>(
    keys: &[FieldKey],
    validator: &CanonicalValidator<C>,
    initial_values: &FormValues,
    context: &C,
) -> FormResult<IndexMap<FieldKey, FieldRecord>> {
    let values = baseline_values(keys, initial_values)?;
    let errors = validator(&values, context);
    Ok(values
        .into_iter()
        .map(|(key, value)| {
            let error = errors.get(key.as_str()).cloned().flatten();
            let record = FieldRecord {
                initial_value: value.clone(),
                value,
                pristine: true,
                touched: false,
                error,
            };
            (key, record)
        })
        .collect())
}

/// Projects `initial_values` onto `keys`, in key order. Every key needs a value.
fn baseline_values(keys: &[FieldKey], initial_values: &FormValues) -> FormResult<FormValues> {
    let mut values = FormValues::with_capacity(keys.len());
    for key in keys {
        let Some(value) = initial_values.get(key.as_str()) else {
            return Err(FormError::MissingInitialValue(key.clone()));
        };
        values.insert(key.clone(), value.clone());
    }
    Ok(values)
}
