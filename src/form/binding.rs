use std::sync::Arc;

use super::controller::{
    FieldRecord, FormController, FormError, FormResult, FormState, SubmitState, read_lock,
    write_lock,
};
use super::values::{FieldKey, FormErrors, FormValues};
use crate::id::{FormId, SubmitToken};

/// Attributes a host renders onto the input element of a field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldInput {
    pub id: String,
    pub name: String,
    pub value: String,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldSnapshot {
    pub key: FieldKey,
    pub value: String,
    pub initial_value: String,
    pub pristine: bool,
    pub touched: bool,
    pub error: Option<String>,
    pub input: FieldInput,
}

impl FieldSnapshot {
    fn project(key: &FieldKey, record: &FieldRecord) -> Self {
        Self {
            key: key.clone(),
            value: record.value.clone(),
            initial_value: record.initial_value.clone(),
            pristine: record.pristine,
            touched: record.touched,
            error: record.error.clone(),
            input: FieldInput {
                id: key.to_string(),
                name: key.to_string(),
                value: record.value.clone(),
            },
        }
    }
}

/// Read model of a form at one revision.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FormSnapshot {
    pub form_id: FormId,
    pub revision: u64,
    pub fields: Vec<FieldSnapshot>,
    pub errors: FormErrors,
    pub valid: bool,
    pub pristine: bool,
    pub submitting: bool,
    pub submitting_failed: bool,
    pub submitting_success: bool,
    pub submit_state: SubmitState,
    pub submit_token: Option<SubmitToken>,
}

impl FormSnapshot {
    pub fn field(&self, key: &str) -> Option<&FieldSnapshot> {
        self.fields.iter().find(|field| field.key.as_str() == key)
    }

    pub fn values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|field| (field.key.clone(), field.value.clone()))
            .collect()
    }
}

fn build_snapshot<C>(form_id: FormId, state: &FormState<C>) -> FormSnapshot {
    let fields = state
        .fields
        .iter()
        .map(|(key, record)| FieldSnapshot::project(key, record))
        .collect::<Vec<_>>();
    let errors = fields
        .iter()
        .filter_map(|field| Some((field.key.clone(), field.error.clone()?)))
        .collect::<FormErrors>();

    FormSnapshot {
        form_id,
        revision: state.revision,
        valid: errors.is_empty(),
        pristine: fields.iter().all(|field| field.pristine),
        submitting: state.submit_state == SubmitState::Submitting,
        submitting_failed: state.submit_state == SubmitState::Failed,
        submitting_success: state.submit_state == SubmitState::Succeeded,
        submit_state: state.submit_state,
        submit_token: state.submit_token,
        fields,
        errors,
    }
}

impl<C> FormController<C>
where
    C: Send + Sync + 'static,
{
    /// Current read model. Repeated calls without an intervening mutation return the
    /// same `Arc`.
    pub fn snapshot(&self) -> FormResult<Arc<FormSnapshot>> {
        let state = read_lock(&self.inner.state, "creating form snapshot")?;
        if let Some(cached) = read_lock(&self.inner.view, "reading cached snapshot")?
            .as_ref()
            .filter(|snapshot| snapshot.revision == state.revision)
        {
            return Ok(cached.clone());
        }

        let snapshot = Arc::new(build_snapshot(self.inner.id, &state));
        *write_lock(&self.inner.view, "caching form snapshot")? = Some(snapshot.clone());
        Ok(snapshot)
    }

    pub fn field(&self, key: &str) -> FormResult<FieldBinding<C>> {
        let state = read_lock(&self.inner.state, "binding field")?;
        let Some((declared, _)) = state.fields.get_key_value(key) else {
            return Err(FormError::UnknownField(FieldKey::from(key.to_string())));
        };
        Ok(FieldBinding {
            form: self.clone(),
            key: declared.clone(),
        })
    }

    /// Bindings for every field, in declaration order.
    pub fn fields(&self) -> FormResult<Vec<FieldBinding<C>>> {
        let state = read_lock(&self.inner.state, "binding fields")?;
        Ok(state
            .keys()
            .into_iter()
            .map(|key| FieldBinding {
                form: self.clone(),
                key,
            })
            .collect())
    }
}

/// Change and blur dispatchers bound to one field.
pub struct FieldBinding<C = ()> {
    form: FormController<C>,
    key: FieldKey,
}

impl<C> Clone for FieldBinding<C> {
    fn clone(&self) -> Self {
        Self {
            form: self.form.clone(),
            key: self.key.clone(),
        }
    }
}

impl<C> FieldBinding<C>
where
    C: Send + Sync + 'static,
{
    pub fn key(&self) -> &FieldKey {
        &self.key
    }

    pub fn on_change(&self, value: impl Into<String>) -> FormResult<()> {
        self.form.on_change(self.key.as_str(), value)
    }

    pub fn on_blur(&self) -> FormResult<()> {
        self.form.on_blur(self.key.as_str())
    }

    pub fn set_value(&self, value: impl Into<String>) -> FormResult<()> {
        self.form.set_value(self.key.as_str(), value)
    }

    pub fn state(&self) -> FormResult<FieldSnapshot> {
        let snapshot = self.form.snapshot()?;
        snapshot
            .field(self.key.as_str())
            .cloned()
            .ok_or_else(|| FormError::UnknownField(self.key.clone()))
    }

    pub fn checkbox(self) -> CheckboxBinding<C> {
        CheckboxBinding { field: self }
    }
}

/// Checkbox projection of a string field: checked is the literal `"true"`.
pub struct CheckboxBinding<C = ()> {
    field: FieldBinding<C>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CheckboxInput {
    pub id: String,
    pub name: String,
    pub value: String,
    pub checked: bool,
}

impl<C> CheckboxBinding<C>
where
    C: Send + Sync + 'static,
{
    pub fn input(&self) -> FormResult<CheckboxInput> {
        let FieldInput { id, name, value } = self.field.state()?.input;
        Ok(CheckboxInput {
            checked: value == "true",
            id,
            name,
            value,
        })
    }

    pub fn checked(&self) -> FormResult<bool> {
        Ok(self.input()?.checked)
    }

    pub fn on_change(&self, checked: bool) -> FormResult<()> {
        self.field.set_value(checked.to_string())
    }

    pub fn on_blur(&self) -> FormResult<()> {
        self.field.on_blur()
    }
}
