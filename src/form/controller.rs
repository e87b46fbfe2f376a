use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use indexmap::IndexMap;
use thiserror::Error;
use tracing::{debug, trace, warn};

use super::binding::FormSnapshot;
use super::validation::{CanonicalValidator, Validation, declared_keys, initial_records, normalize};
use super::values::{FieldErrors, FieldKey, FormValues};
use crate::id::{FormId, SubmitToken};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("unknown field `{0}`")]
    UnknownField(FieldKey),
    #[error("field `{0}` is declared more than once")]
    DuplicateField(FieldKey),
    #[error("no initial value for field `{0}`")]
    MissingInitialValue(FieldKey),
    #[error("no validator declared for field `{0}`")]
    MissingValidator(FieldKey),
    #[error("invalid submit state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    #[error("form is unmounted")]
    Unmounted,
}

pub type FormResult<T> = Result<T, FormError>;

/// State of one declared field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FieldRecord {
    pub value: String,
    pub initial_value: String,
    pub pristine: bool,
    pub touched: bool,
    pub error: Option<String>,
}

pub(super) struct FormState<C> {
    pub(super) fields: IndexMap<FieldKey, FieldRecord>,
    pub(super) context: C,
    pub(super) submit_state: SubmitState,
    pub(super) submit_token: Option<SubmitToken>,
    /// Bumped by every mutation that changes observable state.
    pub(super) revision: u64,
}

impl<C> FormState<C> {
    pub(super) fn values(&self) -> FormValues {
        self.fields
            .iter()
            .map(|(key, record)| (key.clone(), record.value.clone()))
            .collect()
    }

    pub(super) fn keys(&self) -> Vec<FieldKey> {
        self.fields.keys().cloned().collect()
    }

    pub(super) fn record_mut(&mut self, key: &str) -> FormResult<&mut FieldRecord> {
        self.fields
            .get_mut(key)
            .ok_or_else(|| FormError::UnknownField(FieldKey::from(key.to_string())))
    }

    pub(super) fn has_errors(&self) -> bool {
        self.fields.values().any(|record| record.error.is_some())
    }

    /// Re-runs validation over the current values and overwrites every field's error.
    /// Returns whether any field ended up with an error.
    pub(super) fn revalidate(&mut self, validator: &CanonicalValidator<C>) -> bool {
        let errors = validator(&self.values(), &self.context);
        self.apply_errors(&errors)
    }

    fn apply_errors(&mut self, errors: &FieldErrors) -> bool {
        let mut has_errors = false;
        for (key, record) in &mut self.fields {
            record.error = errors.get(key.as_str()).cloned().flatten();
            has_errors |= record.error.is_some();
        }
        has_errors
    }

    pub(super) fn touch_all(&mut self) {
        for record in self.fields.values_mut() {
            record.touched = true;
        }
    }
}

pub(super) struct FormInner<C> {
    pub(super) id: FormId,
    pub(super) validator: CanonicalValidator<C>,
    pub(super) state: RwLock<FormState<C>>,
    pub(super) live: AtomicBool,
    pub(super) view: RwLock<Option<Arc<FormSnapshot>>>,
}

impl<C> FormInner<C> {
    pub(super) fn is_live(&self) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

/// Handle to one mounted form. Clones share the same state.
pub struct FormController<C = ()> {
    pub(super) inner: Arc<FormInner<C>>,
}

impl<C> Clone for FormController<C> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<C> FormController<C>
where
    C: Send + Sync + 'static,
{
    /// Creates a form whose fields are the keys `validation` declares.
    ///
    /// Every declared key needs an initial value. Initial values for keys nobody
    /// declared are ignored.
    pub fn new(
        validation: impl Into<Validation<C>>,
        initial_values: FormValues,
        context: C,
    ) -> FormResult<Self> {
        let validation = validation.into();
        let keys = declared_keys(&validation, &initial_values)?;
        let validator = normalize(validation);
        let id = FormId::next();
        warn_undeclared(id, &keys, &initial_values);
        let fields = initial_records(&keys, &validator, &initial_values, &context)?;
        debug!(form = %id, fields = keys.len(), "form created");

        Ok(Self {
            inner: Arc::new(FormInner {
                id,
                validator,
                state: RwLock::new(FormState {
                    fields,
                    context,
                    submit_state: SubmitState::Idle,
                    submit_token: None,
                    revision: 0,
                }),
                live: AtomicBool::new(true),
                view: RwLock::new(None),
            }),
        })
    }

    pub fn form_id(&self) -> FormId {
        self.inner.id
    }

    pub fn is_live(&self) -> bool {
        self.inner.is_live()
    }

    /// Tears the form down. Pending submits still run to completion but no longer write
    /// back, and later mutations fail with [`FormError::Unmounted`].
    pub fn unmount(&self) {
        if self.inner.live.swap(false, Ordering::SeqCst) {
            debug!(form = %self.inner.id, "form unmounted");
        }
    }

    pub fn values(&self) -> FormResult<FormValues> {
        Ok(read_lock(&self.inner.state, "reading form values")?.values())
    }

    pub fn field_record(&self, key: &str) -> FormResult<FieldRecord> {
        let state = read_lock(&self.inner.state, "reading field record")?;
        state
            .fields
            .get(key)
            .cloned()
            .ok_or_else(|| FormError::UnknownField(FieldKey::from(key.to_string())))
    }

    pub fn with_context<R>(&self, f: impl FnOnce(&C) -> R) -> FormResult<R> {
        Ok(f(&read_lock(&self.inner.state, "reading form context")?.context))
    }

    pub fn submit_token(&self) -> FormResult<Option<SubmitToken>> {
        Ok(read_lock(&self.inner.state, "reading submit token")?.submit_token)
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock(&self.inner.state, "reading submit state")?.submit_state)
    }

    /// Applies a change event and revalidates every field against the new values.
    pub fn on_change(&self, key: &str, value: impl Into<String>) -> FormResult<()> {
        let value = value.into();
        let mut state = self.live_state("applying field change")?;
        let record = state.record_mut(key)?;
        record.pristine = value == record.initial_value;
        record.value = value;
        if !state.revalidate(&self.inner.validator) {
            state.submit_token = None;
        }
        state.revision += 1;
        trace!(form = %self.inner.id, field = key, "field changed");
        Ok(())
    }

    /// Same as a change event; for hosts that produce values outside an input event.
    pub fn set_value(&self, key: &str, value: impl Into<String>) -> FormResult<()> {
        self.on_change(key, value)
    }

    pub fn on_blur(&self, key: &str) -> FormResult<()> {
        let mut state = self.live_state("applying field blur")?;
        let record = state.record_mut(key)?;
        if record.touched {
            return Ok(());
        }
        record.touched = true;
        state.revision += 1;
        trace!(form = %self.inner.id, field = key, "field touched");
        Ok(())
    }

    /// Replaces the baseline of every field. Dirty and touched state is discarded.
    pub fn reinitialize(&self, initial_values: FormValues) -> FormResult<()> {
        let mut state = self.live_state("reinitializing form")?;
        let keys = state.keys();
        warn_undeclared(self.inner.id, &keys, &initial_values);
        let fields = initial_records(
            &keys,
            &self.inner.validator,
            &initial_values,
            &state.context,
        )?;
        state.fields = fields;
        state.revision += 1;
        debug!(form = %self.inner.id, "form reinitialized");
        Ok(())
    }

    /// Swaps the external context and revalidates the current values against it.
    pub fn set_context(&self, context: C) -> FormResult<()> {
        let mut state = self.live_state("replacing form context")?;
        state.context = context;
        let has_errors = state.revalidate(&self.inner.validator);
        state.revision += 1;
        debug!(form = %self.inner.id, has_errors, "form context changed");
        Ok(())
    }

    pub(super) fn live_state(
        &self,
        context: &'static str,
    ) -> FormResult<RwLockWriteGuard<'_, FormState<C>>> {
        let state = write_lock(&self.inner.state, context)?;
        if !self.inner.is_live() {
            return Err(FormError::Unmounted);
        }
        Ok(state)
    }
}

fn warn_undeclared(id: FormId, keys: &[FieldKey], values: &FormValues) {
    for key in values.keys().filter(|key| !keys.contains(key)) {
        warn!(form = %id, field = %key, "ignoring initial value for undeclared field");
    }
}

pub(super) fn transition_submit_state<C>(
    state: &mut FormState<C>,
    next: SubmitState,
) -> FormResult<()> {
    let current = state.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Submitting)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Failed)
            | (SubmitState::Succeeded, SubmitState::Submitting)
            | (SubmitState::Failed, SubmitState::Submitting)
            // late completion of an overlapping submit
            | (SubmitState::Succeeded, SubmitState::Failed)
            | (SubmitState::Failed, SubmitState::Succeeded)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.submit_state = next;
    Ok(())
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
