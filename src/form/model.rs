use super::controller::{FormController, FormError, FormResult};
use super::validation::ObjectValidator;
use super::values::{FieldKey, FormValues};

/// A struct of string fields that maps onto a form.
///
/// Usually derived with `#[derive(FormModel)]`, which also generates a `<Model>Fields`
/// accessor returning each field's key.
pub trait FormModel: Sized {
    type Fields;

    fn fields() -> Self::Fields;

    /// Field keys in declaration order.
    fn keys() -> Vec<FieldKey>;

    fn to_values(&self) -> FormValues;

    /// Builds the model from a value map. Missing keys become empty strings.
    fn from_values(values: &FormValues) -> Self;
}

impl<C> FormController<C>
where
    C: Send + Sync + 'static,
{
    /// Creates a form for `M` initialised from `model`. Every field of `M` needs a validator.
    pub fn for_model<M>(validation: ObjectValidator<C>, model: &M, context: C) -> FormResult<Self>
    where
        M: FormModel,
    {
        for key in M::keys() {
            if !validation.keys().any(|declared| *declared == key) {
                return Err(FormError::MissingValidator(key));
            }
        }
        Self::new(validation, model.to_values(), context)
    }

    pub fn model<M>(&self) -> FormResult<M>
    where
        M: FormModel,
    {
        Ok(M::from_values(&self.values()?))
    }

    pub fn reinitialize_from<M>(&self, model: &M) -> FormResult<()>
    where
        M: FormModel,
    {
        self.reinitialize(model.to_values())
    }
}
