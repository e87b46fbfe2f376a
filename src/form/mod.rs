mod binding;
mod controller;
mod model;
mod submit;
mod validation;
mod values;


pub use binding::{
    CheckboxBinding, CheckboxInput, FieldBinding, FieldInput, FieldSnapshot, FormSnapshot,
};
pub use controller::{FieldRecord, FormController, FormError, FormResult, SubmitState};
pub use formstate_derive::FormModel;
pub use model::FormModel;
pub use submit::{SubmitAttempt, SubmitOptions, SubmitOutcome, SubmitTask};
pub use validation::{
    CanonicalValidator, FieldValidator, FormValidator, ObjectValidator, Validation, normalize,
};
pub use values::{FieldErrors, FieldKey, FieldMap, FormErrors, FormValues};

pub use crate::id::{FormId, SubmitToken};
