pub use crate::form::{
    FieldBinding, FieldKey, FormController, FormError, FormModel, FormResult, FormSnapshot,
    FormValues, ObjectValidator, SubmitAttempt, SubmitOptions, SubmitOutcome, Validation,
};
