//! Form state engine: per-field value, touched, pristine and error tracking with
//! revalidation on every change and guarded asynchronous submission.

pub mod form;
pub mod id;
pub mod prelude;
