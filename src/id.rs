use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);
static SUBMIT_TOKEN_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

/// Identity of one mounted form instance. Only used for diagnostics.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "form-{}", self.0)
    }
}

/// Marker left behind by a submit attempt that was rejected because the form was invalid.
///
/// Every rejected attempt allocates a fresh token, so a consumer can tell a retried
/// invalid submit apart from the previous one even when the error set is unchanged.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubmitToken(u64);

impl SubmitToken {
    pub fn next() -> Self {
        Self(SUBMIT_TOKEN_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for SubmitToken {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "submit-{:016x}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_tokens_are_never_reused() {
        let tokens = (0..16).map(|_| SubmitToken::next()).collect::<Vec<_>>();
        assert!(tokens.windows(2).all(|pair| pair[0] != pair[1]));
        assert!(tokens.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn form_ids_differ_between_instances() {
        let first = FormId::next();
        let second = FormId::next();
        assert_ne!(first, second);
        assert!(first.to_string().starts_with("form-"));
    }
}
