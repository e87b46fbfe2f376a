use std::fmt::{Debug, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};

use futures::future::{BoxFuture, FutureExt};
use tracing::{debug, warn};

use super::controller::{
    FormController, FormInner, FormResult, SubmitState, transition_submit_state, write_lock,
};
use super::values::FormValues;
use crate::id::{FormId, SubmitToken};

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct SubmitOptions {
    /// Drop submit triggers that arrive while a previous submit is still pending.
    pub prevent_concurrent: bool,
}

/// How a started submit settled.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitOutcome {
    Succeeded,
    Failed,
    /// The handler settled after the form was unmounted; nothing was written back.
    Detached,
}

/// Result of one submit trigger.
#[must_use = "a started submit only settles once its task is awaited or spawned"]
#[derive(Debug)]
pub enum SubmitAttempt {
    /// Suppressed by [`SubmitOptions::prevent_concurrent`].
    Dropped,
    /// The form was invalid; the handler did not run.
    Rejected(SubmitToken),
    /// The handler ran. The task settles the submit state once its future completes.
    Started(SubmitTask),
}

impl SubmitAttempt {
    pub fn is_started(&self) -> bool {
        matches!(self, SubmitAttempt::Started(_))
    }

    pub fn token(&self) -> Option<SubmitToken> {
        match self {
            SubmitAttempt::Rejected(token) => Some(*token),
            _ => None,
        }
    }

    pub fn into_task(self) -> Option<SubmitTask> {
        match self {
            SubmitAttempt::Started(task) => Some(task),
            _ => None,
        }
    }
}

/// Completion of a started submit. The host drives it on whatever executor it runs.
///
/// Dropping the task before the handler settles records the submit as failed.
pub struct SubmitTask {
    future: BoxFuture<'static, FormResult<SubmitOutcome>>,
}

impl Future for SubmitTask {
    type Output = FormResult<SubmitOutcome>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.future.poll_unpin(cx)
    }
}

impl Debug for SubmitTask {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmitTask").finish_non_exhaustive()
    }
}

impl<C> FormController<C>
where
    C: Send + Sync + 'static,
{
    /// Runs one submit trigger.
    ///
    /// Every field is marked touched. An invalid form gets a fresh submit token and the
    /// handler is skipped; a valid one moves to `Submitting` and the handler is invoked
    /// with the current values before this returns.
    pub fn submit<H, Fut, T, Er>(
        &self,
        handler: &H,
        options: SubmitOptions,
    ) -> FormResult<SubmitAttempt>
    where
        H: Fn(FormValues) -> Fut + ?Sized,
        Fut: Future<Output = Result<T, Er>> + Send + 'static,
    {
        let values = {
            let mut state = self.live_state("preparing submit")?;
            if options.prevent_concurrent && state.submit_state == SubmitState::Submitting {
                debug!(form = %self.inner.id, "dropping submit while another is pending");
                return Ok(SubmitAttempt::Dropped);
            }

            state.touch_all();
            if state.has_errors() {
                let token = SubmitToken::next();
                state.submit_token = Some(token);
                state.revision += 1;
                debug!(form = %self.inner.id, token = %token, "submit rejected by validation");
                return Ok(SubmitAttempt::Rejected(token));
            }

            transition_submit_state(&mut state, SubmitState::Submitting)?;
            state.revision += 1;
            debug!(form = %self.inner.id, "submit started");
            state.values()
        };

        let pending = handler(values);
        let completion = Completion {
            form: Arc::downgrade(&self.inner),
            form_id: self.inner.id,
            armed: true,
        };
        let future = async move {
            let succeeded = pending.await.is_ok();
            completion.settle(succeeded)
        };
        Ok(SubmitAttempt::Started(SubmitTask {
            future: future.boxed(),
        }))
    }

    /// Binds `handler` into a submit trigger, for hosts that wire a submit event once.
    pub fn on_submit<H, Fut, T, Er>(
        &self,
        handler: H,
        options: SubmitOptions,
    ) -> impl Fn() -> FormResult<SubmitAttempt> + Send + Sync + 'static + use<C, H, Fut, T, Er>
    where
        H: Fn(FormValues) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, Er>> + Send + 'static,
        T: 'static,
        Er: 'static,
    {
        let form = self.clone();
        move || form.submit(&handler, options)
    }
}

/// Writes the outcome of one started submit back to its form, exactly once.
struct Completion<C> {
    form: Weak<FormInner<C>>,
    form_id: FormId,
    armed: bool,
}

impl<C> Completion<C> {
    fn settle(mut self, succeeded: bool) -> FormResult<SubmitOutcome> {
        self.armed = false;
        settle(&self.form, self.form_id, succeeded)
    }
}

impl<C> Drop for Completion<C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        debug!(form = %self.form_id, "submit task dropped before the handler settled");
        if let Err(error) = settle(&self.form, self.form_id, false) {
            warn!(form = %self.form_id, %error, "could not settle abandoned submit");
        }
    }
}

fn settle<C>(
    form: &Weak<FormInner<C>>,
    form_id: FormId,
    succeeded: bool,
) -> FormResult<SubmitOutcome> {
    let Some(inner) = form.upgrade() else {
        debug!(form = %form_id, "submit settled after the form was dropped");
        return Ok(SubmitOutcome::Detached);
    };
    let mut state = write_lock(&inner.state, "completing submit")?;
    if !inner.is_live() {
        debug!(form = %form_id, succeeded, "submit settled after unmount");
        return Ok(SubmitOutcome::Detached);
    }

    let (next, outcome) = if succeeded {
        (SubmitState::Succeeded, SubmitOutcome::Succeeded)
    } else {
        (SubmitState::Failed, SubmitOutcome::Failed)
    };
    transition_submit_state(&mut state, next)?;
    state.revision += 1;
    debug!(form = %form_id, ?outcome, "submit settled");
    Ok(outcome)
}
