//! On-error-resume-next: run sources in order, moving on after completion
//! *or* error.
//!
//! ```text
//! resume_next(s0, s1, .., sk):
//!   s_i terminal (either kind) ─► subscribe s_{i+1}
//!   s_k terminal               ─► completed (a final error is swallowed)
//! ```

use super::chain::{run_chain, Advance};
use crate::disposable::Subscription;
use crate::observable::{Observable, Seq};
use crate::observer::Sink;
use crate::types::Notification;
use std::sync::Arc;

struct ResumeNext<T> {
    sources: Arc<[Seq<T>]>,
}

impl<T: Send + 'static> Observable<T> for ResumeNext<T> {
    fn subscribe_core(&self, sink: Arc<Sink<T>>) -> Subscription {
        let sources = Arc::clone(&self.sources);
        let mut index = 0;
        run_chain("on_error_resume_next", sink, move |_| match sources.get(index) {
            Some(next) => {
                index += 1;
                Advance::Subscribe(next.clone())
            }
            None => Advance::Finish(Notification::Completed),
        })
    }
}

impl<T: Send + 'static> Seq<T> {
    /// Runs the sources in order, continuing with the next one whether the
    /// previous one completed or failed. Always completes.
    #[must_use]
    pub fn on_error_resume_next<I>(sources: I) -> Self
    where
        I: IntoIterator<Item = Self>,
    {
        Self::new(ResumeNext {
            sources: sources.into_iter().collect(),
        })
    }

    /// Continues with `other` after this sequence ends either way.
    #[must_use]
    pub fn on_error_resume_next_with(&self, other: &Self) -> Self {
        Self::on_error_resume_next([self.clone(), other.clone()])
    }
}
