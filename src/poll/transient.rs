//! Treats refresh failures as transient `"retry"` samples.
//!
//! Status reads issued right after an order or create call often fail until
//! the remote system has propagated the new object. Wrapping the refresh
//! turns those failures into [`Sample::Retry`] so the wait keeps polling,
//! bounded only by its timeout. Errors that should stop the wait can be
//! singled out with [`retry_unless`].

use std::future::Future;

use tracing::debug;

use super::{Sample, StateRefresh};

/// Refresh adapter that swallows non-fatal errors.
#[derive(Clone, Debug)]
pub struct RetryOnError<R, P> {
    inner: R,
    is_fatal: P,
}

/// Retries after every refresh error.
pub fn retry_on_error<R>(inner: R) -> RetryOnError<R, fn(&R::Error) -> bool>
where
    R: StateRefresh,
{
    RetryOnError {
        inner,
        is_fatal: never_fatal::<R::Error>,
    }
}

/// Retries after refresh errors unless `is_fatal` flags them.
pub const fn retry_unless<R, P>(inner: R, is_fatal: P) -> RetryOnError<R, P>
where
    R: StateRefresh,
    P: FnMut(&R::Error) -> bool,
{
    RetryOnError { inner, is_fatal }
}

const fn never_fatal<E>(_error: &E) -> bool {
    false
}

impl<R, P> StateRefresh for RetryOnError<R, P>
where
    R: StateRefresh,
    P: FnMut(&R::Error) -> bool,
{
    type Object = R::Object;
    type Error = R::Error;

    fn refresh(&mut self) -> impl Future<Output = Result<Sample<Self::Object>, Self::Error>> {
        async move {
            match self.inner.refresh().await {
                Ok(sample) => Ok(sample),
                Err(err) if (self.is_fatal)(&err) => Err(err),
                Err(err) => {
                    debug!(error = %err, "treating status read failure as transient");
                    Ok(Sample::Retry {
                        reason: err.to_string(),
                    })
                }
            }
        }
    }
}
