//! Single-use completion sinks.
//!
//! A [`CompletionSink`] is consumed by [`CompletionSink::resolve`], so a
//! result can be delivered at most once; handlers own their sink and every
//! path through a handler ends by resolving it.

use std::fmt;
use std::sync::mpsc::{self, Receiver};

use tracing::debug;

use crate::AFFILIATE_TARGET;
use crate::error::AffiliateError;

type Callback<T> = Box<dyn FnOnce(Result<T, AffiliateError>) + Send>;

/// Receives the outcome of one operation.
pub struct CompletionSink<T> {
    callback: Callback<T>,
}

impl<T> CompletionSink<T> {
    /// Wraps a callback invoked with the outcome.
    pub fn new(callback: impl FnOnce(Result<T, AffiliateError>) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
        }
    }

    /// Delivers the outcome.
    pub fn resolve(self, result: Result<T, AffiliateError>) {
        (self.callback)(result);
    }

    /// Delivers a value.
    pub fn succeed(self, value: T) {
        self.resolve(Ok(value));
    }

    /// Delivers an error.
    pub fn fail(self, error: AffiliateError) {
        self.resolve(Err(error));
    }
}

impl<T: Send + 'static> CompletionSink<T> {
    /// Builds a sink whose outcome arrives on the returned receiver.
    ///
    /// # Example
    ///
    /// ```
    /// use affiliate_client::CompletionSink;
    ///
    /// let (sink, outcome) = CompletionSink::<u32>::channel();
    /// sink.succeed(3);
    /// assert_eq!(outcome.try_recv().ok(), Some(Ok(3)));
    /// ```
    #[must_use]
    pub fn channel() -> (Self, Receiver<Result<T, AffiliateError>>) {
        let (sender, receiver) = mpsc::channel();
        let sink = Self::new(move |result| {
            if sender.send(result).is_err() {
                debug!(target: AFFILIATE_TARGET, "completion receiver dropped");
            }
        });
        (sink, receiver)
    }
}

impl<T> fmt::Debug for CompletionSink<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("CompletionSink")
    }
}
