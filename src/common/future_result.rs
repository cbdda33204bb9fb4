use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::PostingError;

/// `FutureResult` is a handle that makes it possible to wait for the completion
/// of an ongoing task.
///
/// Contrary to some `Future`, it does not need to be polled for the task to
/// progress. Dropping the `FutureResult` does not cancel the task being executed
/// either.
///
/// - In a sync context, you can call `FutureResult::wait()`. The function
///   does not rely on `block_on`.
/// - In an async context, you can call simply use `FutureResult` as a future.
pub struct FutureResult<T> {
    inner: Inner<T>,
}

enum Inner<T> {
    Ready(Option<crate::Result<T>>),
    Pending {
        receiver: oneshot::Receiver<crate::Result<T>>,
        error_msg_if_failure: &'static str,
    },
}

// The inner state is never pinned structurally.
impl<T> Unpin for FutureResult<T> {}

impl<T> From<PostingError> for FutureResult<T> {
    fn from(err: PostingError) -> Self {
        FutureResult::ready(Err(err))
    }
}

impl<T> FutureResult<T> {
    /// Wraps a result that is already known.
    pub(crate) fn ready(result: crate::Result<T>) -> Self {
        FutureResult { inner: Inner::Ready(Some(result)) }
    }

    pub(crate) fn create(
        error_msg_if_failure: &'static str,
    ) -> (Self, oneshot::Sender<crate::Result<T>>) {
        let (sender, receiver) = oneshot::channel();
        let inner = Inner::Pending { receiver, error_msg_if_failure };
        (FutureResult { inner }, sender)
    }

    /// Blocks until the scheduled result is available.
    pub fn wait(self) -> crate::Result<T> {
        match self.inner {
            Inner::Ready(result) => result.unwrap_or_else(|| {
                Err(PostingError::SystemError("FutureResult was already consumed".to_string()))
            }),
            Inner::Pending { receiver, error_msg_if_failure } => receiver
                .recv()
                .unwrap_or_else(|_| Err(PostingError::ErrorInThread(error_msg_if_failure.to_string()))),
        }
    }
}

impl<T> Future for FutureResult<T> {
    type Output = crate::Result<T>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Inner::Ready(result) => Poll::Ready(result.take().unwrap_or_else(|| {
                Err(PostingError::SystemError("FutureResult polled after completion".to_string()))
            })),
            Inner::Pending { receiver, error_msg_if_failure } => {
                let error_msg = *error_msg_if_failure;
                Pin::new(receiver).poll(cx).map(|recv_result| {
                    recv_result.unwrap_or_else(|_| Err(PostingError::ErrorInThread(error_msg.to_string())))
                })
            }
        }
    }
}
