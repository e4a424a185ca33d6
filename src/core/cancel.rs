//! Per-attempt cancellation scope: a deadline merged with an optional
//! external [`CancellationToken`].

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

use crate::core::error::{AbortOrigin, FeedError};

/// Bounds one request attempt.
///
/// The wrapped future is raced against three things: the deadline, the
/// caller's token and the scope's own token. Whichever fires first decides
/// the outcome; the losing futures (including the deadline timer) are
/// dropped right there, so nothing keeps ticking once `run` returns.
///
/// `finish` releases the scope and is safe to call any number of times;
/// `Drop` calls it as well.
#[derive(Debug)]
pub struct CancelScope {
    token: CancellationToken,
    external: Option<CancellationToken>,
    deadline: Option<Duration>,
    finished: bool,
}

impl CancelScope {
    /// A zero `deadline` means "no deadline".
    pub fn new(deadline: Duration, external: Option<&CancellationToken>) -> Self {
        let token = match external {
            Some(parent) => parent.child_token(),
            None => CancellationToken::new(),
        };
        Self {
            token,
            external: external.cloned(),
            deadline: (!deadline.is_zero()).then_some(deadline),
            finished: false,
        }
    }

    /// True once the caller's token has fired.
    pub fn externally_cancelled(&self) -> bool {
        self.external
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }

    /// Cancel from inside the crate.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Run `fut` under this scope.
    ///
    /// A scope whose external token already fired never polls `fut`.
    pub async fn run<F>(&self, fut: F) -> Result<F::Output, FeedError>
    where
        F: Future,
    {
        if self.token.is_cancelled() {
            return Err(self.abort_error());
        }

        let deadline = async {
            match self.deadline {
                Some(d) => tokio::time::sleep(d).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            () = self.token.cancelled() => Err(self.abort_error()),
            () = deadline => {
                self.token.cancel();
                Err(FeedError::Timeout)
            }
            out = fut => Ok(out),
        }
    }

    /// Release the scope. Returns `true` only for the call that actually did
    /// the cleanup.
    pub fn finish(&mut self) -> bool {
        if self.finished {
            return false;
        }
        self.finished = true;
        // Detach from the parent: a finished attempt must not be reported as
        // aborted if the caller cancels later.
        self.external = None;
        true
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn abort_error(&self) -> FeedError {
        if self.externally_cancelled() {
            FeedError::Aborted(AbortOrigin::External)
        } else {
            FeedError::Aborted(AbortOrigin::Internal)
        }
    }
}

impl Drop for CancelScope {
    fn drop(&mut self) {
        self.finish();
    }
}
