//! Cooperative cancellation for in-flight resolutions

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Marker returned when a generation's token fired
///
/// Not an error: a cancelled generation simply produces nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cancelled;

impl Cancelled {
    /// Fail fast if `token` has fired
    pub fn check(token: &CancellationToken) -> Result<(), Cancelled> {
        if token.is_cancelled() {
            Err(Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Run one provider call as a cancellation-aware suspension point.
///
/// The token is checked before `call` is invoked, raced against the pending
/// future and checked again once it completes, so a fired token always wins.
pub async fn guarded<C, F>(token: &CancellationToken, call: C) -> Result<F::Output, Cancelled>
where
    C: FnOnce() -> F,
    F: Future,
{
    Cancelled::check(token)?;
    let pending = call();
    let output = tokio::select! {
        biased;
        () = token.cancelled() => return Err(Cancelled),
        output = pending => output,
    };
    Cancelled::check(token)?;
    Ok(output)
}
