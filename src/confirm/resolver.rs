//! One-shot answer delivery for confirmation prompts

use crate::error::ConfirmError;
use crate::queue::ItemId;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Sending half of a prompt's answer
///
/// Only the first `resolve` delivers anything; later calls return `false`.
#[derive(Debug)]
pub struct Resolver {
    tx: Option<oneshot::Sender<bool>>,
}

impl Resolver {
    /// Create a resolver and the future its caller awaits
    pub fn channel(id: ItemId) -> (Self, PendingConfirm) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: Some(tx) }, PendingConfirm { id, rx })
    }

    /// Deliver the answer
    ///
    /// Returns `true` if this call resolved the prompt. A caller that stopped
    /// waiting still counts as resolved.
    pub fn resolve(&mut self, answer: bool) -> bool {
        match self.tx.take() {
            Some(tx) => {
                let _ = tx.send(answer);
                true
            }
            None => false,
        }
    }

    /// Whether the answer has already been delivered
    pub fn is_resolved(&self) -> bool {
        self.tx.is_none()
    }
}

/// The user's answer to a prompt, once they give it
///
/// Resolves to `Ok(true)` for the affirmative action, `Ok(false)` for the
/// negative action or dismissal, and `Err(ConfirmError::Abandoned)` if the
/// engine is torn down first.
#[derive(Debug)]
#[must_use = "the answer is only observed by awaiting the PendingConfirm"]
pub struct PendingConfirm {
    id: ItemId,
    rx: oneshot::Receiver<bool>,
}

impl PendingConfirm {
    /// Id of the prompt, usable with `Confirmer::respond`
    pub fn id(&self) -> ItemId {
        self.id
    }
}

impl Future for PendingConfirm {
    type Output = Result<bool, ConfirmError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|answer| answer.map_err(|_| ConfirmError::Abandoned))
    }
}
