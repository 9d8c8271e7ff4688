//! Awaitable Prompt and Confirm modals.
//!
//! A flow calls [`ModalHost::prompt`] or [`ModalHost::confirm`] and is suspended
//! until the rendering layer resolves the modal. At most one of each kind is
//! outstanding; a newer request cancels the older one, whose caller gets
//! [`ModalError::Superseded`].

use std::sync::{Arc, Mutex, PoisonError};

use thiserror::Error;
use tokio::sync::{oneshot, watch};
use tracing::{debug, warn};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptView {
    pub title: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmView {
    pub title: String,
    pub message: String,
}

/// What the rendering layer should currently show.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModalSnapshot {
    pub prompt: Option<PromptView>,
    pub confirm: Option<ConfirmView>,
}

impl ModalSnapshot {
    pub fn show_prompt(&self) -> bool {
        self.prompt.is_some()
    }

    pub fn show_confirm(&self) -> bool {
        self.confirm.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ModalError {
    #[error("Modal was replaced by a newer request")]
    Superseded,
}

struct Pending<V, T> {
    view: V,
    reply: oneshot::Sender<T>,
}

#[derive(Default)]
struct Slots {
    prompt: Option<Pending<PromptView, Option<String>>>,
    confirm: Option<Pending<ConfirmView, bool>>,
}

impl Slots {
    fn snapshot(&self) -> ModalSnapshot {
        ModalSnapshot {
            prompt: self.prompt.as_ref().map(|p| p.view.clone()),
            confirm: self.confirm.as_ref().map(|c| c.view.clone()),
        }
    }
}

struct Inner {
    slots: Mutex<Slots>,
    updates: watch::Sender<ModalSnapshot>,
}

#[derive(Clone)]
pub struct ModalHost {
    inner: Arc<Inner>,
}

impl Default for ModalHost {
    fn default() -> Self {
        Self::new()
    }
}

impl ModalHost {
    pub fn new() -> Self {
        let (updates, _) = watch::channel(ModalSnapshot::default());
        Self { inner: Arc::new(Inner { slots: Mutex::new(Slots::default()), updates }) }
    }

    /// Receiver that sees every change to the visible modals.
    pub fn subscribe(&self) -> watch::Receiver<ModalSnapshot> {
        self.inner.updates.subscribe()
    }

    pub fn snapshot(&self) -> ModalSnapshot {
        self.inner.updates.borrow().clone()
    }

    /// Run `f` on the slots and publish the result. The lock is never held across an await.
    fn update<R>(&self, f: impl FnOnce(&mut Slots) -> R) -> R {
        let mut slots = self.inner.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let result = f(&mut slots);
        self.inner.updates.send_replace(slots.snapshot());
        result
    }

    /// Ask for a line of text. `Ok(None)` means the user cancelled.
    pub async fn prompt(
        &self,
        title: impl Into<String>,
        default_value: impl Into<String>,
    ) -> Result<Option<String>, ModalError> {
        let (reply, answer) = oneshot::channel();
        let view = PromptView { title: title.into(), value: default_value.into() };
        debug!("Showing prompt '{}'", view.title);

        self.update(|slots| {
            if let Some(old) = slots.prompt.replace(Pending { view, reply }) {
                warn!("Prompt '{}' superseded before it was answered", old.view.title);
            }
        });

        answer.await.map_err(|_| ModalError::Superseded)
    }

    /// Update the text in the open prompt. Returns false when no prompt is open.
    pub fn set_prompt_value(&self, value: impl Into<String>) -> bool {
        let value = value.into();
        self.update(|slots| match slots.prompt.as_mut() {
            Some(pending) => {
                pending.view.value = value;
                true
            }
            None => false,
        })
    }

    /// Resolve the open prompt with its current value.
    pub fn confirm_prompt(&self) -> bool {
        self.resolve_prompt(true)
    }

    pub fn cancel_prompt(&self) -> bool {
        self.resolve_prompt(false)
    }

    fn resolve_prompt(&self, accept: bool) -> bool {
        let Some(pending) = self.update(|slots| slots.prompt.take()) else {
            return false;
        };
        let answer = accept.then_some(pending.view.value);
        // The caller may have stopped waiting; nothing to do then.
        let _ = pending.reply.send(answer);
        true
    }

    /// Ask a yes/no question. `Ok(false)` means the user cancelled.
    pub async fn confirm(
        &self,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<bool, ModalError> {
        let (reply, answer) = oneshot::channel();
        let view = ConfirmView { title: title.into(), message: message.into() };
        debug!("Showing confirm '{}'", view.title);

        self.update(|slots| {
            if let Some(old) = slots.confirm.replace(Pending { view, reply }) {
                warn!("Confirm '{}' superseded before it was answered", old.view.title);
            }
        });

        answer.await.map_err(|_| ModalError::Superseded)
    }

    pub fn do_confirm(&self) -> bool {
        self.resolve_confirm(true)
    }

    pub fn cancel_confirm(&self) -> bool {
        self.resolve_confirm(false)
    }

    fn resolve_confirm(&self, answer: bool) -> bool {
        let Some(pending) = self.update(|slots| slots.confirm.take()) else {
            return false;
        };
        let _ = pending.reply.send(answer);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_prompt_resolves_with_edited_value() {
        let host = ModalHost::new();
        let mut updates = host.subscribe();

        let flow = tokio::spawn({
            let host = host.clone();
            async move { host.prompt("Enter new name", "Ada").await }
        });

        updates.wait_for(|s| s.show_prompt()).await.unwrap();
        assert_eq!(host.snapshot().prompt.unwrap().value, "Ada");
        assert!(host.set_prompt_value("Ada Mae"));
        assert!(host.confirm_prompt());

        assert_eq!(flow.await.unwrap(), Ok(Some("Ada Mae".to_string())));
        assert!(!host.snapshot().show_prompt());
    }

    #[tokio::test]
    async fn test_cancelled_prompt_and_confirm() {
        let host = ModalHost::new();
        let mut updates = host.subscribe();

        let prompt = tokio::spawn({
            let host = host.clone();
            async move { host.prompt("Enter child's name", "").await }
        });
        let confirm = tokio::spawn({
            let host = host.clone();
            async move { host.confirm("Delete this chore?", "Gone for good").await }
        });

        updates.wait_for(|s| s.show_prompt() && s.show_confirm()).await.unwrap();
        assert!(host.cancel_prompt());
        assert!(host.cancel_confirm());

        assert_eq!(prompt.await.unwrap(), Ok(None));
        assert_eq!(confirm.await.unwrap(), Ok(false));
    }

    #[tokio::test]
    async fn test_second_prompt_supersedes_first() {
        let host = ModalHost::new();
        let mut updates = host.subscribe();

        let first = tokio::spawn({
            let host = host.clone();
            async move { host.prompt("First", "").await }
        });
        updates.wait_for(|s| s.prompt.as_ref().is_some_and(|p| p.title == "First")).await.unwrap();

        let second = tokio::spawn({
            let host = host.clone();
            async move { host.prompt("Second", "").await }
        });

        assert_eq!(first.await.unwrap(), Err(ModalError::Superseded));
        updates.wait_for(|s| s.prompt.as_ref().is_some_and(|p| p.title == "Second")).await.unwrap();

        host.set_prompt_value("answer");
        host.confirm_prompt();
        assert_eq!(second.await.unwrap(), Ok(Some("answer".to_string())));
    }

    #[test]
    fn test_resolving_without_open_modal_is_noop() {
        let host = ModalHost::new();
        assert!(!host.confirm_prompt());
        assert!(!host.cancel_prompt());
        assert!(!host.do_confirm());
        assert!(!host.set_prompt_value("x"));
    }
}
