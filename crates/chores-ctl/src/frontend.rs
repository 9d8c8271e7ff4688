//! Answers the controller's Prompt and Confirm modals on the terminal.
//!
//! A flow runs unchanged while this loop watches the modal host; whenever a
//! modal opens it is answered from a preset value or from stdin.

use std::future::Future;
use std::io::{self, Write};

use anyhow::{Context, Result};
use chores_app::modal::{ConfirmView, PromptView};
use chores_app::ModalHost;
use tracing::debug;

/// Preset answers, usually from command-line flags.
#[derive(Debug, Default)]
pub struct Answers {
    text: Option<String>,
    assume_yes: bool,
}

impl Answers {
    pub fn text(text: Option<String>) -> Self {
        Self { text, assume_yes: false }
    }

    pub fn assume_yes(assume_yes: bool) -> Self {
        Self { text: None, assume_yes }
    }

    async fn prompt(&mut self, view: &PromptView) -> Result<Option<String>> {
        if let Some(text) = self.text.take() {
            return Ok(Some(text));
        }

        let label = if view.value.is_empty() {
            format!("{}: ", view.title)
        } else {
            format!("{} [{}]: ", view.title, view.value)
        };

        // Empty input keeps the default, end of input cancels.
        Ok(read_line(label).await?.map(|line| {
            if line.trim().is_empty() {
                view.value.clone()
            } else {
                line
            }
        }))
    }

    async fn confirm(&mut self, view: &ConfirmView) -> Result<bool> {
        if self.assume_yes {
            return Ok(true);
        }

        println!("{}", view.title);
        println!("{}", view.message);
        let answer = read_line("Continue? [y/N]: ".to_string()).await?;
        Ok(matches!(answer.as_deref().map(str::trim), Some("y" | "Y" | "yes")))
    }
}

/// Read one line from stdin without blocking the runtime. `None` at end of input.
pub async fn read_line(label: String) -> Result<Option<String>> {
    tokio::task::spawn_blocking(move || -> Result<Option<String>> {
        print!("{label}");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(&['\r', '\n'][..]).to_string()))
    })
    .await
    .context("Input task failed")?
}

/// Poll `flow` to completion, answering any modal it opens along the way.
pub async fn drive<F, T>(modals: &ModalHost, mut answers: Answers, flow: F) -> Result<T>
where
    F: Future<Output = chores_app::Result<T>>,
{
    let mut updates = modals.subscribe();
    tokio::pin!(flow);

    loop {
        tokio::select! {
            result = &mut flow => return Ok(result?),
            changed = updates.changed() => {
                if changed.is_err() {
                    return Ok(flow.await?);
                }

                let snapshot = updates.borrow_and_update().clone();
                if let Some(view) = snapshot.prompt {
                    debug!("Answering prompt '{}'", view.title);
                    match answers.prompt(&view).await? {
                        Some(value) => {
                            modals.set_prompt_value(value);
                            modals.confirm_prompt();
                        }
                        None => {
                            modals.cancel_prompt();
                        }
                    }
                }
                if let Some(view) = snapshot.confirm {
                    debug!("Answering confirm '{}'", view.title);
                    if answers.confirm(&view).await? {
                        modals.do_confirm();
                    } else {
                        modals.cancel_confirm();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chores_app::AppController;
    use chores_client::{ChoresApi, MemoryBackend};
    use chores_common::pin::Pin;

    use super::*;

    async fn parent_controller() -> (Arc<MemoryBackend>, AppController) {
        let backend = Arc::new(MemoryBackend::new().with_demo_data());
        backend.set_pin(&Pin::new("1234"), None).await.unwrap();
        let controller = AppController::new(backend.clone());
        controller.init().await.unwrap();
        for digit in "1234".chars() {
            controller.enter_pin(digit).await.unwrap();
        }
        (backend, controller)
    }

    #[tokio::test]
    async fn test_drive_answers_prompt_from_preset() {
        let (_backend, controller) = parent_controller().await;

        let added = drive(
            controller.modals(),
            Answers::text(Some("Zoe".to_string())),
            controller.add_child(),
        )
        .await
        .unwrap();

        assert!(added);
        assert!(controller.read(|s| s.children.iter().any(|c| c.name == "Zoe")).await);
    }

    #[tokio::test]
    async fn test_drive_answers_confirm_with_assume_yes() {
        let (backend, controller) = parent_controller().await;
        let child = controller.read(|s| s.children[1].clone()).await;

        let removed =
            drive(controller.modals(), Answers::assume_yes(true), controller.remove_child(&child))
                .await
                .unwrap();

        assert!(removed);
        assert_eq!(backend.count_requests(&format!("DELETE /api/children/{}", child.id)).await, 1);
    }

    #[tokio::test]
    async fn test_drive_propagates_flow_errors() {
        let backend = Arc::new(MemoryBackend::new());
        let controller = AppController::new(backend);

        let err = drive(controller.modals(), Answers::default(), controller.load_report())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Parent PIN required"));
    }
}
