use std::sync::Arc;

use chores_client::ChoresApi;
use chores_common::pin::{Pin, PinPush};
use chores_common::{Child, ChildId, Chore, ChoreId, Frequency};
use chores_proto::{ChildUpdate, ChoreUpdate, HistoryQuery, DEFAULT_HISTORY_DAYS};
use tokio::sync::RwLock;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::error::{AppError, Result};
use crate::guard::{Action, InFlight, InFlightGuard};
use crate::modal::{ModalError, ModalHost};
use crate::state::{AddChoreForm, AppState, Notice, ParentTab, PinPad, View};

const INCORRECT_PIN: &str = "Incorrect PIN";
const SET_PIN_FAILED: &str = "Failed to set PIN";
const RENAME_PROMPT: &str = "Enter new name";
const NEW_CHILD_PROMPT: &str = "Enter child's name";

/// What a digit typed on the PIN pad led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinOutcome {
    /// Stored; waiting for more digits.
    Pending,
    /// Not a digit, or a submission is already under way.
    Ignored,
    Authenticated,
    /// Wrong PIN or PIN setup refused; the pad shows why.
    Rejected,
    /// The user went home before the server answered; nothing changed.
    Discarded,
}

/// Owns the application state and runs every user action against the API.
///
/// Cheap to clone; clones share state, so a frontend can run a flow on one
/// task while another resolves the modals it raises.
#[derive(Clone)]
pub struct AppController {
    api: Arc<dyn ChoresApi>,
    state: Arc<RwLock<AppState>>,
    modals: ModalHost,
    in_flight: InFlight,
}

impl AppController {
    pub fn new(api: Arc<dyn ChoresApi>) -> Self {
        Self::with_report_days(api, DEFAULT_HISTORY_DAYS)
    }

    pub fn with_report_days(api: Arc<dyn ChoresApi>, report_days: u32) -> Self {
        Self {
            api,
            state: Arc::new(RwLock::new(AppState::new(report_days))),
            modals: ModalHost::new(),
            in_flight: InFlight::default(),
        }
    }

    pub fn modals(&self) -> &ModalHost {
        &self.modals
    }

    /// A copy of the current state for rendering.
    pub async fn snapshot(&self) -> AppState {
        self.state.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&*self.state.read().await)
    }

    pub async fn take_notice(&self) -> Option<Notice> {
        self.state.write().await.notice.take()
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.in_flight.is_active(action)
    }

    fn begin(&self, action: Action) -> Result<InFlightGuard> {
        self.in_flight.try_begin(action).ok_or_else(|| {
            warn!("Ignoring repeated request while busy: {}", action);
            AppError::Busy(action)
        })
    }

    async fn require_parent(&self) -> Result<()> {
        if self.state.read().await.is_authenticated {
            Ok(())
        } else {
            Err(AppError::NotAuthenticated)
        }
    }

    async fn editing_child_id(&self) -> Result<ChildId> {
        self.state.read().await.editing_child.as_ref().map(|c| c.id).ok_or(AppError::NoChildBeingEdited)
    }

    async fn notify(&self, notice: Notice) {
        self.state.write().await.notice = Some(notice);
    }

    /// Prompt, folding a superseded prompt into a cancel.
    async fn ask(&self, title: &str, default_value: &str) -> Option<String> {
        match self.modals.prompt(title, default_value).await {
            Ok(answer) => answer,
            Err(ModalError::Superseded) => None,
        }
    }

    async fn ask_confirm(&self, title: &str, message: String) -> bool {
        match self.modals.confirm(title, message).await {
            Ok(answer) => answer,
            Err(ModalError::Superseded) => false,
        }
    }

    // Navigation

    /// Check whether a PIN exists yet, then load the children.
    pub async fn init(&self) -> Result<()> {
        let pin = self.api.pin_exists().await?;
        self.state.write().await.needs_setup = !pin.exists;
        if !pin.exists {
            info!("No parent PIN configured; first entry will set it");
        }
        self.load_children().await
    }

    pub async fn load_children(&self) -> Result<()> {
        let children = self.api.get_children().await?;
        debug!("Loaded {} children", children.len());
        self.state.write().await.children = children;
        Ok(())
    }

    /// Back to the home view, dropping authentication and per-view data.
    pub async fn go_home(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.session = state.session.wrapping_add(1);
            state.view = View::Home;
            state.selected_child = None;
            state.chores.clear();
            state.is_authenticated = false;
            state.pin_pad = PinPad::default();
            state.editing_child = None;
            state.editing_chores.clear();
            state.add_chore = AddChoreForm::default();
            state.settings.clear();
        }
        debug!("Switched to home view");
        self.load_children().await
    }

    pub async fn logout(&self) -> Result<()> {
        self.state.write().await.is_authenticated = false;
        info!("Parent logged out");
        self.go_home().await
    }

    /// Open a child's chore list. Only valid from the home view; the view
    /// changes only once the chores are fetched.
    pub async fn select_child(&self, child: &Child) -> Result<()> {
        let from = self.state.read().await.view;
        if from != View::Home {
            return Err(AppError::InvalidTransition { action: "select a child", from });
        }

        let _guard = self.begin(Action::SelectChild(child.id))?;
        let chores = self.api.get_chores(child.id).await?;

        let mut state = self.state.write().await;
        state.selected_child = Some(child.clone());
        state.chores = chores;
        state.view = View::Child;
        debug!("Switched to child view for {}", child.id);
        Ok(())
    }

    pub async fn set_parent_tab(&self, tab: ParentTab) -> Result<()> {
        self.require_parent().await?;
        self.state.write().await.parent_tab = tab;
        Ok(())
    }

    // Kid view

    /// Mark a chore done. Completed chores are left alone; the local copy is
    /// only updated once the server reports success. Returns whether it was
    /// newly completed.
    pub async fn toggle_chore(&self, chore_id: ChoreId) -> Result<bool> {
        let completed = self
            .read(|state| state.chores.iter().find(|c| c.id == chore_id).map(|c| c.completed))
            .await
            .ok_or(AppError::ChoreNotLoaded(chore_id))?;
        if completed {
            debug!("Chore {} already completed", chore_id);
            return Ok(false);
        }

        let _guard = self.begin(Action::ToggleChore(chore_id))?;
        let result = self.api.complete_chore(chore_id).await?;
        if !result.success {
            return Ok(false);
        }

        let mut state = self.state.write().await;
        if let Some(chore) = state.chores.iter_mut().find(|c| c.id == chore_id) {
            chore.completed = true;
            chore.completed_at = result.completed_at;
        }
        info!("Chore {} completed", chore_id);
        Ok(true)
    }

    // PIN pad

    pub async fn open_pin_pad(&self) {
        let mut state = self.state.write().await;
        state.pin_pad = PinPad { visible: true, ..PinPad::default() };
    }

    pub async fn close_pin_pad(&self) {
        self.state.write().await.pin_pad = PinPad::default();
    }

    /// Remove the last digit. False when the pad was empty.
    pub async fn backspace_pin(&self) -> bool {
        self.state.write().await.pin_pad.input.pop()
    }

    /// Feed one digit to the PIN pad. The fourth digit submits: it sets the
    /// PIN on first use, otherwise verifies it. The buffer is cleared after
    /// every submission, whatever the result.
    pub async fn enter_pin(&self, digit: char) -> Result<PinOutcome> {
        let (pin, needs_setup, session) = {
            let mut state = self.state.write().await;
            match state.pin_pad.input.push(digit) {
                PinPush::Ignored => return Ok(PinOutcome::Ignored),
                PinPush::Accepted => {
                    state.pin_pad.error = None;
                    return Ok(PinOutcome::Pending);
                }
                PinPush::Completed => {
                    state.pin_pad.error = None;
                    (state.pin_pad.input.to_pin(), state.needs_setup, state.session)
                }
            }
        };

        let outcome = if needs_setup {
            self.submit_new_pin(&pin, session).await
        } else {
            self.submit_pin(&pin, session).await
        };

        if outcome.is_err() {
            self.state.write().await.pin_pad.input.clear();
        }
        outcome
    }

    async fn submit_new_pin(&self, pin: &Pin, session: u64) -> Result<PinOutcome> {
        let response = self.api.set_pin(pin, None).await?;

        let mut state = self.state.write().await;
        if state.session != session {
            if response.ok {
                state.needs_setup = false;
            }
            debug!("Session ended while the PIN was being set");
            return Ok(PinOutcome::Discarded);
        }
        state.pin_pad.input.clear();
        if response.ok {
            state.needs_setup = false;
            state.is_authenticated = true;
            state.pin_pad.visible = false;
            state.view = View::Parent;
            info!("Parent PIN created");
            Ok(PinOutcome::Authenticated)
        } else {
            let message = response.data.error.unwrap_or_else(|| SET_PIN_FAILED.to_string());
            warn!("PIN setup rejected: {}", message);
            state.pin_pad.error = Some(message);
            Ok(PinOutcome::Rejected)
        }
    }

    async fn submit_pin(&self, pin: &Pin, session: u64) -> Result<PinOutcome> {
        let response = self.api.verify_pin(pin).await?;

        let mut state = self.state.write().await;
        if state.session != session {
            debug!("Session ended while the PIN was being verified");
            return Ok(PinOutcome::Discarded);
        }
        state.pin_pad.input.clear();
        if response.is_valid() {
            state.is_authenticated = true;
            state.pin_pad.visible = false;
            state.view = View::Parent;
            info!("Parent authenticated");
            Ok(PinOutcome::Authenticated)
        } else {
            warn!("Incorrect parent PIN entered");
            state.pin_pad.error = Some(INCORRECT_PIN.to_string());
            Ok(PinOutcome::Rejected)
        }
    }

    // Parent: children

    /// Prompt for a name and create a child. Returns whether one was created.
    pub async fn add_child(&self) -> Result<bool> {
        self.require_parent().await?;
        let _guard = self.begin(Action::AddChild)?;

        let Some(name) = self.ask(NEW_CHILD_PROMPT, "").await else {
            return Ok(false);
        };
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }

        let child = self.api.create_child(name).await?;
        info!("Added child {}", child.id);
        self.load_children().await?;
        Ok(true)
    }

    /// Prompt for a new name. Empty or unchanged answers send nothing.
    pub async fn rename_child(&self, child: &Child) -> Result<bool> {
        self.require_parent().await?;
        let _guard = self.begin(Action::RenameChild(child.id))?;

        let Some(name) = self.ask(RENAME_PROMPT, &child.name).await else {
            return Ok(false);
        };
        let name = name.trim();
        if name.is_empty() || name == child.name {
            debug!("Rename of child {} left unchanged", child.id);
            return Ok(false);
        }

        let updated = self.api.update_child(child.id, &ChildUpdate::rename(name)).await?;
        info!("Renamed child {}", child.id);
        {
            let mut state = self.state.write().await;
            if let Some(editing) = state.editing_child.as_mut().filter(|c| c.id == child.id) {
                editing.name = updated.name;
            }
        }
        self.load_children().await?;
        Ok(true)
    }

    pub async fn remove_child(&self, child: &Child) -> Result<bool> {
        self.require_parent().await?;
        let _guard = self.begin(Action::RemoveChild(child.id))?;

        let message = format!("{} and all of their chores will be removed.", child.name);
        if !self.ask_confirm("Remove this child?", message).await {
            return Ok(false);
        }

        self.api.delete_child(child.id).await?;
        info!("Removed child {}", child.id);
        {
            let mut state = self.state.write().await;
            if state.editing_child.as_ref().is_some_and(|c| c.id == child.id) {
                state.editing_child = None;
                state.editing_chores.clear();
                state.add_chore = AddChoreForm::default();
            }
        }
        self.load_children().await?;
        Ok(true)
    }

    /// Load a child's chores into the parent editor.
    pub async fn edit_child_chores(&self, child: &Child) -> Result<()> {
        self.require_parent().await?;
        let _guard = self.begin(Action::EditChildChores(child.id))?;

        let chores = self.api.get_chores(child.id).await?;
        let mut state = self.state.write().await;
        state.editing_child = Some(child.clone());
        state.editing_chores = chores;
        Ok(())
    }

    async fn refresh_editing_chores(&self, child_id: ChildId) -> Result<()> {
        let chores = self.api.get_chores(child_id).await?;
        let mut state = self.state.write().await;
        // The editor may have moved to another child while the request was out.
        if state.editing_child.as_ref().is_some_and(|c| c.id == child_id) {
            state.editing_chores = chores;
        }
        Ok(())
    }

    // Parent: chores

    /// Show an empty add-chore form for the child being edited.
    pub async fn open_add_chore(&self) -> Result<()> {
        self.require_parent().await?;
        self.editing_child_id().await?;
        self.state.write().await.add_chore = AddChoreForm { visible: true, ..AddChoreForm::default() };
        Ok(())
    }

    pub async fn set_add_chore_title(&self, title: impl Into<String>) {
        self.state.write().await.add_chore.title = title.into();
    }

    pub async fn set_add_chore_frequency(&self, frequency: Option<Frequency>) {
        self.state.write().await.add_chore.frequency = frequency;
    }

    pub async fn cancel_add_chore(&self) {
        self.state.write().await.add_chore = AddChoreForm::default();
    }

    /// Create the chore in the add-chore form. A blank title or missing
    /// frequency leaves the form open and sends nothing.
    pub async fn confirm_add_chore(&self) -> Result<bool> {
        self.require_parent().await?;
        let child_id = self.editing_child_id().await?;

        let form = self.read(|state| state.add_chore.clone()).await;
        let title = form.title.trim();
        let Some(frequency) = form.frequency.filter(|_| !title.is_empty()) else {
            debug!("Add chore form incomplete");
            return Ok(false);
        };

        let _guard = self.begin(Action::ConfirmAddChore)?;
        let chore = self.api.create_chore(child_id, title, frequency).await?;
        info!("Added {} chore {} for child {}", frequency, chore.id, child_id);

        self.refresh_editing_chores(child_id).await?;
        self.state.write().await.add_chore = AddChoreForm::default();
        Ok(true)
    }

    pub async fn rename_chore(&self, chore: &Chore) -> Result<bool> {
        self.require_parent().await?;
        let child_id = self.editing_child_id().await?;
        let _guard = self.begin(Action::RenameChore(chore.id))?;

        let Some(title) = self.ask(RENAME_PROMPT, &chore.title).await else {
            return Ok(false);
        };
        let title = title.trim();
        if title.is_empty() || title == chore.title {
            debug!("Rename of chore {} left unchanged", chore.id);
            return Ok(false);
        }

        self.api.update_chore(chore.id, &ChoreUpdate::retitle(title)).await?;
        info!("Renamed chore {}", chore.id);
        self.refresh_editing_chores(child_id).await?;
        Ok(true)
    }

    pub async fn delete_chore(&self, chore: &Chore) -> Result<bool> {
        self.require_parent().await?;
        let child_id = self.editing_child_id().await?;
        let _guard = self.begin(Action::DeleteChore(chore.id))?;

        let message = format!("The chore \"{}\" will be removed.", chore.title);
        if !self.ask_confirm("Delete this chore?", message).await {
            return Ok(false);
        }

        self.api.delete_chore(chore.id).await?;
        info!("Deleted chore {}", chore.id);
        self.refresh_editing_chores(child_id).await?;
        Ok(true)
    }

    /// Parent undo of a completion in the current period.
    pub async fn uncomplete_chore(&self, chore: &Chore) -> Result<()> {
        self.require_parent().await?;
        let child_id = self.editing_child_id().await?;
        let _guard = self.begin(Action::UncompleteChore(chore.id))?;

        self.api.uncomplete_chore(chore.id).await?;
        info!("Undid completion of chore {}", chore.id);
        self.refresh_editing_chores(child_id).await
    }

    // Parent: report

    /// Set the report window. Zero is refused and leaves the window unchanged.
    pub async fn set_report_days(&self, days: u32) -> bool {
        if days == 0 {
            warn!("Ignoring report window of 0 days");
            return false;
        }
        self.state.write().await.report_days = days;
        true
    }

    /// Replace the report with the server's history for `report_days`.
    pub async fn load_report(&self) -> Result<()> {
        self.require_parent().await?;
        let _guard = self.begin(Action::LoadReport)?;

        let days = self.read(|state| state.report_days).await;
        let response = self.api.get_history(&HistoryQuery::days(days)).await?;
        debug!("Loaded {} report days", response.history.len());
        self.state.write().await.report = response.history;
        Ok(())
    }

    // Parent: settings

    pub async fn set_current_pin_input(&self, value: impl Into<String>) {
        self.state.write().await.settings.current_pin = Zeroizing::new(value.into());
    }

    pub async fn set_new_pin_input(&self, value: impl Into<String>) {
        self.state.write().await.settings.new_pin = Zeroizing::new(value.into());
    }

    /// Change the PIN from the settings inputs. The outcome is reported as a
    /// notice; the inputs are cleared only when the server accepts.
    pub async fn change_pin(&self) -> Result<bool> {
        self.require_parent().await?;
        let _guard = self.begin(Action::ChangePin)?;

        let (current, new) = self
            .read(|state| {
                (Pin::new(state.settings.current_pin.as_str()), Pin::new(state.settings.new_pin.as_str()))
            })
            .await;

        if current.is_empty() || new.is_empty() {
            self.notify(Notice::error("Please enter both current and new PIN")).await;
            return Ok(false);
        }
        if new.check_new().is_err() {
            self.notify(Notice::error("New PIN must be at least 4 digits")).await;
            return Ok(false);
        }

        let response = self.api.set_pin(&new, Some(&current)).await?;
        let mut state = self.state.write().await;
        if response.ok {
            state.settings.clear();
            state.notice = Some(Notice::info("PIN updated successfully"));
            info!("Parent PIN changed");
            Ok(true)
        } else {
            let message = response.data.error.unwrap_or_else(|| "Failed to update PIN".to_string());
            warn!("PIN change rejected: {}", message);
            state.notice = Some(Notice::error(message));
            Ok(false)
        }
    }
}
