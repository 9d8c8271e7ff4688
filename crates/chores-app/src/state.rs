use std::fmt;

use chores_common::pin::PinBuffer;
use chores_common::{Child, Chore, Frequency, HistoryDay};
use chores_proto::DEFAULT_HISTORY_DAYS;
use zeroize::Zeroizing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    #[default]
    Home,
    Child,
    Parent,
}

impl fmt::Display for View {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            View::Home => "home",
            View::Child => "child",
            View::Parent => "parent",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentTab {
    #[default]
    Children,
    Report,
    Settings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// One-shot message for the user, replaced by the next one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Info, message: message.into() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { level: NoticeLevel::Error, message: message.into() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct PinPad {
    pub visible: bool,
    pub input: PinBuffer,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddChoreForm {
    pub visible: bool,
    pub title: String,
    /// Unset until the user picks one; submitting without it does nothing.
    pub frequency: Option<Frequency>,
}

/// PIN change inputs on the settings tab.
#[derive(Clone, Default)]
pub struct SettingsForm {
    pub current_pin: Zeroizing<String>,
    pub new_pin: Zeroizing<String>,
}

impl SettingsForm {
    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Debug for SettingsForm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SettingsForm")
            .field("current_pin_len", &self.current_pin.len())
            .field("new_pin_len", &self.new_pin.len())
            .finish()
    }
}

/// Everything the rendering layer reads. Only [`crate::AppController`] writes it.
#[derive(Debug, Clone)]
pub struct AppState {
    pub view: View,
    pub parent_tab: ParentTab,

    pub is_authenticated: bool,
    pub needs_setup: bool,
    pub pin_pad: PinPad,

    pub children: Vec<Child>,
    pub selected_child: Option<Child>,
    pub chores: Vec<Chore>,

    pub editing_child: Option<Child>,
    pub editing_chores: Vec<Chore>,
    pub add_chore: AddChoreForm,

    pub report: Vec<HistoryDay>,
    pub report_days: u32,

    pub settings: SettingsForm,
    pub notice: Option<Notice>,

    /// Bumped whenever the user goes home; answers from an older session are dropped.
    pub(crate) session: u64,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_DAYS)
    }
}

impl AppState {
    pub fn new(report_days: u32) -> Self {
        Self {
            view: View::Home,
            parent_tab: ParentTab::Children,
            is_authenticated: false,
            needs_setup: false,
            pin_pad: PinPad::default(),
            children: Vec::new(),
            selected_child: None,
            chores: Vec::new(),
            editing_child: None,
            editing_chores: Vec::new(),
            add_chore: AddChoreForm::default(),
            report: Vec::new(),
            report_days,
            settings: SettingsForm::default(),
            notice: None,
            session: 0,
        }
    }

    /// The selected child's chores with the given frequency, in server order.
    pub fn chores_by_frequency(&self, frequency: Frequency) -> Vec<&Chore> {
        chores_by_frequency(&self.chores, frequency)
    }

    pub fn editing_chores_by_frequency(&self, frequency: Frequency) -> Vec<&Chore> {
        chores_by_frequency(&self.editing_chores, frequency)
    }

    pub fn show_pin_modal(&self) -> bool {
        self.pin_pad.visible
    }

    pub fn show_add_chore(&self) -> bool {
        self.add_chore.visible
    }

    // Older name for the report rows.
    pub fn history(&self) -> &[HistoryDay] {
        &self.report
    }

    pub fn history_days(&self) -> u32 {
        self.report_days
    }

    pub fn set_history_days(&mut self, days: u32) {
        self.report_days = days;
    }
}

pub fn chores_by_frequency(chores: &[Chore], frequency: Frequency) -> Vec<&Chore> {
    chores.iter().filter(|c| c.frequency == frequency).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grouping_treats_missing_frequency_as_daily() {
        let json = r#"[
            {"id": 1, "title": "a", "frequency": "daily"},
            {"id": 2, "title": "b", "frequency": "weekly"},
            {"id": 3, "title": "c", "frequency": "monthly"},
            {"id": 4, "title": "d", "frequency": "oneoff"},
            {"id": 5, "title": "e", "frequency": ""},
            {"id": 6, "title": "f", "frequency": null},
            {"id": 7, "title": "g"}
        ]"#;

        let mut state = AppState::default();
        state.chores = serde_json::from_str(json).unwrap();

        let ids = |f| state.chores_by_frequency(f).iter().map(|c| c.id).collect::<Vec<_>>();
        assert_eq!(ids(Frequency::Daily), [1, 5, 6, 7]);
        assert_eq!(ids(Frequency::Weekly), [2]);
        assert_eq!(ids(Frequency::Monthly), [3]);
        assert_eq!(ids(Frequency::Oneoff), [4]);

        let total: usize = Frequency::ALL.iter().map(|f| state.chores_by_frequency(*f).len()).sum();
        assert_eq!(total, state.chores.len());
    }

    #[test]
    fn test_history_aliases_share_report_fields() {
        let mut state = AppState::default();
        assert_eq!(state.history_days(), 7);

        state.set_history_days(30);
        assert_eq!(state.report_days, 30);

        state.report.push(HistoryDay { date: "2024-03-06".to_string(), children: vec![] });
        assert_eq!(state.history().len(), 1);
    }

    #[test]
    fn test_settings_debug_hides_pins() {
        let mut settings = SettingsForm::default();
        settings.current_pin = Zeroizing::new("1234".to_string());
        assert!(!format!("{:?}", settings).contains("1234"));

        settings.clear();
        assert!(settings.current_pin.is_empty());
    }
}
