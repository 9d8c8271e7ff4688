use chores_common::{ChildHistoryDay, ChildId, Frequency, HistoryDay};
use serde::{Deserialize, Serialize};

/// Default trailing window for `GET /api/history`.
pub const DEFAULT_HISTORY_DAYS: u32 = 7;
/// Default trailing window for `GET /api/history/child/{id}`.
pub const DEFAULT_CHILD_HISTORY_DAYS: u32 = 30;
/// The server clamps any requested window to this many days.
pub const MAX_HISTORY_DAYS: u32 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinExists {
    pub exists: bool,
}

/// Result of an auth endpoint: the HTTP success flag next to the decoded body.
///
/// Auth endpoints answer failures with 4xx plus a JSON body, so callers check
/// `ok` instead of treating the status as an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthResponse<T> {
    pub ok: bool,
    pub data: T,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyPinData {
    #[serde(default)]
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetPinData {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AuthResponse<VerifyPinData> {
    pub fn is_valid(&self) -> bool {
        self.ok && self.data.valid
    }
}

impl AuthResponse<SetPinData> {
    /// Server-provided reason for a rejected PIN change, if any.
    pub fn error_message(&self) -> Option<&str> {
        if self.ok {
            None
        } else {
            self.data.error.as_deref()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VerifyPinRequest<'a> {
    pub pin: &'a str,
}

#[derive(Debug, Serialize)]
pub struct SetPinRequest<'a> {
    pub pin: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_pin: Option<&'a str>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewChild<'a> {
    pub name: &'a str,
}

/// Partial child update; only populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
}

impl ChildUpdate {
    pub fn rename(name: impl Into<String>) -> Self {
        Self { name: Some(name.into()), ..Default::default() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewChore<'a> {
    pub title: &'a str,
    pub frequency: Frequency,
}

/// Partial chore update; only populated fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoreUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frequency: Option<Frequency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i64>,
}

impl ChoreUpdate {
    pub fn retitle(title: impl Into<String>) -> Self {
        Self { title: Some(title.into()), ..Default::default() }
    }
}

/// Acknowledgment returned by deletes and un-completion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Completion {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub completed_at: Option<String>,
    /// Set when the chore was already done for the current period.
    #[serde(default)]
    pub already_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryQuery {
    pub days: u32,
    pub child_id: Option<ChildId>,
}

impl Default for HistoryQuery {
    fn default() -> Self {
        Self { days: DEFAULT_HISTORY_DAYS, child_id: None }
    }
}

impl HistoryQuery {
    pub fn days(days: u32) -> Self {
        Self { days, child_id: None }
    }

    pub fn for_child(mut self, child_id: ChildId) -> Self {
        self.child_id = Some(child_id);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryResponse {
    #[serde(default)]
    pub history: Vec<HistoryDay>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChildHistoryResponse {
    #[serde(default)]
    pub history: Vec<ChildHistoryDay>,
}

/// Plain `{error}` body used by every endpoint for failures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
