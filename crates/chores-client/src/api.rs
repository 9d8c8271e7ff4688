use async_trait::async_trait;
use chores_common::pin::Pin;
use chores_common::{Child, ChildId, Chore, ChoreId, Frequency};
use chores_proto::{
    Ack, AuthResponse, ChildHistoryResponse, ChildUpdate, ChoreUpdate, Completion, HistoryQuery,
    HistoryResponse, PinExists, SetPinData, VerifyPinData,
};

use crate::error::ApiError;

/// One method per server endpoint. Calls are fire-once: no retry, no caching.
///
/// Auth endpoints report rejection through [`AuthResponse::ok`]; every other
/// endpoint surfaces a non-success status as [`ApiError::Status`].
#[async_trait]
pub trait ChoresApi: Send + Sync {
    async fn pin_exists(&self) -> Result<PinExists, ApiError>;

    async fn verify_pin(&self, pin: &Pin) -> Result<AuthResponse<VerifyPinData>, ApiError>;

    /// Set the PIN, or change it when `current_pin` is given and non-empty.
    async fn set_pin(
        &self,
        pin: &Pin,
        current_pin: Option<&Pin>,
    ) -> Result<AuthResponse<SetPinData>, ApiError>;

    async fn get_children(&self) -> Result<Vec<Child>, ApiError>;

    async fn get_child(&self, id: ChildId) -> Result<Child, ApiError>;

    async fn create_child(&self, name: &str) -> Result<Child, ApiError>;

    async fn update_child(&self, id: ChildId, update: &ChildUpdate) -> Result<Child, ApiError>;

    async fn delete_child(&self, id: ChildId) -> Result<Ack, ApiError>;

    async fn get_chores(&self, child_id: ChildId) -> Result<Vec<Chore>, ApiError>;

    async fn create_chore(
        &self,
        child_id: ChildId,
        title: &str,
        frequency: Frequency,
    ) -> Result<Chore, ApiError>;

    async fn update_chore(&self, chore_id: ChoreId, update: &ChoreUpdate)
        -> Result<Chore, ApiError>;

    async fn delete_chore(&self, chore_id: ChoreId) -> Result<Ack, ApiError>;

    async fn complete_chore(&self, chore_id: ChoreId) -> Result<Completion, ApiError>;

    async fn uncomplete_chore(&self, chore_id: ChoreId) -> Result<Ack, ApiError>;

    async fn get_history(&self, query: &HistoryQuery) -> Result<HistoryResponse, ApiError>;

    /// Per-child history; `days` falls back to the server default of 30.
    async fn get_child_history(
        &self,
        child_id: ChildId,
        days: Option<u32>,
    ) -> Result<ChildHistoryResponse, ApiError>;
}
