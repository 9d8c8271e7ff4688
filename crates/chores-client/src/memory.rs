//! In-process implementation of the household server contract.
//!
//! Used by tests and by the CLI's offline mode. It keeps the server-side rules
//! the client relies on (default frequency, per-period completion, history
//! window clamping, PIN change rules) and records every call it receives.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chores_common::pin::Pin;
use chores_common::{
    Child, ChildHistoryDay, ChildId, Chore, ChoreId, Frequency, HistoryChild, HistoryChore,
    HistoryDay,
};
use chores_proto::{
    paths, Ack, AuthResponse, ChildHistoryResponse, ChildUpdate, ChoreUpdate, Completion,
    HistoryQuery, HistoryResponse, PinExists, SetPinData, VerifyPinData,
    DEFAULT_CHILD_HISTORY_DAYS, MAX_HISTORY_DAYS,
};
use chrono::{Datelike, Days, Local, NaiveDate, NaiveDateTime};
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::ChoresApi;
use crate::error::ApiError;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Source of "now" for period and history calculations.
pub type Clock = Arc<dyn Fn() -> NaiveDateTime + Send + Sync>;

struct StoredChore {
    id: ChoreId,
    child_id: ChildId,
    title: String,
    frequency: Frequency,
    display_order: i64,
    active: bool,
    created_on: NaiveDate,
}

impl StoredChore {
    fn to_chore(&self, completion: Option<&StoredCompletion>) -> Chore {
        Chore {
            id: self.id,
            child_id: Some(self.child_id),
            title: self.title.clone(),
            frequency: self.frequency,
            display_order: Some(self.display_order),
            completed: completion.is_some(),
            completed_at: completion.map(StoredCompletion::timestamp),
        }
    }
}

struct StoredCompletion {
    chore_id: ChoreId,
    date: NaiveDate,
    completed_at: NaiveDateTime,
}

impl StoredCompletion {
    fn timestamp(&self) -> String {
        self.completed_at.format(TIMESTAMP_FORMAT).to_string()
    }
}

#[derive(Default)]
struct Store {
    pin: Option<Pin>,
    children: Vec<Child>,
    chores: Vec<StoredChore>,
    completions: Vec<StoredCompletion>,
    next_id: i64,
    requests: Vec<String>,
}

impl Store {
    fn record(&mut self, method: &str, path: &str) {
        self.requests.push(format!("{method} {path}"));
    }

    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn child(&self, id: ChildId) -> Result<&Child, ApiError> {
        self.children.iter().find(|c| c.id == id).ok_or_else(|| ApiError::not_found("Child"))
    }

    fn chore_mut(&mut self, id: ChoreId) -> Result<&mut StoredChore, ApiError> {
        self.chores.iter_mut().find(|c| c.id == id).ok_or_else(|| ApiError::not_found("Chore"))
    }

    /// Completion counting for the chore's current period, if any.
    fn period_completion(&self, chore: &StoredChore, today: NaiveDate) -> Option<&StoredCompletion> {
        let start = period_start(chore.frequency, today);
        self.completions
            .iter()
            .filter(|c| c.chore_id == chore.id && c.date >= start && c.date <= today)
            .max_by_key(|c| c.date)
    }

    /// Retire one-off chores whose day has passed: those completed before
    /// `today`, and those not completed on the day they were created.
    fn expire_oneoff_chores(&mut self, today: NaiveDate) {
        let completions = &self.completions;
        for chore in self.chores.iter_mut().filter(|c| c.active && c.frequency == Frequency::Oneoff) {
            let mut done = completions.iter().filter(|c| c.chore_id == chore.id);
            let completed_earlier = done.clone().any(|c| c.date < today);
            let missed = chore.created_on < today && !done.any(|c| c.date == chore.created_on);
            if completed_earlier || missed {
                debug!("Retiring one-off chore {}", chore.id);
                chore.active = false;
            }
        }
    }
}

/// First day of the period a completion on `today` counts toward.
pub fn period_start(frequency: Frequency, today: NaiveDate) -> NaiveDate {
    match frequency {
        Frequency::Daily | Frequency::Oneoff => today,
        Frequency::Weekly => today
            .checked_sub_days(Days::new(u64::from(today.weekday().num_days_from_monday())))
            .unwrap_or(today),
        Frequency::Monthly => today.with_day(1).unwrap_or(today),
    }
}

fn clamp_days(days: u32) -> u32 {
    days.clamp(1, MAX_HISTORY_DAYS)
}

fn window_start(today: NaiveDate, days: u32) -> NaiveDate {
    today.checked_sub_days(Days::new(u64::from(days - 1))).unwrap_or(today)
}

pub struct MemoryBackend {
    store: Mutex<Store>,
    clock: Clock,
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(|| Local::now().naive_local()))
    }

    pub fn with_clock(clock: Clock) -> Self {
        Self { store: Mutex::new(Store::default()), clock }
    }

    /// A household with two children and a few chores, for offline demos.
    pub fn with_demo_data(mut self) -> Self {
        let today = self.now().date();
        let store = self.store.get_mut();
        for (name, chores) in [
            ("Ada", &[("Make bed", Frequency::Daily), ("Water plants", Frequency::Weekly)][..]),
            ("Sam", &[("Feed cat", Frequency::Daily), ("Tidy garage", Frequency::Monthly)][..]),
        ] {
            let child_id = store.allocate_id();
            let order = store.children.len() as i64 + 1;
            store.children.push(Child {
                id: child_id,
                name: name.to_string(),
                display_order: Some(order),
                created_at: None,
            });
            for (index, (title, frequency)) in chores.iter().enumerate() {
                let id = store.allocate_id();
                store.chores.push(StoredChore {
                    id,
                    child_id,
                    title: title.to_string(),
                    frequency: *frequency,
                    display_order: index as i64 + 1,
                    active: true,
                    created_on: today,
                });
            }
        }
        self
    }

    /// Every call received so far, as `"METHOD /path"`.
    pub async fn requests(&self) -> Vec<String> {
        self.store.lock().await.requests.clone()
    }

    pub async fn count_requests(&self, request: &str) -> usize {
        self.store.lock().await.requests.iter().filter(|r| r.as_str() == request).count()
    }

    pub async fn clear_requests(&self) {
        self.store.lock().await.requests.clear();
    }

    fn now(&self) -> NaiveDateTime {
        (self.clock)()
    }

    fn group_history(
        store: &Store,
        start: NaiveDate,
        today: NaiveDate,
        child_filter: Option<ChildId>,
    ) -> Vec<HistoryDay> {
        let mut days: BTreeMap<NaiveDate, BTreeMap<String, (ChildId, Vec<(NaiveDateTime, HistoryChore)>)>> =
            BTreeMap::new();

        for completion in store.completions.iter().filter(|c| c.date >= start && c.date <= today) {
            let Some(chore) = store.chores.iter().find(|c| c.id == completion.chore_id) else {
                continue;
            };
            if child_filter.is_some_and(|id| id != chore.child_id) {
                continue;
            }
            let Ok(child) = store.child(chore.child_id) else {
                continue;
            };

            days.entry(completion.date)
                .or_default()
                .entry(child.name.clone())
                .or_insert_with(|| (child.id, Vec::new()))
                .1
                .push((
                    completion.completed_at,
                    HistoryChore {
                        chore_id: chore.id,
                        title: chore.title.clone(),
                        completed_at: Some(completion.timestamp()),
                    },
                ));
        }

        days.into_iter()
            .rev()
            .map(|(date, children)| HistoryDay {
                date: date.to_string(),
                children: children
                    .into_iter()
                    .map(|(name, (id, mut chores))| {
                        chores.sort_by_key(|(at, _)| *at);
                        HistoryChild { id, name, chores: chores.into_iter().map(|(_, c)| c).collect() }
                    })
                    .collect(),
            })
            .collect()
    }
}

#[async_trait]
impl ChoresApi for MemoryBackend {
    async fn pin_exists(&self) -> Result<PinExists, ApiError> {
        let mut store = self.store.lock().await;
        store.record("GET", paths::PIN_EXISTS);
        Ok(PinExists { exists: store.pin.is_some() })
    }

    async fn verify_pin(&self, pin: &Pin) -> Result<AuthResponse<VerifyPinData>, ApiError> {
        let mut store = self.store.lock().await;
        store.record("POST", paths::VERIFY_PIN);

        let Some(stored) = store.pin.as_ref() else {
            return Ok(AuthResponse {
                ok: false,
                data: VerifyPinData { valid: false, error: Some("No PIN set".to_string()) },
            });
        };

        let valid = stored.matches(pin);
        Ok(AuthResponse { ok: valid, data: VerifyPinData { valid, error: None } })
    }

    async fn set_pin(
        &self,
        pin: &Pin,
        current_pin: Option<&Pin>,
    ) -> Result<AuthResponse<SetPinData>, ApiError> {
        let mut store = self.store.lock().await;
        store.record("POST", paths::SET_PIN);

        let reject = |message: &str| AuthResponse {
            ok: false,
            data: SetPinData { success: false, error: Some(message.to_string()) },
        };

        if pin.check_new().is_err() {
            return Ok(reject("PIN must be at least 4 digits"));
        }

        if let Some(stored) = store.pin.as_ref() {
            match current_pin.filter(|p| !p.is_empty()) {
                None => return Ok(reject("Current PIN required")),
                Some(current) if !stored.matches(current) => {
                    return Ok(reject("Invalid current PIN"))
                }
                Some(_) => {}
            }
        }

        store.pin = Some(Pin::new(pin.expose()));
        debug!("PIN updated");
        Ok(AuthResponse { ok: true, data: SetPinData { success: true, error: None } })
    }

    async fn get_children(&self) -> Result<Vec<Child>, ApiError> {
        let mut store = self.store.lock().await;
        store.record("GET", paths::CHILDREN);

        let mut children = store.children.clone();
        children.sort_by_key(|c| (c.display_order.unwrap_or_default(), c.id));
        Ok(children)
    }

    async fn get_child(&self, id: ChildId) -> Result<Child, ApiError> {
        let mut store = self.store.lock().await;
        store.record("GET", &paths::child(id));
        store.child(id).cloned()
    }

    async fn create_child(&self, name: &str) -> Result<Child, ApiError> {
        let mut store = self.store.lock().await;
        store.record("POST", paths::CHILDREN);

        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::status(400, "Name is required"));
        }

        let display_order =
            store.children.iter().filter_map(|c| c.display_order).max().unwrap_or(0) + 1;
        let child = Child {
            id: store.allocate_id(),
            name: name.to_string(),
            display_order: Some(display_order),
            created_at: Some(self.now().format(TIMESTAMP_FORMAT).to_string()),
        };
        store.children.push(child.clone());
        Ok(child)
    }

    async fn update_child(&self, id: ChildId, update: &ChildUpdate) -> Result<Child, ApiError> {
        let mut store = self.store.lock().await;
        store.record("PUT", &paths::child(id));

        let child = store
            .children
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(|| ApiError::not_found("Child"))?;

        let name = update.name.as_deref().unwrap_or(&child.name).trim().to_string();
        if name.is_empty() {
            return Err(ApiError::status(400, "Name is required"));
        }

        child.name = name;
        if let Some(order) = update.display_order {
            child.display_order = Some(order);
        }
        Ok(child.clone())
    }

    async fn delete_child(&self, id: ChildId) -> Result<Ack, ApiError> {
        let mut store = self.store.lock().await;
        store.record("DELETE", &paths::child(id));

        store.child(id)?;
        let removed: Vec<ChoreId> =
            store.chores.iter().filter(|c| c.child_id == id).map(|c| c.id).collect();
        store.children.retain(|c| c.id != id);
        store.chores.retain(|c| c.child_id != id);
        store.completions.retain(|c| !removed.contains(&c.chore_id));
        Ok(Ack { success: true })
    }

    async fn get_chores(&self, child_id: ChildId) -> Result<Vec<Chore>, ApiError> {
        let mut store = self.store.lock().await;
        store.record("GET", &paths::child_chores(child_id));

        let today = self.now().date();
        store.expire_oneoff_chores(today);
        let mut active: Vec<&StoredChore> =
            store.chores.iter().filter(|c| c.child_id == child_id && c.active).collect();
        active.sort_by_key(|c| {
            let rank = Frequency::ALL.iter().position(|f| *f == c.frequency).unwrap_or(usize::MAX);
            (rank, c.display_order, c.id)
        });

        Ok(active.into_iter().map(|c| c.to_chore(store.period_completion(c, today))).collect())
    }

    async fn create_chore(
        &self,
        child_id: ChildId,
        title: &str,
        frequency: Frequency,
    ) -> Result<Chore, ApiError> {
        let mut store = self.store.lock().await;
        store.record("POST", &paths::child_chores(child_id));

        store.child(child_id)?;
        let title = title.trim();
        if title.is_empty() {
            return Err(ApiError::status(400, "Title is required"));
        }

        let display_order = store
            .chores
            .iter()
            .filter(|c| c.child_id == child_id && c.frequency == frequency)
            .map(|c| c.display_order)
            .max()
            .unwrap_or(0)
            + 1;

        let chore = StoredChore {
            id: store.allocate_id(),
            child_id,
            title: title.to_string(),
            frequency,
            display_order,
            active: true,
            created_on: self.now().date(),
        };
        let created = chore.to_chore(None);
        store.chores.push(chore);
        Ok(created)
    }

    async fn update_chore(
        &self,
        chore_id: ChoreId,
        update: &ChoreUpdate,
    ) -> Result<Chore, ApiError> {
        let mut store = self.store.lock().await;
        store.record("PUT", &paths::chore(chore_id));

        let chore = store.chore_mut(chore_id)?;
        let title = update.title.as_deref().unwrap_or(&chore.title).trim().to_string();
        if title.is_empty() {
            return Err(ApiError::status(400, "Title is required"));
        }

        chore.title = title;
        if let Some(frequency) = update.frequency {
            chore.frequency = frequency;
        }
        if let Some(order) = update.display_order {
            chore.display_order = order;
        }
        Ok(chore.to_chore(None))
    }

    async fn delete_chore(&self, chore_id: ChoreId) -> Result<Ack, ApiError> {
        let mut store = self.store.lock().await;
        store.record("DELETE", &paths::chore(chore_id));

        store.chore_mut(chore_id)?.active = false;
        Ok(Ack { success: true })
    }

    async fn complete_chore(&self, chore_id: ChoreId) -> Result<Completion, ApiError> {
        let mut store = self.store.lock().await;
        store.record("POST", &paths::chore_completion(chore_id));

        let now = self.now();
        let today = now.date();
        let chore = store
            .chores
            .iter()
            .find(|c| c.id == chore_id && c.active)
            .ok_or_else(|| ApiError::not_found("Chore"))?;

        if let Some(existing) = store.period_completion(chore, today) {
            return Ok(Completion {
                success: true,
                completed_at: Some(existing.timestamp()),
                already_completed: true,
            });
        }

        let completion = StoredCompletion { chore_id, date: today, completed_at: now };
        let completed_at = completion.timestamp();
        store.completions.push(completion);
        Ok(Completion { success: true, completed_at: Some(completed_at), already_completed: false })
    }

    async fn uncomplete_chore(&self, chore_id: ChoreId) -> Result<Ack, ApiError> {
        let mut store = self.store.lock().await;
        store.record("DELETE", &paths::chore_completion(chore_id));

        let today = self.now().date();
        let frequency = store.chore_mut(chore_id)?.frequency;
        let start = period_start(frequency, today);
        store.completions.retain(|c| !(c.chore_id == chore_id && c.date >= start));
        Ok(Ack { success: true })
    }

    async fn get_history(&self, query: &HistoryQuery) -> Result<HistoryResponse, ApiError> {
        let mut store = self.store.lock().await;
        store.record("GET", paths::HISTORY);

        let today = self.now().date();
        let start = window_start(today, clamp_days(query.days));
        Ok(HistoryResponse { history: Self::group_history(&store, start, today, query.child_id) })
    }

    async fn get_child_history(
        &self,
        child_id: ChildId,
        days: Option<u32>,
    ) -> Result<ChildHistoryResponse, ApiError> {
        let mut store = self.store.lock().await;
        store.record("GET", &paths::child_history(child_id));

        let today = self.now().date();
        let start = window_start(today, clamp_days(days.unwrap_or(DEFAULT_CHILD_HISTORY_DAYS)));
        let history = Self::group_history(&store, start, today, Some(child_id))
            .into_iter()
            .map(|day| ChildHistoryDay {
                date: day.date,
                chores: day.children.into_iter().flat_map(|c| c.chores).collect(),
            })
            .collect();
        Ok(ChildHistoryResponse { history })
    }
}
