//! Notification inbox with optimistic read markers.
//!
//! # Design
//! The panel owns the in-memory list and is its only mutator. Actions follow
//! the same build/settle split as the request core: `begin_*` applies the
//! local change and hands back a [`PendingAction`], the caller performs the
//! backend call, and [`NotificationPanel::finish`] settles the outcome.
//! `mark_as_read` / `mark_all_as_read` chain the three steps for callers that
//! do not need to observe the intermediate state.
//!
//! Marking a single item read keeps the local change when the backend call
//! fails. Marking everything read snapshots the list first and restores it
//! on failure, so a failed bulk action never shows unread items as read.
//! Items marked individually while a bulk action is in flight stay read
//! through that rollback.
//!
//! Every applied fetch starts a new generation. A pending action settles only
//! against the generation it began in; anything older is dropped so a late
//! rollback never overwrites a fresher list.

use crate::error::ApiError;
use crate::optimistic::{OptimisticUpdate, RollbackPolicy};
use crate::services::Notifications;
use crate::types::Notification;

#[derive(Debug, Clone, PartialEq)]
pub enum PanelState {
    Loading,
    Loaded(Vec<Notification>),
    Error(String),
}

/// Which notifications the panel shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Unread,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Action {
    MarkAsRead(String),
    MarkAllAsRead,
}

/// A local change waiting for its backend call.
#[must_use = "pass the backend outcome to NotificationPanel::finish"]
#[derive(Debug)]
pub struct PendingAction {
    action: Action,
    generation: u64,
    update: OptimisticUpdate<Vec<Notification>>,
}

impl PendingAction {
    /// Issue the backend call matching this action.
    pub fn dispatch(&self, api: &Notifications<'_>) -> Result<(), ApiError> {
        match &self.action {
            Action::MarkAsRead(id) => api.mark_as_read(id),
            Action::MarkAllAsRead => api.mark_all_as_read(),
        }
    }
}

#[derive(Debug)]
pub struct NotificationPanel {
    state: PanelState,
    filter: Filter,
    action_error: Option<String>,
    mounted: bool,
    generation: u64,
    // Ids marked read one at a time in the current generation.
    kept_reads: Vec<String>,
}

impl Default for NotificationPanel {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationPanel {
    pub fn new() -> Self {
        Self {
            state: PanelState::Loading,
            filter: Filter::All,
            action_error: None,
            mounted: true,
            generation: 0,
            kept_reads: Vec::new(),
        }
    }

    pub fn state(&self) -> &PanelState {
        &self.state
    }

    pub fn filter(&self) -> Filter {
        self.filter
    }

    /// Message from the last failed action, if any.
    pub fn action_error(&self) -> Option<&str> {
        self.action_error.as_deref()
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// The full list, in server order. Empty unless loaded.
    pub fn notifications(&self) -> &[Notification] {
        match &self.state {
            PanelState::Loaded(list) => list,
            _ => &[],
        }
    }

    /// The notifications selected by the current filter.
    pub fn visible(&self) -> Vec<&Notification> {
        self.notifications()
            .iter()
            .filter(|n| match self.filter {
                Filter::All => true,
                Filter::Unread => !n.is_read,
            })
            .collect()
    }

    pub fn unread_count(&self) -> usize {
        self.notifications().iter().filter(|n| !n.is_read).count()
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Stop accepting results. Anything that settles afterwards is dropped.
    pub fn unmount(&mut self) {
        self.mounted = false;
    }

    pub fn load(&mut self, api: &Notifications<'_>) {
        self.state = PanelState::Loading;
        let result = api.list();
        self.apply_fetch(result);
    }

    pub fn apply_fetch(&mut self, result: Result<Vec<Notification>, ApiError>) {
        if !self.mounted {
            log::debug!("notification fetch settled after unmount, dropped");
            return;
        }
        self.generation += 1;
        self.kept_reads.clear();
        self.state = match result {
            Ok(list) => PanelState::Loaded(list),
            Err(err) => {
                log::warn!("failed to load notifications: {err}");
                PanelState::Error(err.user_message())
            }
        };
    }

    /// Mark `id` read locally. `None` when nothing is loaded.
    pub fn begin_mark_as_read(&mut self, id: &str) -> Option<PendingAction> {
        let PanelState::Loaded(list) = &mut self.state else {
            return None;
        };
        self.action_error = None;
        let update = OptimisticUpdate::apply(list, RollbackPolicy::Keep, |list| mark_read(list, id));
        if !self.kept_reads.iter().any(|kept| kept == id) {
            self.kept_reads.push(id.to_string());
        }
        Some(PendingAction {
            action: Action::MarkAsRead(id.to_string()),
            generation: self.generation,
            update,
        })
    }

    /// Mark every notification read locally, keeping a snapshot for rollback.
    pub fn begin_mark_all_as_read(&mut self) -> Option<PendingAction> {
        let PanelState::Loaded(list) = &mut self.state else {
            return None;
        };
        self.action_error = None;
        let update = OptimisticUpdate::apply(list, RollbackPolicy::Restore, |list| {
            list.iter_mut().for_each(|n| n.is_read = true);
        });
        Some(PendingAction {
            action: Action::MarkAllAsRead,
            generation: self.generation,
            update,
        })
    }

    /// Settle a pending action with its backend outcome.
    pub fn finish(&mut self, pending: PendingAction, result: &Result<(), ApiError>) {
        if !self.mounted {
            log::debug!("{:?} settled after unmount, dropped", pending.action);
            return;
        }
        let PanelState::Loaded(list) = &mut self.state else {
            log::debug!("{:?} settled after the list was replaced, dropped", pending.action);
            return;
        };
        if pending.generation != self.generation {
            log::debug!("{:?} settled after a reload, dropped", pending.action);
            return;
        }
        if pending.update.settle(list, result) {
            for id in &self.kept_reads {
                mark_read(list, id);
            }
            log::warn!("{:?} failed, local changes rolled back", pending.action);
        }
        if let Err(err) = result {
            self.action_error = Some(err.user_message());
        }
    }

    pub fn mark_as_read(&mut self, api: &Notifications<'_>, id: &str) -> Result<(), ApiError> {
        self.run(api, |panel| panel.begin_mark_as_read(id))
    }

    pub fn mark_all_as_read(&mut self, api: &Notifications<'_>) -> Result<(), ApiError> {
        self.run(api, Self::begin_mark_all_as_read)
    }

    fn run(
        &mut self,
        api: &Notifications<'_>,
        begin: impl FnOnce(&mut Self) -> Option<PendingAction>,
    ) -> Result<(), ApiError> {
        let Some(pending) = begin(self) else {
            return Ok(());
        };
        let result = pending.dispatch(api);
        self.finish(pending, &result);
        result
    }
}

fn mark_read(list: &mut [Notification], id: &str) {
    if let Some(n) = list.iter_mut().find(|n| n.id == id) {
        n.is_read = true;
    }
}
