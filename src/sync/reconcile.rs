use std::collections::HashSet;

use crate::{
    error::ReconcileError,
    info,
    service::PlaylistService,
    types::{PlaylistItem, PlanTableRow},
};

/// The two set differences between the playlist and the resolved tracks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcilePlan {
    pub to_remove: HashSet<PlaylistItem>,
    pub to_add: HashSet<PlaylistItem>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_remove.is_empty() && self.to_add.is_empty()
    }

    /// One row per change, removals first, each half sorted by identifier.
    pub fn table_rows(&self) -> Vec<PlanTableRow> {
        let mut remove: Vec<&PlaylistItem> = self.to_remove.iter().collect();
        let mut add: Vec<&PlaylistItem> = self.to_add.iter().collect();
        remove.sort();
        add.sort();

        remove
            .into_iter()
            .map(|item| ("remove", item))
            .chain(add.into_iter().map(|item| ("add", item)))
            .map(|(action, item)| PlanTableRow {
                action: action.to_string(),
                track: item.to_string(),
            })
            .collect()
    }
}

/// Computes what has to change for `current` to become `resolved`.
///
/// Anything in the playlist that was not resolved this run is removed,
/// whatever the reason it fell out of the window.
pub fn reconcile(
    current: &HashSet<PlaylistItem>,
    resolved: &HashSet<PlaylistItem>,
) -> ReconcilePlan {
    ReconcilePlan {
        to_remove: current.difference(resolved).cloned().collect(),
        to_add: resolved.difference(current).cloned().collect(),
    }
}

/// Applies `plan`: removals first, then additions.
///
/// Empty halves are not sent. A failure reports which half failed; when
/// adding fails, the removals have already been applied.
pub async fn apply(
    service: &dyn PlaylistService,
    plan: &ReconcilePlan,
) -> Result<(), ReconcileError> {
    info!("Tracks to remove: {}", plan.to_remove.len());
    if !plan.to_remove.is_empty() {
        service
            .remove_items(&plan.to_remove)
            .await
            .map_err(ReconcileError::Remove)?;
    }

    info!("Tracks to add: {}", plan.to_add.len());
    if !plan.to_add.is_empty() {
        service
            .add_items(&plan.to_add)
            .await
            .map_err(ReconcileError::Add)?;
    }

    Ok(())
}
