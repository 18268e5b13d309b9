use console::Style;

use crate::state_machine::{ActiveJob, SharedManager};

/// Reactive auto-accept policy.
///
/// Wakes on every committed mutation (via the manager's revision channel)
/// and, when the courier is online with auto-accept enabled, no delivery is
/// in progress and the catalog is non-empty, accepts the first catalog
/// entry by insertion order. Evaluation runs under the same mutex as every
/// manual operation, so the single-active invariant cannot be raced; a
/// manual accept that wins simply leaves nothing for the controller to do.
pub struct AutoAcceptController {
    manager: SharedManager,
    changes: tokio::sync::watch::Receiver<u64>,
}

impl AutoAcceptController {
    pub async fn attach(manager: SharedManager) -> Self {
        let changes = manager.lock().await.subscribe();
        Self { manager, changes }
    }

    /// Evaluate once, then once more after each mutation, until the manager
    /// goes away.
    pub async fn run(mut self) {
        loop {
            if let Some(active) = Self::evaluate(&self.manager).await {
                announce(&active);
            }
            if self.changes.changed().await.is_err() {
                break;
            }
        }
    }

    /// A single evaluation pass. Returns the job it accepted, if any.
    ///
    /// `AlreadyActive` from the underlying accept is swallowed: it is the
    /// expected outcome of losing a race, not a fault.
    pub async fn evaluate(manager: &SharedManager) -> Option<ActiveJob> {
        let mut m = manager.lock().await;
        if !m.online() || !m.auto_accept() || m.active().is_some() {
            return None;
        }
        let first = m.available().first()?.id.clone();
        m.accept(&first).ok()
    }
}

fn announce(active: &ActiveJob) {
    let green = Style::new().green().bold();
    eprintln!(
        "  {} Auto-accepted: {} → {} ({} item(s))",
        green.apply_to("✓"),
        active.job.shop_name,
        active.job.customer_name,
        active.job.item_count
    );
}
