use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, watch};

use super::job::{ActiveJob, CompletedJob, Job, Stage, Totals};
use crate::error::LifecycleError;
use crate::store::StateStore;

/// The aggregate root: everything the courier session knows, persisted as
/// one snapshot.
///
/// Invariants (re-checked by tests after every operation):
/// - `active` present ⇒ its id is absent from `catalog`.
/// - A job id appears in at most one of catalog/active/history.
/// - `history` is most-recent-first and append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifecycleState {
    pub catalog: Vec<Job>,
    pub active: Option<ActiveJob>,
    pub history: Vec<CompletedJob>,
    pub online: bool,
    pub auto_accept: bool,
}

impl LifecycleState {
    /// Boot state around a seed catalog. An empty catalog on first launch
    /// would look like an outage, so the caller always provides seeds.
    pub fn with_seed(seed: Vec<Job>) -> Self {
        Self {
            catalog: seed,
            active: None,
            history: Vec::new(),
            online: false,
            auto_accept: false,
        }
    }

    /// True if the id exists anywhere in the session.
    pub fn knows_id(&self, id: &str) -> bool {
        self.catalog.iter().any(|j| j.id == id)
            || self.active.as_ref().is_some_and(|a| a.job.id == id)
            || self.history.iter().any(|c| c.job.id == id)
    }
}

/// Shared handle to the single manager instance. All mutation is serialized
/// through this one mutex.
pub type SharedManager = Arc<Mutex<LifecycleManager>>;

/// Owns the [`LifecycleState`] and enforces its transitions.
///
/// Every successful mutation writes a snapshot to the store (best-effort)
/// and bumps a revision counter on a watch channel, in that order, so
/// observers always wake after both the state change and the persistence
/// write have been issued.
pub struct LifecycleManager {
    state: LifecycleState,
    store: Box<dyn StateStore>,
    revision: u64,
    changes: watch::Sender<u64>,
}

impl LifecycleManager {
    /// Hydrate from the store, falling back to the seed catalog when no
    /// usable snapshot exists. Never fails: a broken store yields a fresh
    /// session, not a dead process.
    pub fn hydrate(store: Box<dyn StateStore>, seed: Vec<Job>) -> Self {
        let state = match store.load() {
            Ok(Some(state)) => state,
            Ok(None) => LifecycleState::with_seed(seed),
            Err(e) => {
                eprintln!("entrega: failed to read saved state ({e}), starting fresh");
                LifecycleState::with_seed(seed)
            }
        };
        let (changes, _) = watch::channel(0);
        Self {
            state,
            store,
            revision: 0,
            changes,
        }
    }

    pub fn into_shared(self) -> SharedManager {
        Arc::new(Mutex::new(self))
    }

    /// Receiver for the revision counter; wakes once per committed mutation.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }

    // --- read surface ---

    pub fn available(&self) -> &[Job] {
        &self.state.catalog
    }

    pub fn active(&self) -> Option<&ActiveJob> {
        self.state.active.as_ref()
    }

    pub fn history(&self) -> &[CompletedJob] {
        &self.state.history
    }

    pub fn online(&self) -> bool {
        self.state.online
    }

    pub fn auto_accept(&self) -> bool {
        self.state.auto_accept
    }

    /// Earnings aggregate, recomputed from the history on every call.
    pub fn totals(&self) -> Totals {
        Totals {
            count: self.state.history.len(),
            sum_cents: self.state.history.iter().map(|c| c.job.fee_cents).sum(),
        }
    }

    // --- command surface ---

    /// Accept a catalog job, making it the active delivery at PICKING_UP.
    ///
    /// The single-active check runs first: with a delivery in progress this
    /// returns `AlreadyActive` without touching anything, which is also how
    /// the auto-accept controller loses a race gracefully.
    pub fn accept(&mut self, id: &str) -> Result<ActiveJob, LifecycleError> {
        if self.state.active.is_some() {
            return Err(LifecycleError::AlreadyActive);
        }
        let pos = self
            .state
            .catalog
            .iter()
            .position(|j| j.id == id)
            .ok_or_else(|| LifecycleError::NotFound(id.to_string()))?;
        let job = self.state.catalog.remove(pos);
        let active = ActiveJob::start(job);
        self.state.active = Some(active.clone());
        self.commit();
        Ok(active)
    }

    /// Drop a job from the catalog. Idempotent: a missing id means it is
    /// already gone, which is the outcome the caller wanted.
    pub fn decline(&mut self, id: &str) {
        let before = self.state.catalog.len();
        self.state.catalog.retain(|j| j.id != id);
        if self.state.catalog.len() != before {
            self.commit();
        }
    }

    /// Confirm pickup: PICKING_UP → DELIVERING. The stage machine has no
    /// other edge out of PICKING_UP and no edge back into it.
    pub fn advance(&mut self) -> Result<ActiveJob, LifecycleError> {
        let active = self
            .state
            .active
            .as_mut()
            .ok_or(LifecycleError::NoActiveJob)?;
        match active.stage {
            Stage::PickingUp => {
                active.stage = Stage::Delivering;
                let snapshot = active.clone();
                self.commit();
                Ok(snapshot)
            }
            Stage::Delivering => Err(LifecycleError::InvalidTransition(Stage::Delivering)),
        }
    }

    /// Confirm delivery: archives the active job with a completion stamp.
    /// Only valid from DELIVERING; pickup must be confirmed first.
    pub fn complete(&mut self) -> Result<CompletedJob, LifecycleError> {
        match self.state.active.take() {
            None => Err(LifecycleError::NoActiveJob),
            Some(active) if active.stage == Stage::PickingUp => {
                // Put it back untouched; failure must not mutate anything.
                self.state.active = Some(active);
                Err(LifecycleError::InvalidTransition(Stage::PickingUp))
            }
            Some(active) => {
                let done = CompletedJob::from_job(active.job);
                self.state.history.insert(0, done.clone());
                self.commit();
                Ok(done)
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.state.history.clear();
        self.commit();
    }

    pub fn set_online(&mut self, online: bool) {
        self.state.online = online;
        self.commit();
    }

    /// Stores the flag regardless of the online state; the controller is
    /// the one that refuses to act on it while offline.
    pub fn set_auto_accept(&mut self, auto_accept: bool) {
        self.state.auto_accept = auto_accept;
        self.commit();
    }

    /// Add a job arriving from the surrounding application. Ids must be
    /// unique across catalog, active and history.
    pub fn push_job(&mut self, job: Job) -> Result<(), LifecycleError> {
        if self.state.knows_id(&job.id) {
            return Err(LifecycleError::DuplicateJob(job.id));
        }
        self.state.catalog.push(job);
        self.commit();
        Ok(())
    }

    /// Persist the snapshot, then announce the new revision. Persistence is
    /// best-effort: the in-memory state stays authoritative for the running
    /// session and a failed write must not fail the operation.
    fn commit(&mut self) {
        if let Err(e) = self.store.save(&self.state) {
            eprintln!("entrega: failed to persist state ({e}), continuing in memory");
        }
        self.revision += 1;
        let _ = self.changes.send(self.revision);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state_machine::Location;
    use crate::store::MemoryStore;

    fn job(id: &str, fee_cents: i64) -> Job {
        let mut j = Job::new(
            "Cantina da Vila",
            "Rua Harmonia 12",
            "Bruno Costa",
            "Rua Girassol 310",
            Location::new(-23.5505, -46.6890),
            Location::new(-23.5533, -46.6921),
            fee_cents,
            1,
        );
        j.id = id.to_string();
        j
    }

    fn manager_with(jobs: Vec<Job>) -> LifecycleManager {
        LifecycleManager::hydrate(Box::new(MemoryStore::default()), jobs)
    }

    fn assert_invariants(m: &LifecycleManager) {
        if let Some(active) = m.active() {
            assert!(
                !m.available().iter().any(|j| j.id == active.job.id),
                "active job still listed in catalog"
            );
        }
        let mut ids: Vec<&str> = m.available().iter().map(|j| j.id.as_str()).collect();
        ids.extend(m.active().map(|a| a.job.id.as_str()));
        ids.extend(m.history().iter().map(|c| c.job.id.as_str()));
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total, "job id present in more than one collection");
    }

    #[test]
    fn accept_moves_job_to_active() {
        let mut m = manager_with(vec![job("1", 150), job("2", 200)]);

        let active = m.accept("1").unwrap();
        assert_eq!(active.job.id, "1");
        assert_eq!(active.stage, Stage::PickingUp);
        assert_eq!(m.available().len(), 1);
        assert_eq!(m.available()[0].id, "2");
        assert_invariants(&m);
    }

    #[test]
    fn accept_while_active_fails_without_mutation() {
        let mut m = manager_with(vec![job("1", 150), job("2", 200)]);
        m.accept("1").unwrap();

        let before = m.state.clone();
        assert_eq!(m.accept("2"), Err(LifecycleError::AlreadyActive));
        assert_eq!(m.state, before);
        assert_invariants(&m);
    }

    #[test]
    fn accept_unknown_id_fails_without_mutation() {
        let mut m = manager_with(vec![job("1", 150)]);

        let before = m.state.clone();
        assert_eq!(
            m.accept("missing"),
            Err(LifecycleError::NotFound("missing".into()))
        );
        assert_eq!(m.state, before);
    }

    #[test]
    fn decline_removes_and_is_idempotent() {
        let mut m = manager_with(vec![job("1", 150), job("2", 200)]);

        m.decline("1");
        assert_eq!(m.available().len(), 1);

        // Already gone: still fine, nothing changes.
        m.decline("1");
        assert_eq!(m.available().len(), 1);
        assert_invariants(&m);
    }

    #[test]
    fn declined_job_never_reaches_history() {
        let mut m = manager_with(vec![job("1", 150)]);
        m.decline("1");
        assert!(m.history().is_empty());
        assert_eq!(m.totals().count, 0);
    }

    #[test]
    fn advance_requires_active_job() {
        let mut m = manager_with(vec![job("1", 150)]);
        assert_eq!(m.advance(), Err(LifecycleError::NoActiveJob));
    }

    #[test]
    fn advance_moves_pickup_to_delivering_once() {
        let mut m = manager_with(vec![job("1", 150)]);
        m.accept("1").unwrap();

        let active = m.advance().unwrap();
        assert_eq!(active.stage, Stage::Delivering);

        // No edge out of DELIVERING except complete().
        assert_eq!(
            m.advance(),
            Err(LifecycleError::InvalidTransition(Stage::Delivering))
        );
        assert_eq!(m.active().unwrap().stage, Stage::Delivering);
        assert_invariants(&m);
    }

    #[test]
    fn complete_requires_delivering_stage() {
        let mut m = manager_with(vec![job("1", 150)]);
        assert_eq!(m.complete(), Err(LifecycleError::NoActiveJob));

        m.accept("1").unwrap();
        assert_eq!(
            m.complete(),
            Err(LifecycleError::InvalidTransition(Stage::PickingUp))
        );
        assert_eq!(m.active().unwrap().stage, Stage::PickingUp);
    }

    #[test]
    fn complete_archives_and_clears_active() {
        let mut m = manager_with(vec![job("1", 150)]);
        m.accept("1").unwrap();
        m.advance().unwrap();

        let done = m.complete().unwrap();
        assert_eq!(done.job.id, "1");
        assert!(m.active().is_none());
        assert_eq!(m.history().len(), 1);
        assert_eq!(m.history()[0].job.id, "1");
        assert_invariants(&m);
    }

    #[test]
    fn history_is_most_recent_first() {
        let mut m = manager_with(vec![job("1", 150), job("2", 200)]);
        for id in ["1", "2"] {
            m.accept(id).unwrap();
            m.advance().unwrap();
            m.complete().unwrap();
        }
        assert_eq!(m.history()[0].job.id, "2");
        assert_eq!(m.history()[1].job.id, "1");
        assert!(m.history()[0].completed_at >= m.history()[1].completed_at);
    }

    #[test]
    fn totals_recomputed_from_history() {
        let mut m = manager_with(vec![job("1", 150), job("2", 200)]);
        assert_eq!(m.totals(), Totals { count: 0, sum_cents: 0 });

        for id in ["1", "2"] {
            m.accept(id).unwrap();
            m.advance().unwrap();
            m.complete().unwrap();
        }
        assert_eq!(m.totals(), Totals { count: 2, sum_cents: 350 });

        m.clear_history();
        assert_eq!(m.totals(), Totals { count: 0, sum_cents: 0 });
    }

    #[test]
    fn flags_are_plain_setters() {
        let mut m = manager_with(vec![job("1", 150)]);
        m.set_online(true);
        m.set_auto_accept(true);
        assert!(m.online());
        assert!(m.auto_accept());
        // Setters never accept anything themselves.
        assert!(m.active().is_none());

        // The flag value is stored even while offline; acting on it is the
        // controller's problem.
        m.set_online(false);
        assert!(m.auto_accept());
    }

    #[test]
    fn push_job_rejects_known_ids() {
        let mut m = manager_with(vec![job("1", 150)]);
        assert_eq!(
            m.push_job(job("1", 999)),
            Err(LifecycleError::DuplicateJob("1".into()))
        );

        m.accept("1").unwrap();
        assert_eq!(
            m.push_job(job("1", 999)),
            Err(LifecycleError::DuplicateJob("1".into()))
        );

        m.push_job(job("3", 300)).unwrap();
        assert_eq!(m.available().len(), 1);
        assert_invariants(&m);
    }

    #[test]
    fn full_shift_scenario() {
        // catalog = [A(1, 150), B(2, 200)]
        let mut m = manager_with(vec![job("1", 150), job("2", 200)]);

        let active = m.accept("1").unwrap();
        assert_eq!(active.job.id, "1");
        assert_eq!(active.stage, Stage::PickingUp);
        assert_eq!(m.available().len(), 1);

        assert_eq!(m.accept("2"), Err(LifecycleError::AlreadyActive));
        assert_eq!(m.available().len(), 1);

        assert_eq!(m.advance().unwrap().stage, Stage::Delivering);

        let done = m.complete().unwrap();
        assert_eq!(done.job.fee_cents, 150);
        assert!(m.active().is_none());
        assert_eq!(m.totals(), Totals { count: 1, sum_cents: 150 });
    }

    #[test]
    fn every_commit_bumps_the_revision() {
        let mut m = manager_with(vec![job("1", 150)]);
        let rx = m.subscribe();
        assert_eq!(*rx.borrow(), 0);

        m.set_online(true);
        assert_eq!(*rx.borrow(), 1);
        m.accept("1").unwrap();
        assert_eq!(*rx.borrow(), 2);

        // Failed operations commit nothing.
        let _ = m.accept("1");
        assert_eq!(*rx.borrow(), 2);
    }

    #[test]
    fn hydrate_prefers_stored_snapshot() {
        let store = MemoryStore::default();
        let mut m = LifecycleManager::hydrate(Box::new(store.clone()), vec![job("1", 150)]);
        m.accept("1").unwrap();
        m.set_online(true);

        let rehydrated = LifecycleManager::hydrate(Box::new(store), vec![job("9", 900)]);
        assert_eq!(rehydrated.state, m.state);
        assert_eq!(rehydrated.active().unwrap().job.id, "1");
        assert!(rehydrated.online());
    }

    #[test]
    fn hydrate_falls_back_to_seed() {
        let m = manager_with(vec![job("1", 150), job("2", 200)]);
        assert_eq!(m.available().len(), 2);
        assert!(m.active().is_none());
        assert!(m.history().is_empty());
        assert!(!m.online());
        assert!(!m.auto_accept());
    }
}
