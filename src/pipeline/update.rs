// src/pipeline/update.rs

//! Update cycle orchestration.
//!
//! ```text
//! Idle -> Checking -> UpToDate
//!                  -> Refreshing -> Persisted
//!         (Checking | Refreshing) -> Failed
//! ```
//!
//! `Checking` costs one lightweight probe plus a local read. `Refreshing`
//! costs one full listing and two slot writes. Slot writes are not
//! transactional: the full index stays updated if the smart write fails.

use std::fmt;

use crate::error::Result;
use crate::models::ReleaseCollection;
use crate::services::ReleaseSource;
use crate::storage::{IndexSlot, IndexStorage};

use super::diff::ReleaseDiff;
use super::filter::SmartFilter;

/// Phase of an update cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateState {
    Idle,
    Checking,
    UpToDate,
    Refreshing,
    Persisted,
    Failed,
}

/// Why a refresh was triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshReason {
    /// Remote newest release differs from the local one
    NewRelease { remote: String, local: String },
    /// Latest-release probe failed; staleness assumed
    ProbeFailed(String),
    /// Local full index missing or unreadable
    LocalIndexUnavailable(String),
    /// Local full index holds no releases
    LocalIndexEmpty,
}

impl fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefreshReason::NewRelease { remote, local } => {
                write!(f, "new release {remote} (local was {local})")
            }
            RefreshReason::ProbeFailed(e) => write!(f, "latest probe failed: {e}"),
            RefreshReason::LocalIndexUnavailable(e) => write!(f, "local index unavailable: {e}"),
            RefreshReason::LocalIndexEmpty => f.write_str("local index is empty"),
        }
    }
}

/// Result of the `Checking` phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    UpToDate {
        version: String,
    },
    Refresh {
        reason: RefreshReason,
        /// Local full index, when it could be read
        previous: Option<ReleaseCollection>,
    },
}

impl Decision {
    pub fn needs_refresh(&self) -> bool {
        matches!(self, Decision::Refresh { .. })
    }
}

/// What a completed refresh wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshSummary {
    pub reason: RefreshReason,
    pub full_count: usize,
    pub smart_count: usize,
    /// Changes against the previous full index, when it was readable
    pub diff: Option<ReleaseDiff>,
}

impl RefreshSummary {
    /// Whether the refresh ran without being able to verify staleness.
    pub fn is_degraded(&self) -> bool {
        matches!(self.reason, RefreshReason::ProbeFailed(_))
    }
}

/// Outcome of a successful update cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    UpToDate { version: String },
    Refreshed(RefreshSummary),
}

/// Drives one update cycle against a release source and index storage.
pub struct Updater<'a> {
    source: &'a dyn ReleaseSource,
    storage: &'a dyn IndexStorage,
    filter: SmartFilter,
    state: UpdateState,
}

impl<'a> Updater<'a> {
    pub fn new(
        source: &'a dyn ReleaseSource,
        storage: &'a dyn IndexStorage,
        filter: SmartFilter,
    ) -> Self {
        Self {
            source,
            storage,
            filter,
            state: UpdateState::Idle,
        }
    }

    pub fn state(&self) -> UpdateState {
        self.state
    }

    fn transition(&mut self, next: UpdateState) {
        log::debug!("Update state: {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Run one full cycle: check, and refresh both slots if stale.
    pub async fn run(&mut self) -> Result<UpdateOutcome> {
        let outcome = match self.check().await {
            Decision::UpToDate { version } => Ok(UpdateOutcome::UpToDate { version }),
            Decision::Refresh { reason, previous } => self
                .refresh(reason, previous)
                .await
                .map(UpdateOutcome::Refreshed),
        };

        if outcome.is_err() {
            self.transition(UpdateState::Failed);
        }
        outcome
    }

    /// Decide whether a refresh is needed.
    ///
    /// Never fails: probe and read errors resolve to a refresh.
    pub async fn check(&mut self) -> Decision {
        self.transition(UpdateState::Checking);

        let remote = match self.source.latest_tag_name().await {
            Ok(tag) => tag,
            Err(e) => {
                log::warn!("Latest release check failed: {}. Forcing update.", e);
                return Decision::Refresh {
                    reason: RefreshReason::ProbeFailed(e.to_string()),
                    previous: None,
                };
            }
        };

        let local = match self.storage.read_index(IndexSlot::Full).await {
            Ok(local) => local,
            Err(e) => {
                log::info!("No usable local index ({}). Building from scratch.", e);
                return Decision::Refresh {
                    reason: RefreshReason::LocalIndexUnavailable(e.to_string()),
                    previous: None,
                };
            }
        };

        if local.is_empty() {
            log::info!("Local index is empty. Building from scratch.");
            return Decision::Refresh {
                reason: RefreshReason::LocalIndexEmpty,
                previous: Some(local),
            };
        }

        if remote == local.latest_version() {
            log::info!("Current version ({}) matches the remote.", remote);
            self.transition(UpdateState::UpToDate);
            return Decision::UpToDate { version: remote };
        }

        let reason = RefreshReason::NewRelease {
            remote,
            local: local.latest_version().to_string(),
        };
        log::info!("Found {}", reason);
        Decision::Refresh {
            reason,
            previous: Some(local),
        }
    }

    async fn refresh(
        &mut self,
        reason: RefreshReason,
        previous: Option<ReleaseCollection>,
    ) -> Result<RefreshSummary> {
        self.transition(UpdateState::Refreshing);
        log::info!("Updating indexes...");

        let full = self.source.fetch_all().await?;
        if full.is_empty() {
            log::warn!("Remote listing has no releases with an archive.");
        }
        self.storage.save_index(IndexSlot::Full, &full).await?;

        let smart = self.filter.apply(&full);
        self.storage.save_index(IndexSlot::Smart, &smart).await?;

        let diff = previous.map(|previous| ReleaseDiff::calculate(&previous, &full));
        if let Some(diff) = diff.as_ref().filter(|d| d.has_changes()) {
            log::info!(
                "Diff: {} added, {} removed",
                diff.added.len(),
                diff.removed.len()
            );
        }

        self.transition(UpdateState::Persisted);
        Ok(RefreshSummary {
            reason,
            full_count: full.len(),
            smart_count: smart.len(),
            diff,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::AppError;
    use crate::models::{Release, major_line};

    struct FakeSource {
        latest: std::result::Result<String, String>,
        releases: Option<ReleaseCollection>,
        probes: AtomicUsize,
        fetches: AtomicUsize,
    }

    impl FakeSource {
        fn new(latest: &str, releases: ReleaseCollection) -> Self {
            Self {
                latest: Ok(latest.to_string()),
                releases: Some(releases),
                probes: AtomicUsize::new(0),
                fetches: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl ReleaseSource for FakeSource {
        async fn latest_tag_name(&self) -> Result<String> {
            self.probes.fetch_add(1, Ordering::SeqCst);
            self.latest
                .clone()
                .map_err(|e| AppError::probe("latest", e))
        }

        async fn fetch_all(&self) -> Result<ReleaseCollection> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            self.releases
                .clone()
                .ok_or_else(|| AppError::fetch("page 1", "HTTP 500"))
        }
    }

    #[derive(Default)]
    struct MemoryStorage {
        slots: Mutex<HashMap<IndexSlot, ReleaseCollection>>,
        fail_on: Option<IndexSlot>,
        reads: AtomicUsize,
        saves: AtomicUsize,
    }

    impl MemoryStorage {
        fn with_full(full: ReleaseCollection) -> Self {
            let storage = Self::default();
            storage.slots.lock().unwrap().insert(IndexSlot::Full, full);
            storage
        }

        fn get(&self, slot: IndexSlot) -> Option<ReleaseCollection> {
            self.slots.lock().unwrap().get(&slot).cloned()
        }
    }

    #[async_trait]
    impl IndexStorage for MemoryStorage {
        async fn read_index(&self, slot: IndexSlot) -> Result<ReleaseCollection> {
            self.reads.fetch_add(1, Ordering::SeqCst);
            self.get(slot)
                .ok_or_else(|| AppError::read(slot, "not found"))
        }

        async fn save_index(&self, slot: IndexSlot, releases: &ReleaseCollection) -> Result<()> {
            if self.fail_on == Some(slot) {
                return Err(AppError::persist(slot, "read-only filesystem"));
            }
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.slots.lock().unwrap().insert(slot, releases.clone());
            Ok(())
        }
    }

    fn listing(versions: &[&str]) -> ReleaseCollection {
        versions
            .iter()
            .map(|v| Release {
                version: v.to_string(),
                download_url: format!("https://example.com/{v}.tar.gz"),
                size: 1,
                date: "2026-02-16".to_string(),
                major: major_line(v),
            })
            .collect()
    }

    fn remote_listing() -> ReleaseCollection {
        let mut versions: Vec<String> = (1..=12).rev().map(|n| format!("GE-Proton10-{n}")).collect();
        versions.extend(["GE-Proton9-27", "GE-Proton9-26", "7.3-GE-1"].map(String::from));
        let refs: Vec<&str> = versions.iter().map(String::as_str).collect();
        listing(&refs)
    }

    #[tokio::test]
    async fn test_up_to_date_skips_fetch_and_writes() {
        let source = FakeSource::new("GE-Proton10-1", remote_listing());
        let storage = MemoryStorage::with_full(listing(&["GE-Proton10-1"]));
        let mut updater = Updater::new(&source, &storage, SmartFilter::new());

        let outcome = updater.run().await.unwrap();

        assert_eq!(
            outcome,
            UpdateOutcome::UpToDate {
                version: "GE-Proton10-1".to_string()
            }
        );
        assert_eq!(updater.state(), UpdateState::UpToDate);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
        assert_eq!(storage.saves.load(Ordering::SeqCst), 0);
        assert!(storage.get(IndexSlot::Smart).is_none());
    }

    #[tokio::test]
    async fn test_new_release_rewrites_both_slots() {
        let source = FakeSource::new("GE-Proton10-12", remote_listing());
        let storage = MemoryStorage::with_full(listing(&["GE-Proton10-11", "GE-Proton10-10"]));
        let mut updater = Updater::new(&source, &storage, SmartFilter::new());

        let outcome = updater.run().await.unwrap();

        let full = storage.get(IndexSlot::Full).unwrap();
        let smart = storage.get(IndexSlot::Smart).unwrap();
        assert_eq!(full, remote_listing());
        assert_eq!(smart, SmartFilter::new().apply(&full));
        assert_eq!(smart.len(), 12);
        assert_eq!(updater.state(), UpdateState::Persisted);

        let UpdateOutcome::Refreshed(summary) = outcome else {
            panic!("expected a refresh");
        };
        assert_eq!(
            summary.reason,
            RefreshReason::NewRelease {
                remote: "GE-Proton10-12".to_string(),
                local: "GE-Proton10-11".to_string(),
            }
        );
        assert!(!summary.is_degraded());
        assert_eq!(summary.full_count, 15);
        assert_eq!(summary.smart_count, 12);
        let diff = summary.diff.unwrap();
        assert_eq!(diff.added.len(), 13);
        assert!(diff.removed.is_empty());
    }

    #[tokio::test]
    async fn test_probe_failure_forces_degraded_refresh() {
        let mut source = FakeSource::new("", remote_listing());
        source.latest = Err("connection refused".to_string());
        let storage = MemoryStorage::with_full(listing(&["GE-Proton10-12"]));
        let mut updater = Updater::new(&source, &storage, SmartFilter::new());

        let outcome = updater.run().await.unwrap();

        let UpdateOutcome::Refreshed(summary) = outcome else {
            panic!("expected a refresh");
        };
        assert!(summary.is_degraded());
        assert!(summary.diff.is_none());
        assert_eq!(storage.reads.load(Ordering::SeqCst), 0);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 1);
        assert_eq!(storage.saves.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_local_index_forces_refresh() {
        let source = FakeSource::new("GE-Proton10-12", remote_listing());
        let storage = MemoryStorage::default();
        let mut updater = Updater::new(&source, &storage, SmartFilter::new());

        let decision = updater.check().await;

        assert!(matches!(
            decision,
            Decision::Refresh {
                reason: RefreshReason::LocalIndexUnavailable(_),
                previous: None,
            }
        ));
        assert_eq!(updater.state(), UpdateState::Checking);
        assert_eq!(source.fetches.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_local_index_forces_refresh() {
        let source = FakeSource::new("GE-Proton10-12", remote_listing());
        let storage = MemoryStorage::with_full(ReleaseCollection::default());
        let mut updater = Updater::new(&source, &storage, SmartFilter::new());

        let decision = updater.check().await;
        assert!(matches!(
            decision,
            Decision::Refresh {
                reason: RefreshReason::LocalIndexEmpty,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_fetch_failure_fails_cycle_without_writes() {
        let mut source = FakeSource::new("GE-Proton10-12", ReleaseCollection::default());
        source.releases = None;
        let storage = MemoryStorage::with_full(listing(&["GE-Proton10-11"]));
        let mut updater = Updater::new(&source, &storage, SmartFilter::new());

        let result = updater.run().await;

        assert!(matches!(result, Err(AppError::Fetch { .. })));
        assert_eq!(updater.state(), UpdateState::Failed);
        assert_eq!(storage.saves.load(Ordering::SeqCst), 0);
        assert_eq!(storage.get(IndexSlot::Full).unwrap(), listing(&["GE-Proton10-11"]));
    }

    #[tokio::test]
    async fn test_smart_write_failure_keeps_full_index() {
        let source = FakeSource::new("GE-Proton10-12", remote_listing());
        let storage = MemoryStorage {
            fail_on: Some(IndexSlot::Smart),
            ..MemoryStorage::default()
        };
        let mut updater = Updater::new(&source, &storage, SmartFilter::new());

        let result = updater.run().await;

        assert!(matches!(
            result,
            Err(AppError::Persist {
                slot: IndexSlot::Smart,
                ..
            })
        ));
        assert_eq!(updater.state(), UpdateState::Failed);
        assert_eq!(storage.get(IndexSlot::Full).unwrap(), remote_listing());
    }

    #[tokio::test]
    async fn test_configured_window_is_used() {
        let source = FakeSource::new("GE-Proton10-12", remote_listing());
        let storage = MemoryStorage::default();
        let mut updater = Updater::new(&source, &storage, SmartFilter::with_keep_recent(3));

        updater.run().await.unwrap();

        let smart = storage.get(IndexSlot::Smart).unwrap();
        let versions: Vec<_> = smart.iter().map(|r| r.version.as_str()).collect();
        assert_eq!(
            versions,
            vec!["GE-Proton10-12", "GE-Proton10-11", "GE-Proton10-10", "GE-Proton9-27", "7.3-GE-1"]
        );
    }
}
