use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::sync::watch;

use crate::common::clock::{Clock, SystemClock};
use crate::common::cluster::{LocalNode, NodeRecord, NodeView};
use crate::common::error::{ClusterError, ClusterResult};
use crate::common::settings::ClusterSettings;
use crate::server::election::{elect_master, is_online, node_views};
use crate::server::scheduler::PeriodicTask;
use crate::storage::cluster_store_impl::ClusterStoreImpl;
use crate::traits::cluster_store::ClusterStore;

/// How long `stop` waits for a heartbeat cycle that is already running.
pub const STOP_GRACE: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinatorState {
    Created,
    Started,
    Stopped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CycleError {
    pub message: String,
    pub at: DateTime<Utc>,
}

/// What a heartbeat cycle publishes. Replaced as a whole, never mutated.
#[derive(Debug, Clone, Default)]
pub struct ClusterStatus {
    pub nodes: Arc<BTreeMap<String, NodeRecord>>,
    pub last_read: Option<DateTime<Utc>>,
    pub last_error: Option<CycleError>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ClusterStatistics {
    pub cycles: u64,
    pub failed_cycles: u64,
    pub writes: u64,
    pub reads: u64,
    pub purged_nodes: u64,
    pub last_cycle_millis: u64,
}

#[derive(Default)]
struct Counters {
    cycles: AtomicU64,
    failed_cycles: AtomicU64,
    writes: AtomicU64,
    reads: AtomicU64,
    purged_nodes: AtomicU64,
    last_cycle_millis: AtomicU64,
}

/// State carried from one cycle to the next; its mutex also keeps cycles
/// from overlapping.
#[derive(Default)]
struct CycleMemory {
    master: Option<String>,
    drifted: BTreeSet<String>,
}

struct Shared {
    store: ClusterStoreImpl,
    settings: ClusterSettings,
    local: LocalNode,
    clock: Arc<dyn Clock>,
    status: watch::Sender<Arc<ClusterStatus>>,
    counters: Counters,
    cycle: tokio::sync::Mutex<CycleMemory>,
    stopped: AtomicBool,
}

struct Lifecycle {
    state: CoordinatorState,
    task: Option<PeriodicTask>,
}

/// Runs the heartbeat cycle against a shared store and answers membership
/// questions from the last published snapshot.
pub struct ClusterCoordinator {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl ClusterCoordinator {
    pub fn new(store: ClusterStoreImpl, settings: ClusterSettings, local: LocalNode) -> Self {
        Self::with_clock(store, settings, local, Arc::new(SystemClock))
    }

    pub fn with_clock(
        store: ClusterStoreImpl,
        settings: ClusterSettings,
        local: LocalNode,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (status, _) = watch::channel(Arc::new(ClusterStatus::default()));
        Self {
            shared: Arc::new(Shared {
                store,
                settings,
                local,
                clock,
                status,
                counters: Counters::default(),
                cycle: tokio::sync::Mutex::new(CycleMemory::default()),
                stopped: AtomicBool::new(false),
            }),
            lifecycle: Mutex::new(Lifecycle {
                state: CoordinatorState::Created,
                task: None,
            }),
        }
    }

    /// Schedules the heartbeat cycle, the first run immediately. Must be
    /// called from within a tokio runtime.
    pub fn start(&self) -> ClusterResult<()> {
        let mut lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
        if lifecycle.state != CoordinatorState::Created {
            return Err(ClusterError::IllegalState(format!(
                "cannot start a coordinator that is {:?}",
                lifecycle.state
            )));
        }
        let shared = Arc::clone(&self.shared);
        let task = PeriodicTask::spawn(
            format!("cluster-heartbeat-{}", self.shared.local.instance_id),
            self.shared.settings.heartbeat_interval(),
            Duration::ZERO,
            move || {
                let shared = Arc::clone(&shared);
                async move {
                    heartbeat_cycle(&shared).await;
                }
            },
        );
        lifecycle.task = Some(task);
        lifecycle.state = CoordinatorState::Started;
        log::info!(
            "Cluster coordinator started for instance {} using {} storage (heartbeat {:?}, timeout {:?}, purge {:?})",
            self.shared.local.instance_id,
            self.shared.store.kind(),
            self.shared.settings.heartbeat_interval(),
            self.shared.settings.node_timeout(),
            self.shared.settings.node_purge_interval(),
        );
        Ok(())
    }

    /// Cancels future cycles and waits briefly for one in flight. Stopping is
    /// terminal; calling it again is a no-op.
    pub async fn stop(&self) {
        let task = {
            let mut lifecycle = self.lifecycle.lock().unwrap_or_else(|e| e.into_inner());
            if lifecycle.state == CoordinatorState::Stopped {
                return;
            }
            lifecycle.state = CoordinatorState::Stopped;
            self.shared.stopped.store(true, Ordering::SeqCst);
            lifecycle.task.take()
        };
        if let Some(task) = task {
            task.cancel(STOP_GRACE).await;
        }
        log::info!("Cluster coordinator stopped for instance {}", self.shared.local.instance_id);
    }

    pub fn state(&self) -> CoordinatorState {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner()).state
    }

    /// Runs one heartbeat cycle now. Serialised with scheduled cycles.
    /// Returns true when every step succeeded; a stopped coordinator never
    /// touches storage again and always returns false.
    pub async fn run_cycle(&self) -> bool {
        heartbeat_cycle(&self.shared).await
    }

    pub fn status(&self) -> Arc<ClusterStatus> {
        Arc::clone(&self.shared.status.borrow())
    }

    /// Receives every status the heartbeat cycle publishes.
    pub fn subscribe(&self) -> watch::Receiver<Arc<ClusterStatus>> {
        self.shared.status.subscribe()
    }

    pub fn master(&self) -> Option<String> {
        let status = self.status();
        elect_master(status.nodes.values(), self.shared.clock.now(), self.shared.settings.node_timeout())
            .map(|record| record.instance_id.clone())
    }

    pub fn is_master(&self) -> bool {
        self.master().as_deref() == Some(self.shared.local.instance_id.as_str())
    }

    pub fn nodes(&self) -> Vec<NodeView> {
        let status = self.status();
        node_views(
            &status.nodes,
            &self.shared.local.config_hash,
            self.shared.clock.now(),
            self.shared.settings.node_timeout(),
        )
    }

    pub fn last_error(&self) -> Option<CycleError> {
        self.status().last_error.clone()
    }

    pub fn statistics(&self) -> ClusterStatistics {
        let c = &self.shared.counters;
        ClusterStatistics {
            cycles: c.cycles.load(Ordering::Relaxed),
            failed_cycles: c.failed_cycles.load(Ordering::Relaxed),
            writes: c.writes.load(Ordering::Relaxed),
            reads: c.reads.load(Ordering::Relaxed),
            purged_nodes: c.purged_nodes.load(Ordering::Relaxed),
            last_cycle_millis: c.last_cycle_millis.load(Ordering::Relaxed),
        }
    }

    pub fn local_node(&self) -> &LocalNode {
        &self.shared.local
    }

    pub fn settings(&self) -> &ClusterSettings {
        &self.shared.settings
    }
}

async fn heartbeat_cycle(shared: &Shared) -> bool {
    let mut memory = shared.cycle.lock().await;
    if shared.stopped.load(Ordering::SeqCst) {
        log::debug!("Skipping heartbeat cycle of stopped instance {}", shared.local.instance_id);
        return false;
    }
    let started = Instant::now();
    let counters = &shared.counters;
    let previous = Arc::clone(&shared.status.borrow());

    let now = shared.clock.now();
    let record = shared.local.heartbeat(now);
    let mut failure: Option<ClusterError> = None;
    let mut fresh: Option<BTreeMap<String, NodeRecord>> = None;

    match shared.store.write(&record).await {
        Ok(()) => {
            counters.writes.fetch_add(1, Ordering::Relaxed);

            match shared.store.read_all().await {
                Ok(nodes) => {
                    counters.reads.fetch_add(1, Ordering::Relaxed);
                    fresh = Some(nodes);
                }
                Err(e) => {
                    log::warn!("Cluster heartbeat read failed: {}", e);
                    failure = Some(e);
                }
            }

            let purge_interval = shared.settings.node_purge_interval();
            match shared.store.purge_older_than(purge_interval, now).await {
                Ok(purged) => {
                    if purged > 0 {
                        log::info!("Purged {} stale cluster node record(s)", purged);
                        counters.purged_nodes.fetch_add(purged as u64, Ordering::Relaxed);
                        if let Some(nodes) = fresh.as_mut() {
                            nodes.retain(|_, r| !r.is_older_than(purge_interval, now));
                        }
                    }
                }
                Err(e) => {
                    log::warn!("Cluster heartbeat purge failed: {}", e);
                    failure.get_or_insert(e);
                }
            }
        }
        Err(e) => {
            log::warn!("Cluster heartbeat write failed, keeping previous membership view: {}", e);
            failure = Some(e);
        }
    }

    if let Some(nodes) = &fresh {
        observe_membership(shared, &mut memory, nodes, now);
    }

    let ok = failure.is_none();
    let last_read = if fresh.is_some() { Some(now) } else { previous.last_read };
    let next = ClusterStatus {
        nodes: match fresh {
            Some(nodes) => Arc::new(nodes),
            None => Arc::clone(&previous.nodes),
        },
        last_read,
        last_error: failure.map(|e| CycleError {
            message: e.to_string(),
            at: now,
        }),
    };
    if ok && previous.last_error.is_some() {
        log::info!("Cluster heartbeat recovered");
    }
    shared.status.send_replace(Arc::new(next));

    counters.cycles.fetch_add(1, Ordering::Relaxed);
    if !ok {
        counters.failed_cycles.fetch_add(1, Ordering::Relaxed);
    }
    counters
        .last_cycle_millis
        .store(started.elapsed().as_millis() as u64, Ordering::Relaxed);
    log::debug!("Cluster heartbeat cycle finished in {:?} (ok: {})", started.elapsed(), ok);
    ok
}

/// Logs mastership changes of the local instance and configuration drift.
fn observe_membership(
    shared: &Shared,
    memory: &mut CycleMemory,
    nodes: &BTreeMap<String, NodeRecord>,
    now: DateTime<Utc>,
) {
    let timeout = shared.settings.node_timeout();
    let local_id = shared.local.instance_id.as_str();

    let master = elect_master(nodes.values(), now, timeout).map(|r| r.instance_id.clone());
    if master != memory.master {
        let was_local = memory.master.as_deref() == Some(local_id);
        let is_local = master.as_deref() == Some(local_id);
        if is_local && !was_local {
            log::info!("Instance {} is now the cluster master", local_id);
        } else if was_local && !is_local {
            log::info!("Instance {} is no longer the cluster master (now {:?})", local_id, master);
        } else {
            log::debug!("Cluster master changed to {:?}", master);
        }
        memory.master = master;
    }

    let drifted: BTreeSet<String> = nodes
        .values()
        .filter(|r| is_online(r, now, timeout) && r.config_hash != shared.local.config_hash)
        .map(|r| r.instance_id.clone())
        .collect();
    if drifted != memory.drifted {
        if drifted.is_empty() {
            log::info!("All online cluster nodes share this instance's configuration");
        } else {
            log::warn!(
                "Cluster nodes {:?} run a configuration that differs from instance {}",
                drifted, local_id
            );
        }
        memory.drifted = drifted;
    }
}
