//! Council engine
//!
//! The [`Engine`] owns the agent registry, the performance ledger and every
//! running task loop. There are no globals: each engine is an explicit
//! context with a `build()` / [`Engine::shutdown`] lifecycle.
//!
//! Each loop runs as its own tokio task with a child of the engine's
//! cancellation token, so stopping one loop or shutting the engine down
//! aborts in-flight requests, releases leased agents and skips pending
//! timers.

use crate::config::{EngineConfig, LoopOptions};
use crate::ports::agent_gateway::AgentGateway;
use crate::ports::progress::{NoProgress, ProgressNotifier};
use crate::ports::resources::{FixedJitter, JitterSource, ResourceSnapshotProvider};
use crate::ports::state_journal::{JournalEntry, NoJournal, StateJournal};
use crate::use_cases::shared::lock;
use crate::use_cases::task_loop::{EngineShared, LoopStatus, TaskLoop};
use council_domain::{
    Agent, AgentRegistry, CouncilError, PerformanceLedger, ResourceSnapshot, RoundOutcome, Task,
    TaskLoopId,
};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Availability derived from the share of agents not leased to a round.
pub struct PoolResources {
    registry: Arc<Mutex<AgentRegistry>>,
}

impl ResourceSnapshotProvider for PoolResources {
    fn snapshot(&self) -> ResourceSnapshot {
        let registry = lock(&self.registry);
        ResourceSnapshot::from_pool(registry.available_count(), registry.len())
    }
}

/// What a journal replay restored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RestoreSummary {
    pub outcomes: usize,
    pub agents: usize,
    /// Agent records naming agents that are no longer configured
    pub skipped: usize,
}

struct LoopHandle {
    token: CancellationToken,
    status: watch::Receiver<LoopStatus>,
    join: Option<JoinHandle<()>>,
}

/// Builder for [`Engine`]
pub struct EngineBuilder<G: AgentGateway + 'static> {
    gateway: Arc<G>,
    registry: AgentRegistry,
    config: EngineConfig,
    progress: Arc<dyn ProgressNotifier>,
    journal: Arc<dyn StateJournal>,
    resources: Option<Arc<dyn ResourceSnapshotProvider>>,
    jitter: Arc<dyn JitterSource>,
}

impl<G: AgentGateway + 'static> EngineBuilder<G> {
    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_progress(mut self, progress: Arc<dyn ProgressNotifier>) -> Self {
        self.progress = progress;
        self
    }

    pub fn with_journal(mut self, journal: Arc<dyn StateJournal>) -> Self {
        self.journal = journal;
        self
    }

    /// Replace the default pool-based availability.
    pub fn with_resources(mut self, resources: Arc<dyn ResourceSnapshotProvider>) -> Self {
        self.resources = Some(resources);
        self
    }

    pub fn with_jitter(mut self, jitter: Arc<dyn JitterSource>) -> Self {
        self.jitter = jitter;
        self
    }

    pub fn build(self) -> Engine<G> {
        let registry = Arc::new(Mutex::new(self.registry));
        let resources = self.resources.unwrap_or_else(|| {
            Arc::new(PoolResources {
                registry: Arc::clone(&registry),
            })
        });
        let ledger = PerformanceLedger::new(self.config.ledger_capacity);

        Engine {
            shared: Arc::new(EngineShared {
                gateway: self.gateway,
                registry,
                ledger: Mutex::new(ledger),
                config: self.config,
                progress: self.progress,
                journal: self.journal,
                resources,
                jitter: self.jitter,
            }),
            root_token: CancellationToken::new(),
            loops: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

/// Collaborative consensus engine
pub struct Engine<G: AgentGateway + 'static> {
    shared: Arc<EngineShared<G>>,
    root_token: CancellationToken,
    loops: Mutex<HashMap<TaskLoopId, LoopHandle>>,
    next_id: AtomicU64,
}

impl<G: AgentGateway + 'static> Engine<G> {
    pub fn builder(gateway: Arc<G>, registry: AgentRegistry) -> EngineBuilder<G> {
        EngineBuilder {
            gateway,
            registry,
            config: EngineConfig::default(),
            progress: Arc::new(NoProgress),
            journal: Arc::new(NoJournal),
            resources: None,
            jitter: Arc::new(FixedJitter(1.0)),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Rebuild ledger history and agent success rates from journal entries.
    ///
    /// Later entries win. New loop ids continue after the highest replayed id.
    pub fn restore(&self, entries: &[JournalEntry]) -> RestoreSummary {
        let mut summary = RestoreSummary::default();
        {
            let mut ledger = lock(&self.shared.ledger);
            let mut registry = lock(&self.shared.registry);
            for entry in entries {
                match entry {
                    JournalEntry::RoundOutcome { outcome } => {
                        ledger.record(outcome.clone());
                        summary.outcomes += 1;
                    }
                    JournalEntry::AgentSuccessRate {
                        agent_id,
                        vote_record,
                        ..
                    } => {
                        if registry.restore_vote_record(agent_id, *vote_record) {
                            summary.agents += 1;
                        } else {
                            summary.skipped += 1;
                        }
                    }
                }
            }
            if let Some(max) = ledger.max_loop_id() {
                self.next_id.fetch_max(max.value() + 1, Ordering::SeqCst);
            }
        }
        info!(
            "Restored {} outcomes and {} agent records ({} skipped)",
            summary.outcomes, summary.agents, summary.skipped
        );
        summary
    }

    /// Start a task loop and return its id.
    ///
    /// Must be called within a tokio runtime.
    pub fn submit_task(&self, task: Task, options: LoopOptions) -> Result<TaskLoopId, CouncilError> {
        if self.root_token.is_cancelled() {
            return Err(CouncilError::Cancelled);
        }
        if options.max_agents == 0 {
            return Err(CouncilError::InvalidTask(
                "max_agents must be at least 1".to_string(),
            ));
        }
        if options.per_agent_timeout.is_zero() {
            return Err(CouncilError::InvalidTask(
                "per-agent timeout must be positive".to_string(),
            ));
        }

        let id = TaskLoopId::new(self.next_id.fetch_add(1, Ordering::SeqCst));
        let token = self.root_token.child_token();
        let (status_tx, status_rx) =
            watch::channel(LoopStatus::new(id, task.id.clone(), options.max_agents));

        info!("Submitting {} for task {}", id, task.id);
        let task_loop = TaskLoop {
            id,
            task,
            options,
            shared: Arc::clone(&self.shared),
            token: token.clone(),
            status: status_tx,
        };
        let join = tokio::spawn(task_loop.run());

        lock(&self.loops).insert(
            id,
            LoopHandle {
                token,
                status: status_rx,
                join: Some(join),
            },
        );
        Ok(id)
    }

    /// Latest status of a loop, with the next-round ETA counted down to now
    pub fn loop_status(&self, id: TaskLoopId) -> Option<LoopStatus> {
        let now = Instant::now();
        lock(&self.loops)
            .get(&id)
            .map(|handle| handle.status.borrow().remaining_at(now))
    }

    /// Subscribe to status changes of a loop
    pub fn watch_loop(&self, id: TaskLoopId) -> Option<watch::Receiver<LoopStatus>> {
        lock(&self.loops).get(&id).map(|handle| handle.status.clone())
    }

    /// Wait until a loop reaches a terminal state and return that status.
    pub async fn wait_for(&self, id: TaskLoopId) -> Option<LoopStatus> {
        let mut rx = self.watch_loop(id)?;
        let waited = rx
            .wait_for(|s| s.state.is_terminal())
            .await
            .map(|status| status.clone());
        let status = match waited {
            Ok(status) => status,
            // loop task ended without a terminal update
            Err(_) => rx.borrow().clone(),
        };
        Some(status)
    }

    /// Request a loop to stop. Returns false for unknown ids.
    pub fn stop_loop(&self, id: TaskLoopId) -> bool {
        match lock(&self.loops).get(&id) {
            Some(handle) => {
                debug!("Stopping {}", id);
                handle.token.cancel();
                true
            }
            None => false,
        }
    }

    /// Drop a finished loop and its ledger history.
    ///
    /// Returns false for unknown ids and for loops that are still running.
    pub fn forget(&self, id: TaskLoopId) -> bool {
        let mut loops = lock(&self.loops);
        let finished = loops
            .get(&id)
            .is_some_and(|handle| handle.status.borrow().state.is_terminal());
        if !finished {
            return false;
        }
        loops.remove(&id);
        drop(loops);
        lock(&self.shared.ledger).forget(id);
        debug!("Forgot {}", id);
        true
    }

    /// Ids of all submitted loops, in submission order
    pub fn loop_ids(&self) -> Vec<TaskLoopId> {
        let mut ids: Vec<TaskLoopId> = lock(&self.loops).keys().copied().collect();
        ids.sort();
        ids
    }

    /// Outcomes recorded for a loop, oldest first
    pub fn ledger_history(&self, id: TaskLoopId) -> Vec<RoundOutcome> {
        lock(&self.shared.ledger).history(id)
    }

    /// Snapshot of the registry with each agent's availability
    pub fn agents(&self) -> Vec<(Agent, bool)> {
        let registry = lock(&self.shared.registry);
        registry
            .agents()
            .map(|a| (a.clone(), registry.is_available(&a.id)))
            .collect()
    }

    /// Stop every loop and wait for their tasks to finish.
    pub async fn shutdown(&self) {
        info!("Shutting down engine");
        self.root_token.cancel();
        let joins: Vec<JoinHandle<()>> = lock(&self.loops)
            .values_mut()
            .filter_map(|handle| handle.join.take())
            .collect();
        futures::future::join_all(joins).await;
    }
}
