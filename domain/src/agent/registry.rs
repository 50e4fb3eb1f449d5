//! Agent registry - catalog of agents with availability and success history.
//!
//! The registry is the only cross-round shared mutable state in the engine.
//! Availability flips when a round leases agents and when it releases them;
//! success rates change when a consensus resolves. Both happen at round
//! boundaries only.

use super::entities::{Agent, VoteRecord};
use super::selection::{normalize_requirements, rank_candidates};
use super::value_objects::{AgentId, DeploymentTier};
use crate::core::error::CouncilError;

#[derive(Debug, Clone)]
struct RegistryEntry {
    agent: Agent,
    available: bool,
}

/// Catalog of agents, in registration order.
#[derive(Debug, Clone, Default)]
pub struct AgentRegistry {
    entries: Vec<RegistryEntry>,
    tier: DeploymentTier,
}

impl AgentRegistry {
    pub fn new(tier: DeploymentTier) -> Self {
        Self {
            entries: Vec::new(),
            tier,
        }
    }

    pub fn with_agents(tier: DeploymentTier, agents: impl IntoIterator<Item = Agent>) -> Self {
        let mut registry = Self::new(tier);
        for agent in agents {
            registry.register(agent);
        }
        registry
    }

    /// Register an agent. Re-registering an id replaces the agent in place
    /// and keeps its position. Returns `true` if the id was new.
    pub fn register(&mut self, agent: Agent) -> bool {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.agent.id == agent.id) {
            entry.agent = agent;
            false
        } else {
            self.entries.push(RegistryEntry {
                agent,
                available: true,
            });
            true
        }
    }

    pub fn tier(&self) -> DeploymentTier {
        self.tier
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.entries.iter().find(|e| e.agent.id == *id).map(|e| &e.agent)
    }

    pub fn agents(&self) -> impl Iterator<Item = &Agent> {
        self.entries.iter().map(|e| &e.agent)
    }

    pub fn is_available(&self, id: &AgentId) -> bool {
        self.entries
            .iter()
            .any(|e| e.agent.id == *id && e.available)
    }

    pub fn available_count(&self) -> usize {
        self.entries.iter().filter(|e| e.available).count()
    }

    /// Select up to `max_count` agents for a round and mark them unavailable.
    ///
    /// Only currently available agents permitted by the deployment tier are
    /// considered. The returned agents are ordered by descending score.
    pub fn select<S: AsRef<str>>(
        &mut self,
        required: &[S],
        max_count: usize,
    ) -> Result<Vec<Agent>, CouncilError> {
        if max_count == 0 {
            return Err(CouncilError::NoEligibleAgents);
        }

        let required = normalize_requirements(required);
        let ranked = rank_candidates(
            self.entries
                .iter()
                .enumerate()
                .filter(|(_, e)| e.available)
                .map(|(i, e)| (i, &e.agent)),
            &required,
            self.tier,
            max_count,
        );

        if ranked.is_empty() {
            return Err(CouncilError::NoEligibleAgents);
        }

        let mut selected = Vec::with_capacity(ranked.len());
        for (pos, _) in ranked {
            let entry = &mut self.entries[pos];
            entry.available = false;
            selected.push(entry.agent.clone());
        }
        Ok(selected)
    }

    /// Return leased agents to the pool.
    pub fn release(&mut self, ids: &[AgentId]) {
        for entry in self.entries.iter_mut() {
            if ids.contains(&entry.agent.id) {
                entry.available = true;
            }
        }
    }

    /// Apply the ballots of one consensus round.
    ///
    /// Each pair is `(voter, voted_for_winner)`. Returns the updated history
    /// of every known voter for journaling.
    pub fn record_ballots(&mut self, ballots: &[(AgentId, bool)]) -> Vec<(AgentId, f64, VoteRecord)> {
        let mut updated = Vec::with_capacity(ballots.len());
        for (voter, correct) in ballots {
            if let Some(entry) = self.entries.iter_mut().find(|e| e.agent.id == *voter) {
                entry.agent.record_ballot(*correct);
                updated.push((
                    voter.clone(),
                    entry.agent.success_rate,
                    entry.agent.vote_record,
                ));
            }
        }
        updated
    }

    /// Restore ballot history for a known agent (journal replay).
    pub fn restore_vote_record(&mut self, id: &AgentId, record: VoteRecord) -> bool {
        match self.entries.iter_mut().find(|e| e.agent.id == *id) {
            Some(entry) => {
                entry.agent.restore_vote_record(record);
                true
            }
            None => false,
        }
    }
}
