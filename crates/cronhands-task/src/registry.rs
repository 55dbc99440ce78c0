//! Concurrent job registry.

use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::job::{Job, JobId};

/// Thread-safe mapping from job id to live job.
///
/// Mutations are per-entry: insert only fills a vacant slot and remove only
/// succeeds while the slot still holds the expected job, so a concurrent
/// restart cannot lose an update.
#[derive(Debug, Default)]
pub struct JobRegistry {
    jobs: DashMap<JobId, Arc<Job>>,
}

impl JobRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job if its id is vacant. Returns whether it was inserted.
    pub fn insert(&self, job: Arc<Job>) -> bool {
        match self.jobs.entry(job.id()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(job);
                true
            }
        }
    }

    /// Get a job by id.
    pub fn get(&self, id: JobId) -> Option<Arc<Job>> {
        self.jobs.get(&id).map(|entry| entry.value().clone())
    }

    /// Whether a job with this id is registered.
    pub fn contains(&self, id: JobId) -> bool {
        self.jobs.contains_key(&id)
    }

    /// Remove the job only if the entry is still `expected`.
    pub fn remove(&self, id: JobId, expected: &Arc<Job>) -> bool {
        self.jobs
            .remove_if(&id, |_, current| Arc::ptr_eq(current, expected))
            .is_some()
    }

    /// Snapshot of `(id, cron expression)` pairs, in no particular order.
    pub fn list_all(&self) -> Vec<(JobId, String)> {
        self.jobs
            .iter()
            .map(|entry| (*entry.key(), entry.value().cron_expression().to_string()))
            .collect()
    }

    /// Snapshot of every live job.
    pub fn jobs(&self) -> Vec<Arc<Job>> {
        self.jobs.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Remove and return every job.
    pub fn drain(&self) -> Vec<Arc<Job>> {
        let ids: Vec<JobId> = self.jobs.iter().map(|entry| *entry.key()).collect();
        ids.into_iter()
            .filter_map(|id| self.jobs.remove(&id).map(|(_, job)| job))
            .collect()
    }

    /// Number of live jobs.
    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
