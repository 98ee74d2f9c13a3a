use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::{Job, QueueError, QueueResult};

/// Registry mapping job type names to job implementations.
///
/// Stands in for looking a job class up by its name: records only carry
/// the name, and performing a record finds the job here. Entries come from
/// explicit registration or, implicitly, from enqueuing a job by value.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: HashMap<String, Arc<dyn Job>>,
    implicit: HashSet<String>,
}

impl JobRegistry {
    /// Create a new job registry
    pub fn new() -> Self {
        Self {
            jobs: HashMap::new(),
            implicit: HashSet::new(),
        }
    }

    /// Register a job type; a name can only be registered explicitly once.
    /// An implicit entry under the same name is replaced.
    pub fn register(&mut self, job: Arc<dyn Job>) -> QueueResult<()> {
        let job_type = job.job_type().to_string();

        if self.jobs.contains_key(&job_type) && !self.implicit.contains(&job_type) {
            return Err(QueueError::AlreadyRegistered(job_type));
        }

        self.implicit.remove(&job_type);
        self.jobs.insert(job_type, job);
        Ok(())
    }

    /// Remember a job enqueued by value. The latest instance replaces an
    /// earlier implicit one; explicit registrations are left alone.
    pub fn ensure(&mut self, job: &Arc<dyn Job>) {
        let job_type = job.job_type();
        if self.jobs.contains_key(job_type) && !self.implicit.contains(job_type) {
            return;
        }

        self.implicit.insert(job_type.to_string());
        self.jobs.insert(job_type.to_string(), job.clone());
    }

    /// Look up a job type by name
    pub fn get(&self, job_type: &str) -> Option<Arc<dyn Job>> {
        self.jobs.get(job_type).cloned()
    }

    /// Get all registered job types
    pub fn registered_types(&self) -> Vec<String> {
        let mut types: Vec<String> = self.jobs.keys().cloned().collect();
        types.sort();
        types
    }

    /// Forget jobs remembered from enqueues, keeping explicit registrations
    pub fn clear(&mut self) {
        for job_type in self.implicit.drain() {
            self.jobs.remove(&job_type);
        }
    }
}
