use tracing::trace;

use crate::{Job, JobRef, JobRegistry, QueueError, QueueName, QueueResult};

/// Derives the destination queue of a job.
///
/// Order: a name is first looked up in the registry (a miss is not an
/// error), then the job's declared queue, then its `queue()` accessor.
pub struct QueueResolver<'a> {
    registry: &'a JobRegistry,
}

impl<'a> QueueResolver<'a> {
    pub fn new(registry: &'a JobRegistry) -> Self {
        Self { registry }
    }

    pub fn resolve(&self, job: &JobRef) -> QueueResult<QueueName> {
        let resolved = match job {
            JobRef::Class(job) => queue_of(job.as_ref()),
            JobRef::Name(name) => match self.registry.get(name) {
                Some(job) => queue_of(job.as_ref()),
                None => {
                    trace!("job type {} is not registered", name);
                    None
                }
            },
        };

        resolved.ok_or(QueueError::NoQueue)
    }
}

/// Declared queue wins over the accessor; empty names count as absent
pub fn queue_of(job: &dyn Job) -> Option<QueueName> {
    job.declared_queue()
        .filter(|queue| !queue.is_empty())
        .or_else(|| job.queue().filter(|queue| !queue.is_empty()))
}
