//! Job processing service for background tasks.
//!
//! A simple in-memory job queue. Push delivery batches are handed off
//! here so the HTTP response to a content-creation request never waits
//! on the messaging provider; ordering and error isolation live in this
//! module instead of being implicit in the runtime.

use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::services::push::{PushGateway, PushMessage, PushTarget};
use koinonia_db::repositories::UserRepository;

/// Maximum number of concurrent job workers.
const MAX_WORKERS: usize = 4;

/// Channel buffer size for jobs.
const JOB_BUFFER_SIZE: usize = 1000;

/// Job types that can be processed.
#[derive(Debug, Clone)]
pub enum Job {
    /// Deliver one push message to a batch of targets.
    PushBatch {
        message: PushMessage,
        targets: Vec<PushTarget>,
    },
}

/// Job sender for enqueueing jobs.
#[derive(Clone)]
pub struct JobSender {
    sender: mpsc::Sender<Job>,
}

impl JobSender {
    /// Enqueue a job for processing.
    pub async fn enqueue(&self, job: Job) -> Result<(), &'static str> {
        self.sender.send(job).await.map_err(|_| "Job queue is full")
    }

    /// Enqueue a push delivery batch.
    pub async fn push_batch(
        &self,
        message: PushMessage,
        targets: Vec<PushTarget>,
    ) -> Result<(), &'static str> {
        self.enqueue(Job::PushBatch { message, targets }).await
    }
}

/// Job worker context containing services needed for job processing.
#[derive(Clone)]
pub struct JobWorkerContext {
    pub push_gateway: PushGateway,
    pub user_repo: UserRepository,
}

/// Job processing service.
pub struct JobService {
    sender: mpsc::Sender<Job>,
    receiver: Option<mpsc::Receiver<Job>>,
}

impl JobService {
    /// Create a new job service.
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(JOB_BUFFER_SIZE);
        Self {
            sender,
            receiver: Some(receiver),
        }
    }

    /// Get a job sender for enqueueing jobs.
    #[must_use]
    pub fn sender(&self) -> JobSender {
        JobSender {
            sender: self.sender.clone(),
        }
    }

    /// Start the job processor with the given context.
    /// This consumes the receiver and spawns worker tasks.
    pub fn start(mut self, context: JobWorkerContext) {
        let Some(receiver) = self.receiver.take() else {
            warn!("Job service already started");
            return;
        };
        let context = Arc::new(context);

        tokio::spawn(async move {
            info!("Job worker starting with {} workers", MAX_WORKERS);
            run_job_processor(receiver, context).await;
            info!("Job worker stopped");
        });
    }
}

impl Default for JobService {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the job processor.
async fn run_job_processor(mut receiver: mpsc::Receiver<Job>, context: Arc<JobWorkerContext>) {
    // Use a semaphore to limit concurrent workers
    let semaphore = Arc::new(tokio::sync::Semaphore::new(MAX_WORKERS));

    while let Some(job) = receiver.recv().await {
        let permit = semaphore.clone().acquire_owned().await;
        let ctx = context.clone();

        tokio::spawn(async move {
            let _permit = permit;
            process_job(job, &ctx).await;
        });
    }
}

/// Process a single job.
async fn process_job(job: Job, context: &JobWorkerContext) {
    match job {
        Job::PushBatch { message, targets } => {
            process_push_batch(context, &message, targets).await;
        }
    }
}

/// Deliver a push batch, then clean up dead tokens best-effort.
async fn process_push_batch(
    context: &JobWorkerContext,
    message: &PushMessage,
    targets: Vec<PushTarget>,
) {
    if !context.push_gateway.is_enabled() {
        debug!("Push gateway not available, dropping batch");
        return;
    }

    let total = targets.len();
    let outcome = context.push_gateway.send_to_targets(&targets, message).await;

    debug!(
        total = total,
        success = outcome.success,
        failure = outcome.failure,
        "Push batch delivered"
    );

    // Clearing a dead token is opportunistic; a failure here must not
    // propagate anywhere.
    for dead in outcome.invalid {
        if let Err(e) = context.user_repo.clear_push_token(&dead.user_id).await {
            error!(user_id = %dead.user_id, error = %e, "Failed to clear dead push token");
        } else {
            debug!(user_id = %dead.user_id, "Cleared dead push token");
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use serde_json::json;

    #[tokio::test]
    async fn test_job_sender_enqueue() {
        let service = JobService::new();
        let sender = service.sender();

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        );
        // Disabled gateway: the worker drops batches without touching the DB
        service.start(JobWorkerContext {
            push_gateway: PushGateway::new(None),
            user_repo: UserRepository::new(db),
        });

        let result = sender
            .push_batch(
                PushMessage {
                    title: "새 공지사항".to_string(),
                    body: "본문".to_string(),
                    data: json!({"type": "notice"}),
                },
                vec![],
            )
            .await;

        assert!(result.is_ok());
    }
}
