use crate::{
    codeforces::client::{CodeforcesApi, CodeforcesError, Result},
    stats::{ContestResult, Submission, UserProfile},
};
use std::{future::Future, sync::Arc};
use tokio::sync::Semaphore;

/// Everything the aggregator needs for one handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Datasets {
    pub profile: UserProfile,
    pub submissions: Vec<Submission>,
    pub contests: Vec<ContestResult>,
    pub reference_rating: i64,
}

/// Fetches the four datasets of a request concurrently.
///
/// Each call holds a permit of a per-request pool of `workers` permits. The join is
/// all-or-nothing: the first failure is returned and the calls still pending are dropped.
pub struct DatasetFetcher {
    api: Arc<dyn CodeforcesApi>,
    reference_handle: String,
    workers: usize,
}

impl DatasetFetcher {
    pub fn new(api: Arc<dyn CodeforcesApi>, reference_handle: &str, workers: usize) -> Self {
        Self {
            api,
            reference_handle: String::from(reference_handle),
            workers: workers.max(1),
        }
    }

    pub async fn fetch(&self, handle: &str) -> Result<Datasets> {
        let pool = Semaphore::new(self.workers);

        let (user, submissions, contests, reference) = tokio::try_join!(
            with_permit(&pool, self.api.user_info(handle)),
            with_permit(&pool, self.api.user_status(handle)),
            with_permit(&pool, self.api.user_rating(handle)),
            with_permit(&pool, self.api.user_info(&self.reference_handle)),
        )?;

        let reference_rating = reference
            .rating
            .ok_or_else(|| CodeforcesError::MissingReferenceRating(reference.handle.clone()))?;

        tracing::debug!(
            "fetched {} submissions and {} rating changes of {}",
            submissions.len(),
            contests.len(),
            handle
        );

        Ok(Datasets {
            profile: user.into(),
            submissions: submissions.into_iter().map(Submission::from).collect(),
            contests: contests.into_iter().map(ContestResult::from).collect(),
            reference_rating,
        })
    }
}

async fn with_permit<T>(pool: &Semaphore, task: impl Future<Output = Result<T>>) -> Result<T> {
    let _permit = pool
        .acquire()
        .await
        .map_err(|e| CodeforcesError::UnexpectedError(e.to_string()))?;
    task.await
}
