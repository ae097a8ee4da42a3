use crate::{
    codeforces::{CodeforcesError, DatasetFetcher},
    stats::{StatsAggregator, StatsError, WrappedStats},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum WrappedError {
    #[error("failed to fetch data from Codeforces API")]
    UpstreamFailure(#[from] CodeforcesError),
    #[error("{0}")]
    ComputationError(#[from] StatsError),
}

/// Fetches the datasets of a handle and aggregates them into [`WrappedStats`].
///
/// The handle must already be validated.
pub struct WrappedGenerator {
    fetcher: DatasetFetcher,
}

impl WrappedGenerator {
    pub fn new(fetcher: DatasetFetcher) -> Self {
        Self { fetcher }
    }

    pub async fn generate(&self, handle: &str) -> Result<WrappedStats, WrappedError> {
        let datasets = self.fetcher.fetch(handle).await?;

        let aggregator = StatsAggregator::for_current_year();
        let stats = aggregator.aggregate(
            &datasets.profile,
            &datasets.submissions,
            &datasets.contests,
            datasets.reference_rating,
        )?;

        Ok(stats)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::codeforces::{client::Result, model::*, CodeforcesApi};
    use async_trait::async_trait;
    use std::sync::Arc;

    struct StaticCodeforces {
        reference_rating: i64,
    }

    #[async_trait]
    impl CodeforcesApi for StaticCodeforces {
        async fn user_info(&self, handle: &str) -> Result<CodeforcesUser> {
            let rating = if handle == "tourist" {
                self.reference_rating
            } else {
                1900
            };
            Ok(CodeforcesUser {
                handle: String::from(handle),
                rating: Some(rating),
                rank: Some(String::from("candidate master")),
                max_rank: Some(String::from("candidate master")),
            })
        }

        async fn user_status(&self, _handle: &str) -> Result<Vec<CodeforcesSubmission>> {
            Ok(vec![])
        }

        async fn user_rating(&self, _handle: &str) -> Result<Vec<CodeforcesRatingChange>> {
            Ok(vec![])
        }
    }

    fn generator(reference_rating: i64) -> WrappedGenerator {
        let api = Arc::new(StaticCodeforces { reference_rating });
        WrappedGenerator::new(DatasetFetcher::new(api, "tourist", 2))
    }

    #[tokio::test]
    async fn test_generate() {
        let stats = generator(3800).generate("alice").await.unwrap();

        assert_eq!(stats.username, "alice");
        assert_eq!(stats.current_rank, Some(String::from("candidate master")));
        assert_eq!(stats.global_percentile, Some(String::from("Top 50.00%")));
        assert_eq!(stats.total_problems_solved, 0);
    }

    #[tokio::test]
    async fn test_zero_reference_rating_is_a_computation_error() {
        let result = generator(0).generate("alice").await;

        assert!(matches!(
            result,
            Err(WrappedError::ComputationError(StatsError::ZeroReferenceRating))
        ));
    }
}
