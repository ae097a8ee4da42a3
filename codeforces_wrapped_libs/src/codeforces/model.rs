use crate::stats::{ContestResult, Submission, UserProfile};
use serde::{Deserialize, Serialize};

pub const STATUS_OK: &str = "OK";
pub const VERDICT_ACCEPTED: &str = "OK";

/// Envelope wrapping every response of the Codeforces API.
///
/// `comment` is set only when `status` is `FAILED`.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct CodeforcesResponse<T> {
    pub status: String,
    pub comment: Option<String>,
    pub result: Option<T>,
}

impl<T> CodeforcesResponse<T> {
    pub fn is_ok(&self) -> bool {
        self.status == STATUS_OK
    }
}

/// Model of an element of `user.info` result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesUser {
    pub handle: String,
    pub rating: Option<i64>,
    pub rank: Option<String>,
    pub max_rank: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesProblem {
    pub contest_id: Option<i64>,
    pub problemset_name: Option<String>,
    pub index: String,
    pub name: String,
    pub rating: Option<i64>,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl CodeforcesProblem {
    /// `<contestId>-<index>`, falling back to the problemset name for problems outside contests.
    pub fn problem_id(&self) -> String {
        let prefix = self
            .contest_id
            .map(|contest_id| contest_id.to_string())
            .or_else(|| self.problemset_name.clone())
            .unwrap_or_default();
        format!("{}-{}", prefix, self.index)
    }
}

/// Model of an element of `user.status` result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesSubmission {
    pub creation_time_seconds: i64,
    pub problem: CodeforcesProblem,
    /// Absent while the submission is still being judged.
    pub verdict: Option<String>,
}

/// Model of an element of `user.rating` result.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CodeforcesRatingChange {
    pub contest_id: i64,
    pub contest_name: String,
    pub handle: String,
    pub rank: i64,
    pub rating_update_time_seconds: i64,
    pub old_rating: i64,
    pub new_rating: i64,
}

impl From<CodeforcesUser> for UserProfile {
    fn from(value: CodeforcesUser) -> Self {
        Self {
            handle: value.handle,
            rank: value.rank,
            max_rank: value.max_rank,
            rating: value.rating,
        }
    }
}

impl From<CodeforcesSubmission> for Submission {
    fn from(value: CodeforcesSubmission) -> Self {
        Self {
            problem_id: value.problem.problem_id(),
            accepted: value.verdict.as_deref() == Some(VERDICT_ACCEPTED),
            timestamp: value.creation_time_seconds,
            tags: value.problem.tags,
        }
    }
}

impl From<CodeforcesRatingChange> for ContestResult {
    fn from(value: CodeforcesRatingChange) -> Self {
        Self {
            rank: value.rank,
            old_rating: value.old_rating,
            new_rating: value.new_rating,
            rating_updated_at: value.rating_update_time_seconds,
        }
    }
}
