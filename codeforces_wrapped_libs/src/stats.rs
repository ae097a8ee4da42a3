use chrono::{DateTime, Datelike, NaiveDate, TimeZone, Utc};
use itertools::Itertools;
use serde::{Serialize, Serializer};
use std::{cmp::Reverse, collections::HashMap, hash::Hash};
use thiserror::Error;

pub const NOT_AVAILABLE: &str = "N/A";
pub const MOTIVATIONAL_MESSAGE: &str = "Keep pushing your limits!";

type Result<T> = std::result::Result<T, StatsError>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StatsError {
    #[error("reference rating is zero, global percentile is undefined")]
    ZeroReferenceRating,
    #[error("timestamp {0} is out of the representable date range")]
    InvalidTimestamp(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub handle: String,
    pub rank: Option<String>,
    pub max_rank: Option<String>,
    pub rating: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// `<contestId>-<index>`
    pub problem_id: String,
    pub tags: Vec<String>,
    pub accepted: bool,
    pub timestamp: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContestResult {
    pub rank: i64,
    pub old_rating: i64,
    pub new_rating: i64,
    pub rating_updated_at: i64,
}

/// The "year in review" record returned for a handle.
///
/// Optional fields are serialized as `"N/A"` when absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WrappedStats {
    pub username: String,
    #[serde(serialize_with = "or_not_available")]
    pub current_rank: Option<String>,
    #[serde(serialize_with = "or_not_available")]
    pub max_rank: Option<String>,
    #[serde(serialize_with = "or_not_available")]
    pub highest_rank: Option<i64>,
    pub longest_streak: u32,
    pub problems_solved_this_year: usize,
    pub total_problems_solved: usize,
    #[serde(serialize_with = "or_not_available")]
    pub favorite_topic: Option<String>,
    pub contests_participated: usize,
    pub rating_improvement: i64,
    #[serde(serialize_with = "or_not_available")]
    pub best_month: Option<String>,
    pub motivational_message: String,
    #[serde(serialize_with = "or_not_available")]
    pub global_percentile: Option<String>,
    pub milestones: Vec<String>,
}

fn or_not_available<T, S>(value: &Option<T>, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    T: Serialize,
    S: Serializer,
{
    match value {
        Some(value) => value.serialize(serializer),
        None => serializer.serialize_str(NOT_AVAILABLE),
    }
}

struct MilestoneFacts {
    total_solved: usize,
    yearly_solved: usize,
    current_rank: Option<String>,
    rating: Option<i64>,
    contests_participated: usize,
    longest_streak: u32,
}

type MilestonePredicate = fn(&MilestoneFacts) -> bool;

/// Evaluated in declaration order, each one independently.
const MILESTONES: &[(MilestonePredicate, &str)] = &[
    (
        |f: &MilestoneFacts| f.total_solved >= 500,
        "Solved 500+ problems",
    ),
    (
        |f: &MilestoneFacts| {
            matches!(
                f.current_rank.as_deref(),
                Some("grandmaster" | "legendary grandmaster")
            )
        },
        "Achieved Grandmaster rank",
    ),
    (
        |f: &MilestoneFacts| f.rating.map(|rating| rating >= 3000).unwrap_or(false),
        "Reached a rating of 3000+",
    ),
    (
        |f: &MilestoneFacts| f.contests_participated >= 10,
        "Participated in 10+ contests",
    ),
    (
        |f: &MilestoneFacts| f.longest_streak >= 7,
        "Maintained a streak of 7+ days",
    ),
    (
        |f: &MilestoneFacts| f.yearly_solved >= 100,
        "Solved 100+ problems this year",
    ),
];

/// Derives [`WrappedStats`] from already fetched upstream data.
///
/// The only clock dependency is the start of the calendar year (UTC) captured at
/// construction, so the aggregator is deterministic for a fixed `now`.
#[derive(Debug, Clone, Copy)]
pub struct StatsAggregator {
    year_start: i64,
}

impl StatsAggregator {
    pub fn new(now: DateTime<Utc>) -> Self {
        let year_start = Utc
            .with_ymd_and_hms(now.year(), 1, 1, 0, 0, 0)
            .single()
            .map(|start| start.timestamp())
            .unwrap_or(i64::MIN);

        Self { year_start }
    }

    pub fn for_current_year() -> Self {
        Self::new(Utc::now())
    }

    pub fn year_start(&self) -> i64 {
        self.year_start
    }

    pub fn aggregate(
        &self,
        profile: &UserProfile,
        submissions: &[Submission],
        contests: &[ContestResult],
        reference_rating: i64,
    ) -> Result<WrappedStats> {
        let accepted: Vec<&Submission> = submissions.iter().filter(|sub| sub.accepted).collect();

        let total_solved = accepted
            .iter()
            .map(|sub| sub.problem_id.as_str())
            .unique()
            .count();
        let yearly_solved = accepted
            .iter()
            .filter(|sub| sub.timestamp >= self.year_start)
            .map(|sub| sub.problem_id.as_str())
            .unique()
            .count();

        let solved_dates = accepted
            .iter()
            .map(|sub| to_utc(sub.timestamp))
            .collect::<Result<Vec<DateTime<Utc>>>>()?;

        let longest_streak = longest_streak(solved_dates.iter().map(|date| date.date_naive()));

        let favorite_topic = most_common(
            accepted
                .iter()
                .flat_map(|sub| sub.tags.iter().map(String::as_str)),
        )
        .map(String::from);

        let best_month = most_common(
            solved_dates
                .iter()
                .map(|date| date.format("%B").to_string()),
        );

        let highest_rank = contests.iter().map(|contest| contest.rank).min();
        let contests_participated = contests.len();

        let yearly_contests: Vec<&ContestResult> = contests
            .iter()
            .filter(|contest| contest.rating_updated_at >= self.year_start)
            .collect();
        let rating_improvement = match (yearly_contests.first(), yearly_contests.last()) {
            (Some(first), Some(last)) => last.new_rating - first.old_rating,
            _ => 0,
        };

        let global_percentile = match profile.rating {
            Some(rating) => Some(global_percentile(rating, reference_rating)?),
            None => None,
        };

        let facts = MilestoneFacts {
            total_solved,
            yearly_solved,
            current_rank: profile.rank.clone(),
            rating: profile.rating,
            contests_participated,
            longest_streak,
        };
        let milestones = MILESTONES
            .iter()
            .filter(|(predicate, _)| predicate(&facts))
            .map(|(_, message)| message.to_string())
            .collect();

        Ok(WrappedStats {
            username: profile.handle.clone(),
            current_rank: profile.rank.clone(),
            max_rank: profile.max_rank.clone(),
            highest_rank,
            longest_streak,
            problems_solved_this_year: yearly_solved,
            total_problems_solved: total_solved,
            favorite_topic,
            contests_participated,
            rating_improvement,
            best_month,
            motivational_message: MOTIVATIONAL_MESSAGE.to_string(),
            global_percentile,
            milestones,
        })
    }
}

fn to_utc(timestamp: i64) -> Result<DateTime<Utc>> {
    Utc.timestamp_opt(timestamp, 0)
        .single()
        .ok_or(StatsError::InvalidTimestamp(timestamp))
}

/// Length of the longest run of consecutive calendar days.
fn longest_streak(dates: impl Iterator<Item = NaiveDate>) -> u32 {
    let days: Vec<NaiveDate> = dates.sorted().dedup().collect();
    if days.is_empty() {
        return 0;
    }

    let mut longest: u32 = 1;
    let mut current: u32 = 1;
    for (prev, next) in days.iter().tuple_windows() {
        if next.signed_duration_since(*prev).num_days() == 1 {
            current += 1;
        } else {
            current = 1;
        }
        longest = longest.max(current);
    }

    longest
}

/// Most frequent item; ties go to the item seen first.
fn most_common<T: Hash + Eq>(items: impl IntoIterator<Item = T>) -> Option<T> {
    let mut tally: HashMap<T, (usize, usize)> = HashMap::new();
    for (order, item) in items.into_iter().enumerate() {
        tally.entry(item).or_insert((0, order)).0 += 1;
    }

    tally
        .into_iter()
        .max_by_key(|(_, (count, first_seen))| (*count, Reverse(*first_seen)))
        .map(|(item, _)| item)
}

fn global_percentile(rating: i64, reference_rating: i64) -> Result<String> {
    if reference_rating == 0 {
        return Err(StatsError::ZeroReferenceRating);
    }

    let percentile = (rating as f64 / reference_rating as f64) * 100.0;
    Ok(format!("Top {:.2}%", percentile))
}
