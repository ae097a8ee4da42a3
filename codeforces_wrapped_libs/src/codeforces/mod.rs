pub mod client;
pub mod fetch;
pub mod model;

pub use client::{CodeforcesApi, CodeforcesClient, CodeforcesError};
pub use fetch::{DatasetFetcher, Datasets};
