/// Ranking subsystem
///
/// Services pull raw signals out of the graph (embeddings, SIMILAR scores,
/// counters, coordinates, timestamps); everything here is pure and
/// synchronous so it can be exercised without a database.
pub mod geo;
pub mod signals;
pub mod weights;

use crate::domain::Pagination;
use serde::Serialize;
use std::cmp::Ordering;

pub use geo::{distance_between, haversine, location_score, DistanceUnit};
pub use signals::{cosine_similarity, engagement_rate, recency_decay};
pub use weights::*;

/// An item with its combined score
#[derive(Debug, Clone, Serialize)]
pub struct Ranked<T> {
    #[serde(flatten)]
    pub item: T,
    pub score: f64,
}

/// Score every item, sort by score desc with `tie_break` on equal scores,
/// then cut the requested page.
pub fn rank_page<T, S, B>(items: Vec<T>, page: &Pagination, score: S, tie_break: B) -> Vec<Ranked<T>>
where
    S: Fn(&T) -> f64,
    B: Fn(&T, &T) -> Ordering,
{
    let scored: Vec<Ranked<T>> = items
        .into_iter()
        .map(|item| {
            let score = score(&item);
            Ranked { item, score }
        })
        .collect();
    sort_and_page(scored, page, tie_break)
}

/// Same as [`rank_page`] for items already carrying a score
pub fn sort_and_page<T, B>(mut scored: Vec<Ranked<T>>, page: &Pagination, tie_break: B) -> Vec<Ranked<T>>
where
    B: Fn(&T, &T) -> Ordering,
{
    scored.sort_by(|a, b| by_score_desc(a.score, b.score).then_with(|| tie_break(&a.item, &b.item)));
    page.apply(scored)
}

/// Drop candidates scoring under `min_score`
pub fn at_least<T>(scored: Vec<Ranked<T>>, min_score: f64) -> Vec<Ranked<T>> {
    scored.into_iter().filter(|r| r.score >= min_score).collect()
}

/// Descending order for scores; NaN ranks below every real score
pub fn by_score_desc(a: f64, b: f64) -> Ordering {
    nan_lowest(b).total_cmp(&nan_lowest(a))
}

fn nan_lowest(x: f64) -> f64 {
    if x.is_nan() {
        f64::NEG_INFINITY
    } else {
        x
    }
}

/// Ascending distance with unknown distances last
pub fn by_distance_asc(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => x.total_cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}
