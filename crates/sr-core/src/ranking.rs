//! Season ranking.
//!
//! A season's score is the mean of its numeric episode ratings. Seasons are
//! ordered best first; equal scores keep ascending season-number order.

use std::cmp::Ordering;

use crate::model::{Episode, RankedSeason, Season};

/// Mean of the parseable ratings in `episodes`, or `0.0` when there are none.
pub fn season_score(episodes: &[Episode]) -> f64 {
    let (total, count) = episodes
        .iter()
        .filter_map(|ep| ep.rating.value())
        .fold((0.0_f64, 0_u32), |(total, count), value| {
            (total + value, count + 1)
        });

    if count == 0 {
        0.0
    } else {
        total / f64::from(count)
    }
}

/// Score every season and sort them by score, highest first.
pub fn rank(seasons: Vec<Season>) -> Vec<RankedSeason> {
    let mut ranked: Vec<RankedSeason> = seasons
        .into_iter()
        .map(|season| RankedSeason {
            season_number: season.season_number,
            score: season_score(&season.episodes),
            episodes: season.episodes,
        })
        .collect();

    ranked.sort_by(compare_ranked);
    ranked
}

fn compare_ranked(a: &RankedSeason, b: &RankedSeason) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.season_number.cmp(&b.season_number))
}
