//! Preference scoring and ordering of a candidate pool.
//!
//! Ordering is a stable sort by score (descending) followed by an explicit shuffle
//! inside every run of equal scores, so ties come out in a fresh order each call.

use std::collections::HashSet;

use rand::{seq::SliceRandom, Rng};

use crate::models::{Game, Recommendation};

/// Number of preference tokens found among the game's tags and genres
pub fn preference_score(game: &Game, preferences: &HashSet<&str>) -> usize {
    let descriptors: HashSet<&str> = game.descriptors().collect();
    preferences
        .iter()
        .filter(|p| descriptors.contains(*p))
        .count()
}

/// Scores every game in the pool, keeping pool order
pub fn score_pool(pool: Vec<Game>, preferences: &[String]) -> Vec<Recommendation> {
    let preferences: HashSet<&str> = preferences.iter().map(String::as_str).collect();
    pool.into_iter()
        .map(|game| {
            let score = preference_score(&game, &preferences);
            Recommendation::new(game, score)
        })
        .collect()
}

/// Shuffles each run of equal scores in an already sorted slice
pub fn shuffle_ties<R: Rng + ?Sized>(ranked: &mut [Recommendation], rng: &mut R) {
    let mut start = 0;
    while start < ranked.len() {
        let score = ranked[start].score;
        let end = ranked[start..]
            .iter()
            .position(|r| r.score != score)
            .map_or(ranked.len(), |offset| start + offset);
        ranked[start..end].shuffle(rng);
        start = end;
    }
}

/// Scores, orders and truncates the pool to `limit` results
pub fn rank<R: Rng + ?Sized>(
    pool: Vec<Game>,
    preferences: &[String],
    limit: usize,
    rng: &mut R,
) -> Vec<Recommendation> {
    let mut ranked = score_pool(pool, preferences);
    ranked.sort_by(|a, b| b.score.cmp(&a.score));
    shuffle_ties(&mut ranked, rng);
    ranked.truncate(limit);
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    fn prefs(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn game(app_id: i64, tags: &[&str], genres: &[&str]) -> Game {
        Game::new(app_id, format!("Game {app_id}"), tags, genres)
    }

    #[test]
    fn test_score_counts_overlap_once_per_token() {
        let g = game(1, &["co-op", "indie"], &["indie", "action"]);
        let preferences = prefs(&["indie", "co-op", "horror"]);
        let set: HashSet<&str> = preferences.iter().map(String::as_str).collect();
        assert_eq!(preference_score(&g, &set), 2);
    }

    #[test]
    fn test_score_is_not_normalized_by_tag_count() {
        let few = game(1, &["rpg"], &["action"]);
        let many = game(2, &["rpg", "a", "b", "c", "d"], &["action", "e"]);
        let preferences = prefs(&["rpg"]);
        let set: HashSet<&str> = preferences.iter().map(String::as_str).collect();
        assert_eq!(preference_score(&few, &set), preference_score(&many, &set));
    }

    #[test]
    fn test_adding_a_candidate_token_raises_score_by_one() {
        let g = game(1, &["puzzle", "co-op"], &["indie"]);
        let mut preferences = prefs(&["puzzle"]);
        let before = score_pool(vec![g.clone()], &preferences)[0].score;

        preferences.push("indie".to_string());
        let after = score_pool(vec![g.clone()], &preferences)[0].score;
        assert_eq!(after, before + 1);

        preferences.push("unrelated".to_string());
        let unchanged = score_pool(vec![g], &preferences)[0].score;
        assert_eq!(unchanged, after);
    }

    #[test]
    fn test_empty_preferences_score_zero() {
        let pool = vec![
            game(1, &["a"], &["x"]),
            game(2, &["b"], &["y"]),
            game(3, &["c"], &["z"]),
        ];
        let mut rng = StdRng::seed_from_u64(7);
        let ranked = rank(pool, &[], 10, &mut rng);

        assert_eq!(ranked.len(), 3);
        assert!(ranked.iter().all(|r| r.score == 0));
    }

    #[test]
    fn test_rank_truncates_and_orders_by_score() {
        // scores: 2, 2, 1, 0, 0
        let pool = vec![
            game(10, &["zero"], &["none"]),
            game(11, &["rpg", "co-op"], &["x"]),
            game(12, &["rpg"], &["y"]),
            game(13, &["nothing"], &["none"]),
            game(14, &["co-op"], &["rpg"]),
        ];
        let preferences = prefs(&["rpg", "co-op"]);

        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let ranked = rank(pool.clone(), &preferences, 3, &mut rng);

            assert_eq!(ranked.len(), 3);
            assert!(ranked.windows(2).all(|w| w[0].score >= w[1].score));
            let top: HashSet<i64> = ranked[..2].iter().map(|r| r.app_id).collect();
            assert_eq!(top, HashSet::from([11, 14]));
            assert_eq!(ranked[2].app_id, 12);
        }
    }

    #[test]
    fn test_ties_are_shuffled_across_calls() {
        let pool: Vec<Game> = (0..8).map(|i| game(i, &["same"], &["genre"])).collect();
        let preferences = prefs(&["same"]);
        let mut rng = StdRng::seed_from_u64(42);

        let orders: HashSet<Vec<i64>> = (0..10)
            .map(|_| {
                rank(pool.clone(), &preferences, 8, &mut rng)
                    .iter()
                    .map(|r| r.app_id)
                    .collect()
            })
            .collect();

        assert!(orders.len() > 1);
    }

    #[test]
    fn test_shuffle_ties_keeps_buckets_in_place() {
        let pool: Vec<Game> = vec![
            game(1, &["a", "b"], &["g"]),
            game(2, &["a", "b"], &["g"]),
            game(3, &["a"], &["g"]),
            game(4, &["a"], &["g"]),
            game(5, &["c"], &["g"]),
        ];
        let mut ranked = score_pool(pool, &prefs(&["a", "b"]));
        let mut rng = StdRng::seed_from_u64(3);
        shuffle_ties(&mut ranked, &mut rng);

        let scores: Vec<usize> = ranked.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![2, 2, 1, 1, 0]);
    }

    #[test]
    fn test_limit_larger_than_pool() {
        let pool = vec![game(1, &["a"], &["b"])];
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(rank(pool, &[], 5, &mut rng).len(), 1);
    }
}
