//! Order-insensitive fuzzy similarity between a free-text query and a vocabulary token.
//!
//! Both sides are reduced to sets of alphanumeric words, so word order, repeated
//! words and punctuation ("co-op" vs "co op") do not affect the score. Words shared
//! by both sides are compared against each side's leftovers; when one side is fully
//! contained in the other the score is 100.

use std::collections::BTreeSet;

/// Highest possible score
pub const MAX_SCORE: u8 = 100;

/// Lowercases and replaces every non-alphanumeric character with a word break
fn words(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}

fn join(words: &[&str]) -> String {
    words.join(" ")
}

/// Longest common subsequence length over chars
fn lcs_len(a: &[char], b: &[char]) -> usize {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    let mut prev = vec![0usize; b.len() + 1];
    let mut curr = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            curr[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                curr[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

/// Indel similarity of two strings scaled to 0..=100
pub fn ratio(a: &str, b: &str) -> u8 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let total = a.len() + b.len();
    if total == 0 {
        return 0;
    }
    let matched = 2 * lcs_len(&a, &b);
    ((matched as f64 * 100.0 / total as f64).round() as u8).min(MAX_SCORE)
}

/// Token-set similarity of `query` and `candidate`, 0..=100
pub fn token_set_ratio(query: &str, candidate: &str) -> u8 {
    let a = words(query);
    let b = words(candidate);
    if a.is_empty() || b.is_empty() {
        return 0;
    }

    let shared: Vec<&str> = a.intersection(&b).map(String::as_str).collect();
    let only_a: Vec<&str> = a.difference(&b).map(String::as_str).collect();
    let only_b: Vec<&str> = b.difference(&a).map(String::as_str).collect();

    let base = join(&shared);
    let with_a = join(&[base.as_str(), join(&only_a).as_str()]).trim().to_string();
    let with_b = join(&[base.as_str(), join(&only_b).as_str()]).trim().to_string();

    let mut best = ratio(&with_a, &with_b);
    if !base.is_empty() {
        best = best.max(ratio(&base, &with_a)).max(ratio(&base, &with_b));
    }
    best
}
