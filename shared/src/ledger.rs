//! Read-only projections over the vote ledger. Nothing here is cached; every
//! view is recomputed from the votes it is handed.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use time::OffsetDateTime;
use crate::models::{CategoryResults, Leaderboard, Standing, TallyEntry, Vote, VoterStats};

pub fn has_voted(votes: &[Vote], voter: &str) -> bool {
    votes.iter().any(|v| v.is_by(voter))
}

/// Distinct voters in lexicographic order. Votes without a voter are skipped.
pub fn voters(votes: &[Vote]) -> Vec<String> {
    votes.iter()
        .filter_map(|v| v.voter.as_deref())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Distinct candidates that already hold a vote in `category`, sorted.
pub fn candidates(votes: &[Vote], category: &str) -> Vec<String> {
    votes.iter()
        .filter(|v| v.category == category)
        .map(|v| v.candidate.as_str())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// Vote count per exact (category, candidate) pair, ordered by that pair.
pub fn tally(votes: &[Vote]) -> Vec<TallyEntry> {
    let mut counts: BTreeMap<(&str, &str), usize> = BTreeMap::new();
    for vote in votes {
        *counts.entry((vote.category.as_str(), vote.candidate.as_str())).or_insert(0) += 1;
    }

    counts.into_iter()
        .map(|((category, candidate), count)| TallyEntry {
            category: category.to_string(),
            candidate: candidate.to_string(),
            count,
        })
        .collect()
}

/// Per voter: distinct categories voted in and the latest vote time,
/// most recent first.
pub fn voter_stats(votes: &[Vote]) -> Vec<VoterStats> {
    let mut by_voter: HashMap<&str, (HashSet<&str>, OffsetDateTime)> = HashMap::new();
    for vote in votes {
        let Some(voter) = vote.voter.as_deref() else { continue };
        let (categories, latest) = by_voter
            .entry(voter)
            .or_insert_with(|| (HashSet::new(), vote.timestamp));
        categories.insert(vote.category.as_str());
        if vote.timestamp > *latest {
            *latest = vote.timestamp;
        }
    }

    let mut stats: Vec<_> = by_voter.into_iter()
        .map(|(voter, (categories, latest))| VoterStats {
            voter: voter.to_string(),
            categories_voted: categories.len(),
            last_voted_at: latest,
        })
        .collect();

    stats.sort_by(|a, b| {
        b.last_voted_at.cmp(&a.last_voted_at)
            .then_with(|| a.voter.cmp(&b.voter))
    });
    stats
}

/// Tally grouped per category and ranked by count (ties by name). Every
/// category in `categories` is present even without votes; categories only
/// found in the ledger follow in name order.
pub fn leaderboard(votes: &[Vote], categories: &[String]) -> Leaderboard {
    let mut grouped: BTreeMap<String, Vec<Standing>> = BTreeMap::new();
    for entry in tally(votes) {
        grouped.entry(entry.category).or_default().push(Standing {
            candidate: entry.candidate,
            count: entry.count,
        });
    }

    let mut ordered = Vec::with_capacity(categories.len().max(grouped.len()));
    for category in categories {
        let standings = grouped.remove(category).unwrap_or_default();
        ordered.push((category.clone(), standings));
    }
    ordered.extend(grouped);

    Leaderboard {
        categories: ordered.into_iter()
            .map(|(category, mut standings)| {
                standings.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.candidate.cmp(&b.candidate)));
                CategoryResults {
                    total_votes: standings.iter().map(|s| s.count).sum(),
                    category,
                    standings,
                }
            })
            .collect(),
    }
}
