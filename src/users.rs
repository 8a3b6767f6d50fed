//! Canonical user extraction from raw cast lists

use std::collections::HashSet;

use crate::models::CanonicalUser;
use crate::models::Cast;

/// What deduplication found, for stage reporting
#[derive(Debug, Clone, Copy, Default)]
pub struct DedupeSummary {
    pub total_casts: usize,
    pub unique_users: usize,
    pub duplicate_casts: usize,
}

/// Reduce an ordered cast list to one canonical user per fid.
///
/// Single pass, first-seen order preserved. The first cast observed for a
/// fid defines the user snapshot; later casts by the same author are only
/// counted. Casts without an author username are skipped.
#[must_use]
pub fn dedupe_users(casts: &[Cast]) -> (Vec<CanonicalUser>, DedupeSummary) {
    let mut seen: HashSet<u64> = HashSet::new();
    let mut users = Vec::new();
    let mut duplicate_casts = 0usize;

    for cast in casts {
        let Some(author) = &cast.author else {
            continue;
        };
        let Some(user) = CanonicalUser::from_author(author) else {
            continue;
        };
        if seen.insert(user.fid) {
            users.push(user);
        } else {
            duplicate_casts += 1;
        }
    }

    let summary = DedupeSummary {
        total_casts: casts.len(),
        unique_users: users.len(),
        duplicate_casts,
    };
    (users, summary)
}
