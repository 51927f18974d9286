//! Character name resolution for command arguments.
//!
//! Players type names loosely ("arwen", "Arwn"). Resolution only ever considers the
//! invoker's own characters:
//! 1. exact match
//! 2. the injected [`NameMatcher`] (default: [`EditDistanceMatcher`])

/// Approximate matching strategy over a candidate list.
pub trait NameMatcher: Send + Sync {
    /// Best candidate for `query`, or `None` if nothing is close enough.
    fn best_match(&self, query: &str, candidates: &[String]) -> Option<String>;
}

/// Exact names only.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExactMatcher;

impl NameMatcher for ExactMatcher {
    fn best_match(&self, query: &str, candidates: &[String]) -> Option<String> {
        candidates.iter().find(|c| c.as_str() == query).cloned()
    }
}

/// Normalized Levenshtein similarity with a cutoff.
///
/// Similarity is `1 - distance / max(len_a, len_b)` over lowercased characters.
/// Candidates below `cutoff` are rejected; ties keep the first candidate.
#[derive(Debug, Clone, Copy)]
pub struct EditDistanceMatcher {
    pub cutoff: f64,
}

impl Default for EditDistanceMatcher {
    fn default() -> Self {
        Self { cutoff: 0.5 }
    }
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    if a.is_empty() {
        return b.len();
    }
    if b.is_empty() {
        return a.len();
    }
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut cur = vec![0usize; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        cur[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            cur[j + 1] = (prev[j + 1] + 1).min(cur[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

/// Similarity in `[0, 1]`, case-insensitive.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

impl NameMatcher for EditDistanceMatcher {
    fn best_match(&self, query: &str, candidates: &[String]) -> Option<String> {
        let mut best: Option<(&String, f64)> = None;
        for cand in candidates {
            let score = similarity(query, cand);
            if score < self.cutoff {
                continue;
            }
            match best {
                Some((_, top)) if top >= score => {}
                _ => best = Some((cand, score)),
            }
        }
        best.map(|(c, _)| c.clone())
    }
}

/// Resolve `query` among `owned` names: exact first, then `matcher`.
pub fn resolve_name(query: &str, owned: &[String], matcher: &dyn NameMatcher) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }
    if let Some(exact) = owned.iter().find(|n| n.as_str() == query) {
        return Some(exact.clone());
    }
    matcher.best_match(query, owned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn distance_basics() {
        let a: Vec<char> = "kitten".chars().collect();
        let b: Vec<char> = "sitting".chars().collect();
        assert_eq!(levenshtein(&a, &b), 3);
        assert_eq!(similarity("Arwen", "arwen"), 1.0);
    }

    #[test]
    fn typo_resolves_to_closest_owned_name() {
        let owned = names(&["Arwen", "Boromir"]);
        let m = EditDistanceMatcher::default();
        assert_eq!(resolve_name("Arwn", &owned, &m).as_deref(), Some("Arwen"));
        assert_eq!(resolve_name("boromir", &owned, &m).as_deref(), Some("Boromir"));
    }

    #[test]
    fn distant_query_is_rejected() {
        let owned = names(&["Arwen"]);
        assert!(resolve_name("Zzzzzzz", &owned, &EditDistanceMatcher::default()).is_none());
        assert!(resolve_name("   ", &owned, &EditDistanceMatcher::default()).is_none());
    }

    #[test]
    fn exact_matcher_requires_exact_case() {
        let owned = names(&["Arwen"]);
        assert!(resolve_name("arwen", &owned, &ExactMatcher).is_none());
        assert_eq!(resolve_name("Arwen", &owned, &ExactMatcher).as_deref(), Some("Arwen"));
    }
}
