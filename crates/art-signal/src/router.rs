// SPDX-License-Identifier: MIT

//! Dotted-pattern routing over signal types.
//!
//! Patterns are `.`-separated segments where `*` matches exactly one
//! segment and `**` matches one or more trailing segments. `**` is
//! only meaningful as the final segment of a pattern; anything after
//! it is unreachable.

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Exact(String),
    Single,
    Multi,
}

fn parse_pattern(pattern: &str) -> Vec<Segment> {
    pattern
        .split('.')
        .map(|segment| match segment {
            "*" => Segment::Single,
            "**" => Segment::Multi,
            other => Segment::Exact(other.to_string()),
        })
        .collect()
}

/// Higher score wins: an exact segment outweighs a single wildcard,
/// which outweighs a multi wildcard, at every depth.
fn match_score(pattern: &[Segment], segments: &[&str]) -> Option<u32> {
    match (pattern.first(), segments.first()) {
        (None, None) => Some(0),
        (None, Some(_)) => None,
        (Some(Segment::Multi), _) => {
            if segments.is_empty() {
                None
            } else {
                Some(0)
            }
        }
        (Some(Segment::Exact(expected)), Some(actual)) if expected == actual => {
            match_score(&pattern[1..], &segments[1..]).map(|n| n + 2)
        }
        (Some(Segment::Exact(_)), _) => None,
        (Some(Segment::Single), Some(_)) => match_score(&pattern[1..], &segments[1..]).map(|n| n + 1),
        (Some(Segment::Single), None) => None,
    }
}

struct Route<T> {
    pattern: String,
    segments: Vec<Segment>,
    handler: T,
    insertion_order: usize,
}

/// A priority-ordered table of dotted patterns to handlers of type `T`.
///
/// [`Router::matches`] returns every route whose pattern matches the
/// given signal type, most specific first; routes of equal specificity
/// are returned in insertion order.
pub struct Router<T> {
    routes: Vec<Route<T>>,
}

impl<T> Default for Router<T> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<T> Router<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pattern: impl Into<String>, handler: T) {
        let pattern = pattern.into();
        let segments = parse_pattern(&pattern);
        let insertion_order = self.routes.len();
        self.routes.push(Route { pattern, segments, handler, insertion_order });
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Patterns registered, in insertion order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|r| r.pattern.as_str())
    }

    pub fn matches(&self, signal_type: &str) -> Vec<&T> {
        let segments: Vec<&str> = signal_type.split('.').collect();
        let mut scored: Vec<(&Route<T>, u32)> = self
            .routes
            .iter()
            .filter_map(|route| match_score(&route.segments, &segments).map(|score| (route, score)))
            .collect();
        scored.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.insertion_order.cmp(&b.0.insertion_order)));
        scored.into_iter().map(|(route, _)| &route.handler).collect()
    }

    /// Convenience over [`Self::matches`] for callers that only need
    /// the single best-ranked handler.
    pub fn best_match(&self, signal_type: &str) -> Option<&T> {
        self.matches(signal_type).into_iter().next()
    }
}

#[cfg(test)]
#[path = "router_tests.rs"]
mod tests;
