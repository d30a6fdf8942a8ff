//! Structural comparison of documents
//!
//! A recursive walk over both trees that builds the current path as it
//! descends. Any node whose path is in the candidate's [`IgnoreSet`] is
//! treated as equal regardless of its value (or absence).

use super::Document;
use super::path::{IgnoreSet, ROOT};
use serde_json::Number;
use std::collections::BTreeSet;
use std::fmt;

/// One differing node found by [`mismatches`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mismatch {
    /// Dotted path of the node, rooted at `root`
    pub path: String,
    /// Summary of the captured value
    pub expected: String,
    /// Summary of the inbound value
    pub actual: String,
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} != {}", self.path, self.expected, self.actual)
    }
}

/// Whether `expected` and `actual` are equal outside the ignored paths
pub fn structurally_equal(expected: &Document, actual: &Document, ignore: &IgnoreSet) -> bool {
    let mut walker = Walker::new(ignore, true);
    walker.visit(Some(expected), Some(actual));
    walker.found.is_empty()
}

/// Every differing node outside the ignored paths, in walk order
pub fn mismatches(expected: &Document, actual: &Document, ignore: &IgnoreSet) -> Vec<Mismatch> {
    let mut walker = Walker::new(ignore, false);
    walker.visit(Some(expected), Some(actual));
    walker.found
}

struct Walker<'a> {
    ignore: &'a IgnoreSet,
    path: Vec<String>,
    found: Vec<Mismatch>,
    stop_at_first: bool,
}

impl<'a> Walker<'a> {
    fn new(ignore: &'a IgnoreSet, stop_at_first: bool) -> Self {
        Self {
            ignore,
            path: Vec::new(),
            found: Vec::new(),
            stop_at_first,
        }
    }

    /// Returns false once the walk should stop
    fn visit(&mut self, expected: Option<&Document>, actual: Option<&Document>) -> bool {
        if !self.ignore.is_empty() && self.ignore.contains(&self.path) {
            return true;
        }

        match (expected, actual) {
            (Some(Document::Map(e)), Some(Document::Map(a))) => {
                let keys: BTreeSet<&String> = e.keys().chain(a.keys()).collect();
                for key in keys {
                    self.path.push(key.clone());
                    let keep_going = self.visit(e.get(key), a.get(key));
                    self.path.pop();
                    if !keep_going {
                        return false;
                    }
                }
                true
            }
            (Some(Document::Seq(e)), Some(Document::Seq(a))) => {
                for i in 0..e.len().max(a.len()) {
                    self.path.push(i.to_string());
                    let keep_going = self.visit(e.get(i), a.get(i));
                    self.path.pop();
                    if !keep_going {
                        return false;
                    }
                }
                true
            }
            (Some(e), Some(a)) if leaves_equal(e, a) => true,
            _ => self.report(expected, actual),
        }
    }

    fn report(&mut self, expected: Option<&Document>, actual: Option<&Document>) -> bool {
        let mut path = String::from(ROOT);
        for segment in &self.path {
            path.push('.');
            path.push_str(segment);
        }
        self.found.push(Mismatch {
            path,
            expected: summarize(expected),
            actual: summarize(actual),
        });
        !self.stop_at_first
    }
}

fn leaves_equal(a: &Document, b: &Document) -> bool {
    match (a, b) {
        (Document::Null, Document::Null) => true,
        (Document::Bool(x), Document::Bool(y)) => x == y,
        (Document::String(x), Document::String(y)) => x == y,
        (Document::Number(x), Document::Number(y)) => numbers_equal(x, y),
        _ => false,
    }
}

fn numbers_equal(a: &Number, b: &Number) -> bool {
    if let (Some(x), Some(y)) = (a.as_i64(), b.as_i64()) {
        return x == y;
    }
    if let (Some(x), Some(y)) = (a.as_u64(), b.as_u64()) {
        return x == y;
    }
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) => x == y,
        _ => false,
    }
}

fn summarize(node: Option<&Document>) -> String {
    const MAX_LEAF: usize = 64;

    match node {
        None => "<missing>".to_string(),
        Some(Document::Map(map)) => format!("map({} keys)", map.len()),
        Some(Document::Seq(items)) => format!("sequence({} items)", items.len()),
        Some(leaf) => {
            let text = leaf.to_string();
            if text.chars().count() > MAX_LEAF {
                let cut: String = text.chars().take(MAX_LEAF).collect();
                format!("{}...", cut)
            } else {
                text
            }
        }
    }
}
