//! Request matching
//!
//! Candidates for a key are tried in log order and the first one whose
//! request structurally equals the inbound request (outside its own ignore
//! paths) wins. There is no best-match scoring. A candidate with a null
//! request matches anything.

use super::index::{Candidate, MatchIndex};
use crate::document::{Document, mismatches};
use crate::error::{MockError, Result};
use tracing::Level;

/// Find the first candidate under `key` that matches `request`
pub fn find_match<'a>(
    index: &'a MatchIndex,
    key: &str,
    request: &Document,
) -> Result<&'a Candidate> {
    let Some(candidates) = index.candidates(key) else {
        tracing::warn!(key = %key, "no records captured for key");
        return Err(MockError::NoMatch {
            key: key.to_string(),
        });
    };

    for (position, candidate) in candidates.iter().enumerate() {
        let record = &candidate.record;
        if record.is_wildcard() || record.request.matches(request, &candidate.ignore) {
            tracing::debug!(key = %key, position, "matched candidate");
            return Ok(candidate);
        }

        if tracing::enabled!(Level::DEBUG) {
            let diff: Vec<String> = mismatches(&record.request, request, &candidate.ignore)
                .iter()
                .map(ToString::to_string)
                .collect();
            tracing::debug!(key = %key, position, diff = ?diff, "candidate rejected");
        }
    }

    tracing::warn!(key = %key, candidates = candidates.len(), "no candidate matched request");
    Err(MockError::NoMatch {
        key: key.to_string(),
    })
}

/// Resolve `request` to the matched response document, or the matched
/// record's configured error
pub fn match_document(index: &MatchIndex, key: &str, request: &Document) -> Result<Document> {
    let candidate = find_match(index, key, request)?;
    if candidate.record.is_failure() {
        return Err(MockError::Configured(candidate.record.error.clone()));
    }
    Ok(candidate.record.response.clone())
}

/// Byte-level matching: decode the request, match it, encode the response
pub fn match_request(index: &MatchIndex, key: &str, request: &[u8]) -> Result<Vec<u8>> {
    let request = Document::from_slice(request)?;
    let response = match_document(index, key, &request)?;
    Ok(response.to_vec()?)
}
