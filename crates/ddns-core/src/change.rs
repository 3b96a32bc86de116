//! Change detection between the cached IP and a freshly resolved candidate

use crate::error::{Error, Result};
use std::net::Ipv4Addr;

/// Outcome of comparing a candidate with the cached IP
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    /// Candidate equals the cached value; nothing to do
    Unchanged,
    /// Candidate differs and parsed as a valid IPv4 address
    Changed(Ipv4Addr),
}

/// Compare `candidate` against `observed`
///
/// Comparison is plain string equality. Only a differing candidate is parsed,
/// and it must be a strict dotted-quad IPv4 address.
pub fn detect_change(observed: &str, candidate: &str) -> Result<Change> {
    if candidate == observed {
        return Ok(Change::Unchanged);
    }

    candidate
        .parse::<Ipv4Addr>()
        .map(Change::Changed)
        .map_err(|_| Error::invalid_address(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_strings_are_unchanged() {
        assert_eq!(
            detect_change("203.0.113.5", "203.0.113.5").unwrap(),
            Change::Unchanged
        );
    }

    #[test]
    fn first_candidate_against_empty_cache_is_changed() {
        assert_eq!(
            detect_change("", "203.0.113.5").unwrap(),
            Change::Changed(Ipv4Addr::new(203, 0, 113, 5))
        );
    }

    #[test]
    fn invalid_candidates_are_rejected() {
        for candidate in ["", "203.0.113", "203.0.113.256", "2001:db8::1", "a.b.c.d", "203.0.113.05"] {
            let result = detect_change("198.51.100.1", candidate);
            assert!(
                matches!(result, Err(Error::InvalidAddress(ref c)) if c == candidate),
                "{:?} should be rejected, got {:?}",
                candidate,
                result
            );
        }
    }

    #[test]
    fn garbage_equal_to_cache_is_not_reparsed() {
        // Only differing candidates reach the parser.
        assert_eq!(detect_change("junk", "junk").unwrap(), Change::Unchanged);
    }
}
