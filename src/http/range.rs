//! HTTP Range request parsing
//!
//! Single-range `bytes` unit parsing per RFC 7233, used for resumable
//! downloads of larger assets.

/// A parsed byte range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ByteRange {
    /// First byte position.
    pub start: usize,
    /// Last byte position, None means through end of file.
    pub end: Option<usize>,
}

impl ByteRange {
    /// Resolve the inclusive end position against the actual file size.
    #[inline]
    pub fn end_position(&self, file_size: usize) -> usize {
        self.end.unwrap_or_else(|| file_size.saturating_sub(1))
    }

    #[cfg(test)]
    pub fn content_length(&self, file_size: usize) -> usize {
        let end = self.end_position(file_size);
        end.saturating_sub(self.start) + 1
    }
}

/// Outcome of parsing a Range header.
#[derive(Debug)]
pub enum RangeOutcome {
    /// Satisfiable range, respond 206.
    Valid(ByteRange),
    /// Start lies at or beyond the file size, respond 416.
    NotSatisfiable,
    /// No Range header, non-bytes unit, multi-range, or malformed value.
    /// All are ignored and answered with the full content.
    None,
}

/// Parse a Range header value against a known file size.
///
/// Supported forms: `bytes=start-end`, `bytes=start-`, `bytes=-suffix`.
/// Multi-range requests are deliberately not supported.
pub fn parse_range_header(range_header: Option<&str>, file_size: usize) -> RangeOutcome {
    let Some(header) = range_header else {
        return RangeOutcome::None;
    };

    let Some(spec) = header.strip_prefix("bytes=") else {
        return RangeOutcome::None;
    };

    if spec.contains(',') {
        return RangeOutcome::None;
    }

    let parts: Vec<&str> = spec.split('-').collect();
    if parts.len() != 2 {
        return RangeOutcome::None;
    }

    let (start_str, end_str) = (parts[0].trim(), parts[1].trim());

    // Suffix form: "-500" means the last 500 bytes
    if start_str.is_empty() {
        return parse_suffix_range(end_str, file_size);
    }

    parse_standard_range(start_str, end_str, file_size)
}

fn parse_suffix_range(suffix_str: &str, file_size: usize) -> RangeOutcome {
    let Ok(suffix) = suffix_str.parse::<usize>() else {
        return RangeOutcome::None;
    };

    // No byte of an empty file is addressable
    if suffix == 0 || file_size == 0 {
        return RangeOutcome::NotSatisfiable;
    }

    // A suffix longer than the file covers the whole file
    let start = file_size.saturating_sub(suffix);
    RangeOutcome::Valid(ByteRange {
        start,
        end: Some(file_size - 1),
    })
}

fn parse_standard_range(start_str: &str, end_str: &str, file_size: usize) -> RangeOutcome {
    let Ok(start) = start_str.parse::<usize>() else {
        return RangeOutcome::None;
    };

    if start >= file_size {
        return RangeOutcome::NotSatisfiable;
    }

    let end = if end_str.is_empty() {
        None
    } else {
        let Ok(e) = end_str.parse::<usize>() else {
            return RangeOutcome::None;
        };
        // Clamp to the last byte of the file
        Some(e.min(file_size - 1))
    };

    if let Some(e) = end {
        if start > e {
            return RangeOutcome::NotSatisfiable;
        }
    }

    RangeOutcome::Valid(ByteRange { start, end })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_header() {
        assert!(matches!(parse_range_header(None, 100), RangeOutcome::None));
    }

    #[test]
    fn test_fixed_range() {
        match parse_range_header(Some("bytes=0-9"), 100) {
            RangeOutcome::Valid(r) => {
                assert_eq!(r.start, 0);
                assert_eq!(r.end, Some(9));
                assert_eq!(r.content_length(100), 10);
            }
            _ => panic!("Expected Valid"),
        }
    }

    #[test]
    fn test_open_ended_range() {
        match parse_range_header(Some("bytes=50-"), 100) {
            RangeOutcome::Valid(r) => {
                assert_eq!(r.start, 50);
                assert_eq!(r.end, None);
                assert_eq!(r.end_position(100), 99);
                assert_eq!(r.content_length(100), 50);
            }
            _ => panic!("Expected Valid"),
        }
    }

    #[test]
    fn test_suffix_range() {
        match parse_range_header(Some("bytes=-20"), 100) {
            RangeOutcome::Valid(r) => {
                assert_eq!(r.start, 80);
                assert_eq!(r.end, Some(99));
            }
            _ => panic!("Expected Valid"),
        }
    }

    #[test]
    fn test_oversized_suffix_covers_whole_file() {
        match parse_range_header(Some("bytes=-500"), 100) {
            RangeOutcome::Valid(r) => {
                assert_eq!(r.start, 0);
                assert_eq!(r.end, Some(99));
            }
            _ => panic!("Expected Valid"),
        }
    }

    #[test]
    fn test_empty_file_not_satisfiable() {
        assert!(matches!(
            parse_range_header(Some("bytes=-5"), 0),
            RangeOutcome::NotSatisfiable
        ));
        assert!(matches!(
            parse_range_header(Some("bytes=0-"), 0),
            RangeOutcome::NotSatisfiable
        ));
    }

    #[test]
    fn test_start_beyond_file_not_satisfiable() {
        assert!(matches!(
            parse_range_header(Some("bytes=200-"), 100),
            RangeOutcome::NotSatisfiable
        ));
    }

    #[test]
    fn test_malformed_and_multi_range_ignored() {
        assert!(matches!(
            parse_range_header(Some("bytes=a-b"), 100),
            RangeOutcome::None
        ));
        assert!(matches!(
            parse_range_header(Some("bytes=0-9,20-29"), 100),
            RangeOutcome::None
        ));
        assert!(matches!(
            parse_range_header(Some("items=0-9"), 100),
            RangeOutcome::None
        ));
    }
}
