//! Completion detection for gonzo runs.
//!
//! The agent signals that the task is done by printing the completion
//! marker anywhere in its output. Nothing else in the output is interpreted.

/// Literal text whose presence in agent output ends the run successfully.
pub(crate) const COMPLETION_MARKER: &str = "<promise>COMPLETE</promise>";

/// Returns true if `output` contains the completion marker.
pub(crate) fn is_complete(output: &str) -> bool {
    output.contains(COMPLETION_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_alone() {
        assert!(is_complete("<promise>COMPLETE</promise>"));
    }

    #[test]
    fn test_marker_inside_text() {
        assert!(is_complete("All done.\n\n<promise>COMPLETE</promise>\n"));
        assert!(is_complete("done <promise>COMPLETE</promise> bye"));
    }

    #[test]
    fn test_no_marker() {
        assert!(!is_complete(""));
        assert!(!is_complete("working..."));
        assert!(!is_complete("COMPLETE"));
    }

    #[test]
    fn test_marker_is_case_sensitive() {
        assert!(!is_complete("<promise>complete</promise>"));
    }

    #[test]
    fn test_partial_marker() {
        assert!(!is_complete("<promise>COMPLETE"));
        assert!(!is_complete("<promise> COMPLETE </promise>"));
    }
}
