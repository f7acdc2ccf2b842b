#[derive(thiserror::Error, Debug)]
pub enum MemoryError {
    #[error(
        "Content too short ({length} chars, minimum {minimum}): save the full conversation transcript, not a note"
    )]
    ContentTooShort { length: usize, minimum: usize },

    #[error(
        "Content looks like a summary ({length} chars, no speaker turns found): resubmit the complete transcript including both sides of the conversation"
    )]
    LooksLikeSummary { length: usize, floor: usize },

    #[error("Memory store rejected the request (status {status}): {message}")]
    Store { status: u16, message: String },

    #[error("No memory record with id '{0}'")]
    RecordNotFound(String),

    #[error("Session '{session_id}' has no index record: parts exist but the save never committed")]
    UncommittedSession { session_id: String },

    #[error("Session '{session_id}' is missing part {missing} of {total}")]
    MissingPart {
        session_id: String,
        missing: u32,
        total: u32,
    },

    #[error(
        "Session '{session_id}' is incomplete: index declares {expected} chars, parts hold {actual}"
    )]
    IncompleteSession {
        session_id: String,
        expected: u64,
        actual: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_content_too_short() {
        let err = MemoryError::ContentTooShort {
            length: 80,
            minimum: 100,
        };
        assert_eq!(
            err.to_string(),
            "Content too short (80 chars, minimum 100): save the full conversation transcript, not a note"
        );
    }

    #[test]
    fn test_display_looks_like_summary() {
        let err = MemoryError::LooksLikeSummary {
            length: 300,
            floor: 500,
        };
        assert!(err.to_string().contains("looks like a summary"));
        assert!(err.to_string().contains("300 chars"));
    }

    #[test]
    fn test_display_store() {
        let err = MemoryError::Store {
            status: 503,
            message: "backend unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "Memory store rejected the request (status 503): backend unavailable"
        );
    }

    #[test]
    fn test_display_record_not_found() {
        let err = MemoryError::RecordNotFound("mem-42".into());
        assert_eq!(err.to_string(), "No memory record with id 'mem-42'");
    }

    #[test]
    fn test_display_uncommitted_session() {
        let err = MemoryError::UncommittedSession {
            session_id: "01ARZ3NDEKTSV4RRFFQ69G5FAV".into(),
        };
        assert!(err.to_string().contains("no index record"));
    }

    #[test]
    fn test_display_missing_part() {
        let err = MemoryError::MissingPart {
            session_id: "s1".into(),
            missing: 2,
            total: 3,
        };
        assert_eq!(err.to_string(), "Session 's1' is missing part 2 of 3");
    }

    #[test]
    fn test_display_incomplete_session() {
        let err = MemoryError::IncompleteSession {
            session_id: "s1".into(),
            expected: 40_000,
            actual: 20_000,
        };
        assert!(err.to_string().contains("index declares 40000 chars"));
    }

    #[test]
    fn test_error_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<MemoryError>();
    }
}
