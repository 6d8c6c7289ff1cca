use chrono::{DateTime, Local, TimeZone};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Short random id used to correlate log lines for one connection.
pub fn new_correlation_id() -> String {
    let uuid = uuid::Uuid::new_v4();
    let bytes = uuid.as_bytes();
    format!(
        "{:02x}{:02x}{:02x}{:02x}",
        bytes[0], bytes[1], bytes[2], bytes[3]
    )
}

/// Identifies one conversation and its log record.
///
/// Derived from a start timestamp (`YYYYmmdd_HHMMSS`). Connection-scoped
/// sessions append a sequence number (`YYYYmmdd_HHMMSS_3`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(String);

impl SessionId {
    pub fn from_start_time<Tz: TimeZone>(start: &DateTime<Tz>) -> Self
    where
        Tz::Offset: fmt::Display,
    {
        Self(start.format("%Y%m%d_%H%M%S").to_string())
    }

    /// Session id for a process starting now, in local time.
    pub fn at_process_start() -> Self {
        Self::from_start_time(&Local::now())
    }

    /// Derive the id of the `seq`-th child session of this one.
    pub fn child(&self, seq: u64) -> Self {
        Self(format!("{}_{seq}", self.0))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn correlation_id_length() {
        let cid = new_correlation_id();
        assert_eq!(cid.len(), 8);
    }

    #[test]
    fn correlation_id_is_hex() {
        let cid = new_correlation_id();
        assert!(cid.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn session_id_from_timestamp() {
        let start = Utc.with_ymd_and_hms(2025, 3, 12, 9, 5, 7).unwrap();
        let sid = SessionId::from_start_time(&start);
        assert_eq!(sid.as_str(), "20250312_090507");
    }

    #[test]
    fn session_id_child() {
        let start = Utc.with_ymd_and_hms(2025, 3, 12, 9, 5, 7).unwrap();
        let sid = SessionId::from_start_time(&start);
        assert_eq!(sid.child(3).as_str(), "20250312_090507_3");
        assert_ne!(sid.child(1), sid.child(2));
    }

    #[test]
    fn session_id_at_process_start_shape() {
        let sid = SessionId::at_process_start();
        let s = sid.as_str();
        assert_eq!(s.len(), 15);
        assert_eq!(&s[8..9], "_");
        assert!(s.chars().filter(|c| *c != '_').all(|c| c.is_ascii_digit()));
    }

    #[test]
    fn session_id_display() {
        let sid = SessionId::at_process_start();
        assert_eq!(sid.to_string(), sid.as_str());
    }

    #[test]
    fn session_id_hash() {
        use std::collections::HashSet;
        let mut set = HashSet::new();
        let s1 = SessionId::at_process_start();
        let s2 = s1.clone();
        set.insert(s1);
        set.insert(s2);
        assert_eq!(set.len(), 1);
    }
}
