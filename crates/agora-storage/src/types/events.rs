//! Event types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{EventId, GroupId, UserId};

/// Attendance status on an event or an event proposal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventAttendeeStatus {
    Host,
    Going,
    Interested,
}

/// Error type for parsing EventAttendeeStatus from its stored form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseAttendeeStatusError(pub String);

impl std::fmt::Display for ParseAttendeeStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid attendee status: {}", self.0)
    }
}

impl std::error::Error for ParseAttendeeStatusError {}

impl EventAttendeeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventAttendeeStatus::Host => "host",
            EventAttendeeStatus::Going => "going",
            EventAttendeeStatus::Interested => "interested",
        }
    }
}

impl FromStr for EventAttendeeStatus {
    type Err = ParseAttendeeStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "host" => Ok(EventAttendeeStatus::Host),
            "going" => Ok(EventAttendeeStatus::Going),
            "interested" => Ok(EventAttendeeStatus::Interested),
            _ => Err(ParseAttendeeStatusError(s.to_string())),
        }
    }
}

/// Live event record
#[derive(Clone, Debug)]
pub struct Event {
    pub id: EventId,
    pub group_id: GroupId,
    pub host_user_id: UserId,
    pub name: String,
    pub description: String,
    pub location: Option<String>,
    pub online: bool,
    pub external_link: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Parameters for creating an event
#[derive(Clone, Debug)]
pub struct CreateEventParams {
    pub group_id: GroupId,
    pub host_user_id: UserId,
    pub name: String,
    pub description: String,
    pub location: Option<String>,
    pub online: bool,
    pub external_link: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attendee_status_roundtrip() {
        for s in [
            EventAttendeeStatus::Host,
            EventAttendeeStatus::Going,
            EventAttendeeStatus::Interested,
        ] {
            assert_eq!(s.as_str().parse::<EventAttendeeStatus>().unwrap(), s);
        }
        assert!("maybe".parse::<EventAttendeeStatus>().is_err());
    }
}
