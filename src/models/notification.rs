//! Notification and push event models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Category of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum NotificationType {
    ReportUpdate,
    AdoptionUpdate,
    VolunteerAssignment,
    DonationReceived,
    AnimalUpdate,
    SystemMessage,
}

impl From<&str> for NotificationType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "report_update" => Self::ReportUpdate,
            "adoption_update" => Self::AdoptionUpdate,
            "volunteer_assignment" => Self::VolunteerAssignment,
            "donation_received" => Self::DonationReceived,
            "animal_update" => Self::AnimalUpdate,
            _ => Self::SystemMessage, // Default fallback
        }
    }
}

impl From<String> for NotificationType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ReportUpdate => write!(f, "report_update"),
            Self::AdoptionUpdate => write!(f, "adoption_update"),
            Self::VolunteerAssignment => write!(f, "volunteer_assignment"),
            Self::DonationReceived => write!(f, "donation_received"),
            Self::AnimalUpdate => write!(f, "animal_update"),
            Self::SystemMessage => write!(f, "system_message"),
        }
    }
}

/// Kind of domain entity a notification points at.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RelatedObjectType {
    Report,
    AdoptionApplication,
    Animal,
    Donation,
    VolunteerAssignment,
    /// A type this client does not know how to navigate to.
    Other(String),
}

impl From<&str> for RelatedObjectType {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "report" => Self::Report,
            "adoption" | "adoption_application" => Self::AdoptionApplication,
            "animal" => Self::Animal,
            "donation" => Self::Donation,
            "volunteer_assignment" | "assignment" => Self::VolunteerAssignment,
            _ => Self::Other(s.to_string()),
        }
    }
}

impl From<String> for RelatedObjectType {
    fn from(s: String) -> Self {
        Self::from(s.as_str())
    }
}

impl From<RelatedObjectType> for String {
    fn from(value: RelatedObjectType) -> Self {
        value.to_string()
    }
}

impl std::fmt::Display for RelatedObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Report => write!(f, "report"),
            Self::AdoptionApplication => write!(f, "adoption"),
            Self::Animal => write!(f, "animal"),
            Self::Donation => write!(f, "donation"),
            Self::VolunteerAssignment => write!(f, "volunteer_assignment"),
            Self::Other(raw) => write!(f, "{}", raw),
        }
    }
}

/// A notification as held by the store and shown in the UI.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Server id for persisted entries, minted id for provisional ones.
    pub id: i64,

    pub title: String,

    /// Body text.
    pub message: String,

    pub notification_type: NotificationType,

    /// Entity to open when the notification is clicked.
    pub related_object_type: Option<RelatedObjectType>,

    pub related_object_id: Option<i64>,

    pub is_read: bool,

    /// Display only. Never used to order or merge entries.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// The `(title, message)` pair used to detect the same logical event.
    pub fn fingerprint(&self) -> (&str, &str) {
        (&self.title, &self.message)
    }

    /// Short relative label for list rendering.
    pub fn age_label(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.created_at);

        if elapsed.num_minutes() < 1 {
            "just now".to_string()
        } else if elapsed.num_hours() < 1 {
            format!("{}m ago", elapsed.num_minutes())
        } else if elapsed.num_days() < 1 {
            format!("{}h ago", elapsed.num_hours())
        } else if elapsed.num_days() < 7 {
            format!("{}d ago", elapsed.num_days())
        } else {
            self.created_at.format("%b %d, %Y").to_string()
        }
    }
}

/// Raw event delivered by the push transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    pub title: String,
    pub body: String,
    #[serde(rename = "type", default)]
    pub event_type: String,
}

impl PushEvent {
    pub fn new(
        title: impl Into<String>,
        body: impl Into<String>,
        event_type: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
            event_type: event_type.into(),
        }
    }

    /// Build the unread, provisional entry for this event.
    pub fn into_notification(self, id: i64, created_at: DateTime<Utc>) -> Notification {
        Notification {
            id,
            notification_type: NotificationType::from(self.event_type.as_str()),
            title: self.title,
            message: self.body,
            related_object_type: None,
            related_object_id: None,
            is_read: false,
            created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn sample(created_at: DateTime<Utc>) -> Notification {
        Notification {
            id: 1,
            title: "New report".to_string(),
            message: "Report #42 filed".to_string(),
            notification_type: NotificationType::ReportUpdate,
            related_object_type: Some(RelatedObjectType::Report),
            related_object_id: Some(42),
            is_read: false,
            created_at,
        }
    }

    #[test]
    fn test_notification_type_parsing_is_case_insensitive() {
        assert_eq!(
            NotificationType::from("REPORT_UPDATE"),
            NotificationType::ReportUpdate
        );
        assert_eq!(
            NotificationType::from("donation_received"),
            NotificationType::DonationReceived
        );
        assert_eq!(
            NotificationType::from("something_new"),
            NotificationType::SystemMessage
        );
    }

    #[test]
    fn test_related_object_type_accepts_aliases() {
        assert_eq!(
            RelatedObjectType::from("adoption_application"),
            RelatedObjectType::AdoptionApplication
        );
        assert_eq!(
            RelatedObjectType::from("adoption"),
            RelatedObjectType::AdoptionApplication
        );
        assert_eq!(
            RelatedObjectType::from("kennel"),
            RelatedObjectType::Other("kennel".to_string())
        );
    }

    #[test]
    fn test_notification_serializes_camel_case() {
        let created = Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_string(&sample(created)).unwrap();
        assert!(json.contains("\"isRead\":false"));
        assert!(json.contains("\"notificationType\":\"report_update\""));
        assert!(json.contains("\"relatedObjectType\":\"report\""));
    }

    #[test]
    fn test_age_label() {
        let now = Utc.with_ymd_and_hms(2026, 3, 10, 12, 0, 0).unwrap();
        assert_eq!(sample(now).age_label(now), "just now");
        assert_eq!(sample(now - Duration::minutes(5)).age_label(now), "5m ago");
        assert_eq!(sample(now - Duration::hours(3)).age_label(now), "3h ago");
        assert_eq!(sample(now - Duration::days(2)).age_label(now), "2d ago");
        assert_eq!(
            sample(now - Duration::days(30)).age_label(now),
            "Feb 08, 2026"
        );
    }

    #[test]
    fn test_push_event_into_notification() {
        let now = Utc::now();
        let event = PushEvent::new("Adopted!", "Rex went home", "ADOPTION_UPDATE");
        let n = event.into_notification(200_000_000_000, now);
        assert_eq!(n.notification_type, NotificationType::AdoptionUpdate);
        assert_eq!(n.message, "Rex went home");
        assert!(!n.is_read);
        assert_eq!(n.related_object_type, None);
    }

    #[test]
    fn test_push_event_deserializes_type_field() {
        let event: PushEvent =
            serde_json::from_str(r#"{"title":"t","body":"b","type":"ANIMAL_UPDATE"}"#).unwrap();
        assert_eq!(event.event_type, "ANIMAL_UPDATE");
    }
}
