//! Click-through targets for notifications.
//!
//! The UI maps a notification's related object to one of these routes.

use super::notification::{Notification, RelatedObjectType};
use serde::Serialize;

/// Dashboard screen a notification opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "screen", content = "id", rename_all = "snake_case")]
pub enum Route {
    ReportDetail(i64),
    AdoptionApplicationDetail(i64),
    AnimalDetail(i64),
    DonationsList,
    VolunteerAssignmentsList,
}

impl Route {
    /// Resolve a related object pointer to a route.
    ///
    /// Detail routes need an id; list routes ignore it.
    pub fn resolve(object_type: &RelatedObjectType, object_id: Option<i64>) -> Option<Self> {
        match (object_type, object_id) {
            (RelatedObjectType::Report, Some(id)) => Some(Self::ReportDetail(id)),
            (RelatedObjectType::AdoptionApplication, Some(id)) => {
                Some(Self::AdoptionApplicationDetail(id))
            }
            (RelatedObjectType::Animal, Some(id)) => Some(Self::AnimalDetail(id)),
            (RelatedObjectType::Donation, _) => Some(Self::DonationsList),
            (RelatedObjectType::VolunteerAssignment, _) => Some(Self::VolunteerAssignmentsList),
            _ => None,
        }
    }

    /// Route for a notification, if it points anywhere.
    pub fn for_notification(notification: &Notification) -> Option<Self> {
        notification
            .related_object_type
            .as_ref()
            .and_then(|t| Self::resolve(t, notification.related_object_id))
    }

    /// Frontend path for this route.
    pub fn path(&self) -> String {
        match self {
            Self::ReportDetail(id) => format!("/reports/{}", id),
            Self::AdoptionApplicationDetail(id) => format!("/adoptions/applications/{}", id),
            Self::AnimalDetail(id) => format!("/animals/{}", id),
            Self::DonationsList => "/donations".to_string(),
            Self::VolunteerAssignmentsList => "/volunteers/assignments".to_string(),
        }
    }
}
