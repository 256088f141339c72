use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::event::Event;
use super::user::PublicUser;

/// Attendance of a user at an event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Participation {
    pub id: Uuid,
    pub event: Uuid,
    pub user: Uuid,
    pub can_review: bool,
    pub has_reviewed: bool,
}

impl Participation {
    pub fn new(event: Uuid, user: Uuid) -> Self {
        Self {
            id: Uuid::new_v4(),
            event,
            user,
            can_review: false,
            has_reviewed: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    pub id: Uuid,
    pub event: Uuid,
    pub author: Uuid,
    pub receiver: Uuid,
    pub reliability_rating: Option<u8>,
    pub reliability_text: Option<String>,
    pub performance_rating: u8,
    pub performance_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A feedback with its event and both users resolved
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackView {
    pub id: Uuid,
    pub event: Option<Event>,
    pub author: Option<PublicUser>,
    pub receiver: Option<PublicUser>,
    pub reliability_rating: Option<u8>,
    pub reliability_text: Option<String>,
    pub performance_rating: u8,
    pub performance_text: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl FeedbackView {
    pub fn new(feedback: Feedback, event: Option<Event>, author: Option<PublicUser>, receiver: Option<PublicUser>) -> Self {
        Self {
            id: feedback.id,
            event,
            author,
            receiver,
            reliability_rating: feedback.reliability_rating,
            reliability_text: feedback.reliability_text,
            performance_rating: feedback.performance_rating,
            performance_text: feedback.performance_text,
            created_at: feedback.created_at,
        }
    }
}

/// Mean ratings received by a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FeedbackAverage {
    pub reliability: Option<f64>,
    pub performance: f64,
}

impl FeedbackAverage {
    /// `None` when there is nothing to average.
    pub fn of(feedbacks: &[Feedback]) -> Option<Self> {
        if feedbacks.is_empty() {
            return None;
        }

        let performance = feedbacks.iter().map(|f| f64::from(f.performance_rating)).sum::<f64>()
            / feedbacks.len() as f64;

        let reliability: Vec<f64> = feedbacks
            .iter()
            .filter_map(|f| f.reliability_rating.map(f64::from))
            .collect();
        let reliability = if reliability.is_empty() {
            None
        } else {
            Some(reliability.iter().sum::<f64>() / reliability.len() as f64)
        };

        Some(Self { reliability, performance })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feedback(performance: u8, reliability: Option<u8>) -> Feedback {
        Feedback {
            id: Uuid::new_v4(),
            event: Uuid::new_v4(),
            author: Uuid::new_v4(),
            receiver: Uuid::new_v4(),
            reliability_rating: reliability,
            reliability_text: None,
            performance_rating: performance,
            performance_text: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_average_skips_missing_reliability() {
        let avg = FeedbackAverage::of(&[feedback(5, Some(4)), feedback(3, None)]).unwrap();
        assert_eq!(avg.performance, 4.0);
        assert_eq!(avg.reliability, Some(4.0));
    }

    #[test]
    fn test_average_of_nothing() {
        assert!(FeedbackAverage::of(&[]).is_none());
    }
}
