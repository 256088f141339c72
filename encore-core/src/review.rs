use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use encore_shared::{AccountType, Feedback, FeedbackAverage, FeedbackView, Participation};

use crate::directory::{public, require_event, user_index};
use crate::{Actor, CoreError, CoreResult, Repositories, Validator};

/// Body of a new review
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackDraft {
    pub event: Option<Uuid>,
    pub receiver: Option<Uuid>,
    pub performance_rating: Option<i64>,
    pub performance_text: Option<String>,
    pub reliability_rating: Option<i64>,
    pub reliability_text: Option<String>,
}

impl FeedbackDraft {
    fn touches_reliability(&self) -> bool {
        self.reliability_rating.is_some() || self.reliability_text.as_deref().is_some_and(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum FeedbackListing {
    Authored(Vec<FeedbackView>),
    Received {
        feedbacks: Vec<FeedbackView>,
        average: Option<FeedbackAverage>,
    },
}

pub async fn submit(repos: &Repositories, actor: &Actor, draft: FeedbackDraft) -> CoreResult<Feedback> {
    let mut v = Validator::new();
    let event_id = v.present("event", draft.event, "Event is a required field");
    let receiver = v.present("receiver", draft.receiver, "Receiver is a required field");
    let performance = v.present("performanceRating", draft.performance_rating, "The performance stars is required");
    let performance = v.rating("performanceRating", performance);
    let reliability = v.rating("reliabilityRating", draft.reliability_rating);
    if let Some(receiver) = receiver {
        v.check(receiver != actor.id, "receiver", "You cannot review yourself");
    }
    v.finish()?;
    let (Some(event_id), Some(receiver), Some(performance_rating)) = (event_id, receiver, performance) else {
        return Err(CoreError::invalid("performanceRating", "The performance stars is required"));
    };

    if actor.is(AccountType::Viewer) {
        if draft.touches_reliability() {
            return Err(CoreError::forbidden("The viewer cannot review the reliability"));
        }
        match repos.participations.get_participation(event_id, actor.id).await? {
            Some(p) if p.has_reviewed => {
                return Err(CoreError::ConflictError("You already reviewed this event".to_string()));
            }
            Some(p) if p.can_review => {}
            _ => return Err(CoreError::forbidden("Scan the event QR code before reviewing it")),
        }
    }

    let event = require_event(repos, event_id).await?;
    let feedback = Feedback {
        id: Uuid::new_v4(),
        event: event.id,
        author: actor.id,
        receiver,
        reliability_rating: reliability,
        reliability_text: draft.reliability_text.filter(|t| !t.is_empty()),
        performance_rating,
        performance_text: draft.performance_text,
        created_at: Utc::now(),
    };

    repos.feedbacks.insert_feedback(&feedback).await?;
    repos.participations.set_reviewed(event.id, actor.id, true).await?;
    info!("Feedback {} left by {} for {} on event {}", feedback.id, actor.id, receiver, event.id);
    Ok(feedback)
}

pub async fn withdraw(repos: &Repositories, actor: &Actor, feedback_id: Uuid) -> CoreResult<()> {
    let feedback = repos
        .feedbacks
        .get_feedback(feedback_id)
        .await?
        .ok_or_else(|| CoreError::not_found("There is not a review with this id"))?;

    if feedback.author != actor.id {
        return Err(CoreError::forbidden("You cannot delete a review not yours"));
    }

    repos.feedbacks.delete_feedback(feedback.id).await?;
    repos.participations.set_reviewed(feedback.event, actor.id, false).await?;
    Ok(())
}

pub async fn listing(repos: &Repositories, author: Option<Uuid>, receiver: Option<Uuid>) -> CoreResult<FeedbackListing> {
    if let Some(author) = author {
        let feedbacks = repos.feedbacks.feedbacks_by_author(author).await?;
        return Ok(FeedbackListing::Authored(feedback_views(repos, feedbacks).await?));
    }
    if let Some(receiver) = receiver {
        let feedbacks = repos.feedbacks.feedbacks_for_receiver(receiver).await?;
        let average = FeedbackAverage::of(&feedbacks);
        let feedbacks = feedback_views(repos, feedbacks).await?;
        return Ok(FeedbackListing::Received { feedbacks, average });
    }
    Err(CoreError::invalid("author", "Search feedbacks either by author or by receiver"))
}

async fn feedback_views(repos: &Repositories, feedbacks: Vec<Feedback>) -> CoreResult<Vec<FeedbackView>> {
    let index = user_index(repos, feedbacks.iter().flat_map(|f| [f.author, f.receiver])).await?;
    let mut event_ids: Vec<Uuid> = feedbacks.iter().map(|f| f.event).collect();
    event_ids.sort();
    event_ids.dedup();
    let events = if event_ids.is_empty() {
        Vec::new()
    } else {
        repos.events.get_events(&event_ids).await?
    };

    Ok(feedbacks
        .into_iter()
        .map(|feedback| {
            let event = events.iter().find(|e| e.id == feedback.event).cloned();
            let author = public(&index, feedback.author);
            let receiver = public(&index, feedback.receiver);
            FeedbackView::new(feedback, event, author, receiver)
        })
        .collect())
}

/// Presenting the event's code at the venue unlocks reviewing it.
pub async fn check_in(repos: &Repositories, actor: &Actor, event_id: Uuid, code: &str) -> CoreResult<Participation> {
    let event = repos.events.get_event(event_id).await?;
    match event {
        Some(event) if event.qrcode == code => {
            let participation = repos.participations.unlock_review(event.id, actor.id).await?;
            info!("User {} checked in at event {}", actor.id, event.id);
            Ok(participation)
        }
        _ => Err(CoreError::invalid("qrcode", "The id or the QRCode of the event is invalid")),
    }
}

/// URL encoded in the event's QR code.
pub fn check_in_url(domain: &str, event_id: Uuid, code: &str) -> String {
    format!("{}/feedbacks/{}?code={}", domain.trim_end_matches('/'), event_id, code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_check_in_url() {
        let id = Uuid::nil();
        assert_eq!(
            check_in_url("https://encore.example/", id, "abc"),
            format!("https://encore.example/feedbacks/{}?code=abc", id)
        );
    }

    #[test]
    fn test_reliability_detection() {
        let mut draft = FeedbackDraft::default();
        assert!(!draft.touches_reliability());
        draft.reliability_text = Some(String::new());
        assert!(!draft.touches_reliability());
        draft.reliability_rating = Some(4);
        assert!(draft.touches_reliability());
    }
}
