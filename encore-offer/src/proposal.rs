use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;

use encore_core::{CoreError, CoreResult, Validator};

/// Body of `POST /api/offers`
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalInput {
    pub price: Option<serde_json::Value>,
    pub date: Option<String>,
    pub event: Option<Uuid>,
    pub recipient_id: Option<Uuid>,
}

/// Date, price and target event of an offer
#[derive(Debug, Clone, PartialEq)]
pub struct Terms {
    pub date: DateTime<Utc>,
    pub price: f64,
    pub event: Option<Uuid>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub terms: Terms,
    pub recipient: Uuid,
}

impl ProposalInput {
    pub fn validate(self, now: DateTime<Utc>) -> CoreResult<Proposal> {
        let mut v = Validator::new();
        let terms = read_terms(&mut v, self.price.as_ref(), self.date.as_deref(), self.event, now);
        let recipient = v.present("recipientId", self.recipient_id, "The recipient must be specified");
        v.finish()?;

        match (terms, recipient) {
            (Some(terms), Some(recipient)) => Ok(Proposal { terms, recipient }),
            _ => Err(CoreError::invalid("offer", "The offer terms are not valid")),
        }
    }
}

/// Accepts a JSON number or a numeric string.
fn read_price(raw: &serde_json::Value) -> Option<f64> {
    let price = match raw {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    (price.is_finite() && price >= 0.0).then_some(price)
}

pub(crate) fn read_terms(
    v: &mut Validator,
    price: Option<&serde_json::Value>,
    date: Option<&str>,
    event: Option<Uuid>,
    now: DateTime<Utc>,
) -> Option<Terms> {
    let price = match price {
        None | Some(serde_json::Value::Null) => {
            v.error("price", "The price must be specified");
            None
        }
        Some(raw) => {
            let parsed = read_price(raw);
            v.check(parsed.is_some(), "price", "The price must be a non-negative number");
            parsed
        }
    };

    let date = match date.map(str::trim).filter(|d| !d.is_empty()) {
        None => {
            v.error("date", "The date must be specified");
            None
        }
        Some(raw) => v.instant("date", Some(raw), "The date must be a valid ISO 8601 date"),
    };
    v.future("date", date, now);

    match (price, date) {
        (Some(price), Some(date)) if date > now => Some(Terms { date, price, event }),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn fields(err: CoreError) -> Vec<String> {
        match err {
            CoreError::ValidationError(errors) => errors.into_iter().map(|e| e.field).collect(),
            other => panic!("expected a validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_proposal() {
        let now = Utc::now();
        let recipient = Uuid::new_v4();
        let input = ProposalInput {
            price: Some(json!("1000")),
            date: Some((now + Duration::days(7)).to_rfc3339()),
            event: None,
            recipient_id: Some(recipient),
        };

        let proposal = input.validate(now).unwrap();
        assert_eq!(proposal.recipient, recipient);
        assert_eq!(proposal.terms.price, 1000.0);
    }

    #[test]
    fn test_missing_fields_are_all_reported() {
        let err = ProposalInput::default().validate(Utc::now()).unwrap_err();
        assert_eq!(fields(err), vec!["price", "date", "recipientId"]);
    }

    #[test]
    fn test_past_date_is_rejected() {
        let now = Utc::now();
        let input = ProposalInput {
            price: Some(json!(1000)),
            date: Some((now - Duration::hours(1)).to_rfc3339()),
            event: None,
            recipient_id: Some(Uuid::new_v4()),
        };
        assert_eq!(fields(input.validate(now).unwrap_err()), vec!["date"]);
    }

    #[test]
    fn test_bad_price_shapes() {
        let now = Utc::now();
        for price in [json!(-5), json!("lots"), json!(true)] {
            let input = ProposalInput {
                price: Some(price),
                date: Some((now + Duration::days(1)).to_rfc3339()),
                event: None,
                recipient_id: Some(Uuid::new_v4()),
            };
            assert_eq!(fields(input.validate(now).unwrap_err()), vec!["price"]);
        }
    }

    #[test]
    fn test_free_offer_is_allowed() {
        let now = Utc::now();
        let input = ProposalInput {
            price: Some(json!(0)),
            date: Some((now + Duration::days(1)).to_rfc3339()),
            event: None,
            recipient_id: Some(Uuid::new_v4()),
        };
        assert_eq!(input.clone().validate(now).unwrap().terms.price, 0.0);

        let negative = ProposalInput {
            price: Some(json!(-1)),
            ..input
        };
        let CoreError::ValidationError(errors) = negative.validate(now).unwrap_err() else {
            panic!("expected a validation error");
        };
        assert_eq!(errors[0].message, "The price must be a non-negative number");
    }
}
