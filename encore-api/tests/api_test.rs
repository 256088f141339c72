use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use tower::ServiceExt;

use encore_api::{app, AppState, AuthConfig};
use encore_store::memory;

fn test_app() -> Router {
    let auth = AuthConfig {
        secret: "test-secret".to_string(),
        expiration: 3600,
    };
    app(AppState::new(memory::repositories(), auth, "http://encore.test"))
}

async fn call(app: &Router, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Signs up and sets the account type, returning (token, user id).
async fn register(app: &Router, email: &str, user_type: &str, fullname: &str) -> (String, String) {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({"email": email, "password": "secret1", "confirmPassword": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "signup failed: {}", body);
    let token = body["data"]["token"].as_str().unwrap().to_string();
    let id = body["data"]["user"]["id"].as_str().unwrap().to_string();

    let (status, body) = call(
        app,
        Method::POST,
        "/api/account/profile",
        Some(&token),
        Some(json!({
            "userType": user_type,
            "profile": {
                "fullname": fullname,
                "location": {"coordinates": [9.19, 45.46], "address": "Milano"},
                "typologies": ["jazz"]
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "profile failed: {}", body);
    (token, id)
}

fn in_days(days: i64) -> String {
    (Utc::now() + Duration::days(days)).to_rfc3339()
}

#[tokio::test]
async fn test_signup_login_and_session() {
    let app = test_app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({"email": "Miles@Encore.test", "password": "secret1", "confirmPassword": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["user"]["email"], "miles@encore.test");
    assert!(body["data"]["user"].get("passwordHash").is_none());

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "miles@encore.test", "password": "wrong-one"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/login",
        None,
        Some(json!({"email": "miles@encore.test", "password": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["data"]["token"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::POST, "/api/session", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["email"], "miles@encore.test");
}

#[tokio::test]
async fn test_signup_rejects_duplicates_and_bad_input() {
    let app = test_app();
    register(&app, "place@encore.test", "Place", "Blue Note").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({"email": "place@encore.test", "password": "secret1", "confirmPassword": "secret1"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"][0]["message"], "The user is already existing");

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/signup",
        None,
        Some(json!({"email": "not-an-email", "password": "abc", "confirmPassword": "abd"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_protected_routes_need_a_token() {
    let app = test_app();
    let (status, body) = call(&app, Method::GET, "/api/offers", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Not authorized");
    assert!(body["data"].is_null());

    let (status, _) = call(&app, Method::GET, "/api/offers", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = call(&app, Method::POST, "/api/events", None, Some(json!({"name": "Sneaky"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = call(&app, Method::POST, "/api/tours", None, Some(json!({"name": "Sneaky"}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = call(&app, Method::GET, "/api/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success", "data": null}));
}

#[tokio::test]
async fn test_anonymous_visitors_can_browse() {
    let app = test_app();
    let (_, artist_id) = register(&app, "miles@encore.test", "Artist", "Miles").await;

    for uri in [
        format!("/api/events?userType=Artist&userId={}", artist_id),
        "/api/users?userType=Artist".to_string(),
        format!("/api/users/{}", artist_id),
        "/api/search?type=Artist".to_string(),
        "/api/search/nearest?type=Place&lng=9.19&lat=45.46".to_string(),
        format!("/api/tours?userId={}", artist_id),
        format!("/api/feedbacks?receiver={}", artist_id),
        format!("/api/partecipations?userId={}", artist_id),
    ] {
        let (status, body) = call(&app, Method::GET, &uri, None, None).await;
        assert_eq!(status, StatusCode::OK, "{} -> {}", uri, body);
        assert_eq!(body["status"], "success");
    }

    let (_, body) = call(&app, Method::GET, "/api/search?type=Artist&fullname=miles", None, None).await;
    assert_eq!(body["data"][0]["id"], artist_id.as_str());
}

#[tokio::test]
async fn test_offer_negotiation_creates_event() {
    let app = test_app();
    let (artist, artist_id) = register(&app, "miles@encore.test", "Artist", "Miles").await;
    let (place, place_id) = register(&app, "bluenote@encore.test", "Place", "Blue Note").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/offers",
        Some(&artist),
        Some(json!({"price": 1000, "date": in_days(30), "recipientId": place_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let offer = body["data"].clone();
    assert_eq!(offer["price"], 1000.0);
    assert_eq!(offer["artist"]["id"], artist_id.as_str());
    assert_eq!(offer["place"]["profile"]["fullname"], "Blue Note");
    assert!(offer["artistAcceptDate"].is_null());
    assert!(offer["placeAcceptDate"].is_null());
    let uri = format!("/api/offers/{}", offer["id"].as_str().unwrap());

    let (status, body) = call(&app, Method::PATCH, &uri, Some(&place), Some(json!({"action": "accept"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(!body["data"]["placeAcceptDate"].is_null());
    assert!(body["data"]["event"].is_null());

    let (status, body) = call(&app, Method::PATCH, &uri, Some(&artist), Some(json!({"action": "accept"}))).await;
    assert_eq!(status, StatusCode::OK);
    let event = &body["data"]["event"];
    assert_eq!(event["place"], place_id.as_str());
    assert_eq!(event["artists"], json!([artist_id]));

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/events?userType=Artist&userId={}", artist_id),
        Some(&artist),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["place"]["id"], place_id.as_str());

    let event_id = event["id"].as_str().unwrap().to_string();
    let (status, body) = call(
        &app,
        Method::PATCH,
        &uri,
        Some(&artist),
        Some(json!({"action": "edit", "price": 1200, "date": in_days(31)})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["event"]["id"], event_id.as_str());
    let (status, body) = call(&app, Method::PATCH, &uri, Some(&place), Some(json!({"action": "accept"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["event"]["id"], event_id.as_str());

    let (_, body) = call(&app, Method::GET, &format!("/api/events?userType=Place&userId={}", place_id), None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = call(
        &app,
        Method::PATCH,
        &uri,
        Some(&place),
        Some(json!({"action": "decline", "declineReason": "Schedule conflict"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["artistAcceptDate"].is_null());
    assert!(body["data"]["placeAcceptDate"].is_null());
    assert_eq!(body["data"]["declineAuthor"], place_id.as_str());
    assert_eq!(body["data"]["declineReason"], "Schedule conflict");
}

#[tokio::test]
async fn test_offer_rejections() {
    let app = test_app();
    let (artist, _) = register(&app, "miles@encore.test", "Artist", "Miles").await;
    let (_, place_id) = register(&app, "bluenote@encore.test", "Place", "Blue Note").await;
    let (viewer, _) = register(&app, "fan@encore.test", "Viewer", "Fan").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/offers",
        Some(&artist),
        Some(json!({"price": 1000, "date": in_days(-1), "recipientId": place_id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"][0]["field"], "date");

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/offers",
        Some(&viewer),
        Some(json!({"price": 1000, "date": in_days(3), "recipientId": place_id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = call(
        &app,
        Method::POST,
        "/api/offers",
        Some(&artist),
        Some(json!({"price": "250", "date": in_days(3), "recipientId": place_id})),
    )
    .await;
    let uri = format!("/api/offers/{}", body["data"]["id"].as_str().unwrap());

    let (status, body) = call(&app, Method::PATCH, &uri, Some(&artist), Some(json!({"action": "cancel"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown action on the offer");

    let (status, _) = call(&app, Method::PATCH, &uri, Some(&viewer), Some(json!({"action": "accept"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::PATCH,
        "/api/offers/00000000-0000-0000-0000-000000000000",
        Some(&artist),
        Some(json!({"action": "accept"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = call(&app, Method::PATCH, "/api/offers/not-a-uuid", Some(&artist), Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "error");
}

#[tokio::test]
async fn test_chat_between_parties() {
    let app = test_app();
    let (artist, _) = register(&app, "miles@encore.test", "Artist", "Miles").await;
    let (place, place_id) = register(&app, "bluenote@encore.test", "Place", "Blue Note").await;
    let (outsider, _) = register(&app, "other@encore.test", "Artist", "Other").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/chat",
        Some(&artist),
        Some(json!({"message": "Free next Friday?", "recipient": place_id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let conversation = body["data"]["conversation"].as_str().unwrap().to_string();

    let (status, body) = call(&app, Method::GET, "/api/chat", Some(&place), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["id"], conversation.as_str());
    assert_eq!(body["data"][0]["messages"][0]["body"], "Free next Friday?");

    let uri = format!("/api/chat/{}", conversation);
    let (status, _) = call(&app, Method::POST, &uri, Some(&place), Some(json!({"message": "Sure"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(&app, Method::GET, &uri, Some(&artist), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _) = call(&app, Method::GET, &uri, Some(&outsider), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, body) = call(&app, Method::GET, &uri, Some(&artist), None).await;
    let first = body["data"][0]["id"].as_str().unwrap().to_string();
    let edit = json!({"messageId": first, "message": "Free next Saturday?"});
    let (status, _) = call(&app, Method::PATCH, &uri, Some(&place), Some(edit.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = call(&app, Method::PATCH, &uri, Some(&outsider), Some(edit.clone())).await;
    assert_ne!(status, StatusCode::OK);
    let (status, body) = call(&app, Method::PATCH, &uri, Some(&artist), Some(edit)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["body"], "Free next Saturday?");
    let (_, body) = call(&app, Method::GET, &uri, Some(&place), None).await;
    assert_eq!(body["data"][0]["body"], "Free next Saturday?");

    let (status, _) = call(&app, Method::DELETE, &uri, Some(&place), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, &uri, Some(&artist), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_event_check_in_and_review() {
    let app = test_app();
    let (artist, _) = register(&app, "miles@encore.test", "Artist", "Miles").await;
    let (place, place_id) = register(&app, "bluenote@encore.test", "Place", "Blue Note").await;
    let (viewer, viewer_id) = register(&app, "fan@encore.test", "Viewer", "Fan").await;

    let event_body = json!({
        "name": "Jazz night",
        "description": "Quartet",
        "location": {"coordinates": [9.19, 45.46], "address": "Milano"},
        "date": in_days(10)
    });
    let (status, _) = call(&app, Method::POST, "/api/events", Some(&artist), Some(event_body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::POST, "/api/events", Some(&place), Some(event_body)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let event_id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, _) = call(&app, Method::GET, &format!("/api/events/{}/qrcode", event_id), Some(&viewer), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(&app, Method::GET, &format!("/api/events/{}/qrcode", event_id), Some(&place), None).await;
    assert_eq!(status, StatusCode::OK);
    let url = body["data"]["url"].as_str().unwrap().to_string();
    assert!(url.starts_with(&format!("http://encore.test/feedbacks/{}?code=", event_id)));
    let code = url.rsplit("code=").next().unwrap().to_string();

    let review = json!({"event": event_id, "receiver": place_id, "performanceRating": 4});
    let (status, _) = call(&app, Method::POST, "/api/feedbacks", Some(&viewer), Some(review.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(
        &app,
        Method::POST,
        &format!("/api/events/{}/qrcode/wrong", event_id),
        Some(&viewer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &app,
        Method::POST,
        &format!("/api/events/{}/qrcode/{}", event_id, code),
        Some(&viewer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["canReview"], true);

    let with_reliability = json!({
        "event": event_id,
        "receiver": place_id,
        "performanceRating": 4,
        "reliabilityRating": 2
    });
    let (status, _) = call(&app, Method::POST, "/api/feedbacks", Some(&viewer), Some(with_reliability)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = call(&app, Method::POST, "/api/feedbacks", Some(&viewer), Some(review.clone())).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::POST, "/api/feedbacks", Some(&viewer), Some(review)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = call(&app, Method::GET, &format!("/api/feedbacks?receiver={}", place_id), Some(&place), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["average"]["performance"], 4.0);
    assert!(body["data"]["average"]["reliability"].is_null());
    let received = &body["data"]["feedbacks"][0];
    assert_eq!(received["event"]["id"], event_id.as_str());
    assert_eq!(received["author"]["profile"]["fullname"], "Fan");

    let (status, body) = call(&app, Method::GET, &format!("/api/feedbacks?author={}", viewer_id), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"][0]["receiver"]["id"], place_id.as_str());
    assert_eq!(body["data"][0]["event"]["name"], "Jazz night");

    let (status, body) = call(
        &app,
        Method::GET,
        &format!("/api/events/{}/partecipations/count", event_id),
        Some(&viewer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], 1);
}

#[tokio::test]
async fn test_client_errors_are_accepted_without_login() {
    let app = test_app();
    let (status, body) = call(
        &app,
        Method::POST,
        "/api/errors",
        None,
        Some(json!({"error": {"message": "undefined is not a function"}})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
}

#[tokio::test]
async fn test_renaming_a_place_refreshes_event_search() {
    let app = test_app();
    let (place, _) = register(&app, "bluenote@encore.test", "Place", "Blue Note").await;

    let (status, body) = call(
        &app,
        Method::POST,
        "/api/events",
        Some(&place),
        Some(json!({
            "name": "Jazz night",
            "description": "Quartet",
            "location": {"coordinates": [9.19, 45.46], "address": "Milano"},
            "date": in_days(10)
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let event_id = body["data"]["id"].as_str().unwrap().to_string();

    let (_, body) = call(&app, Method::GET, "/api/search?type=Event&eventPlaceName=note", None, None).await;
    assert_eq!(body["data"][0]["id"], event_id.as_str());

    let (status, _) = call(
        &app,
        Method::POST,
        "/api/account/profile",
        Some(&place),
        Some(json!({
            "userType": "Place",
            "profile": {
                "fullname": "Vanguard",
                "location": {"coordinates": [9.19, 45.46], "address": "Milano"},
                "typologies": ["jazz"]
            }
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = call(&app, Method::GET, "/api/search?type=Event&eventPlaceName=vanguard", None, None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["id"], event_id.as_str());

    let (_, body) = call(&app, Method::GET, "/api/search?type=Event&eventPlaceName=note", None, None).await;
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_tours_and_stages() {
    let app = test_app();
    let (artist, artist_id) = register(&app, "miles@encore.test", "Artist", "Miles").await;
    let (other, _) = register(&app, "coltrane@encore.test", "Artist", "Coltrane").await;
    let (place, _) = register(&app, "bluenote@encore.test", "Place", "Blue Note").await;

    let milano = json!({"coordinates": [9.19, 45.46], "address": "Milano"});
    let roma = json!({"coordinates": [12.49, 41.89], "address": "Roma"});
    let tour_body = json!({"name": "Summer tour", "startLocation": milano, "endLocation": roma});

    let (status, _) = call(&app, Method::POST, "/api/tours", Some(&place), Some(tour_body.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = call(&app, Method::POST, "/api/tours", Some(&artist), Some(json!({"name": "Nowhere"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{}", body);

    let (status, body) = call(&app, Method::POST, "/api/tours", Some(&artist), Some(tour_body)).await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["data"]["artist"], artist_id.as_str());
    let tour_uri = format!("/api/tours/{}", body["data"]["id"].as_str().unwrap());

    let (status, _) = call(&app, Method::PATCH, &tour_uri, Some(&other), Some(json!({"name": "Mine now"}))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = call(&app, Method::PATCH, &tour_uri, Some(&artist), Some(json!({"name": "Summer tour 2"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Summer tour 2");
    assert_eq!(body["data"]["endLocation"]["address"], "Roma");

    let stages_uri = format!("{}/stages", tour_uri);
    let (status, _) = call(
        &app,
        Method::POST,
        &stages_uri,
        Some(&artist),
        Some(json!({"location": milano, "date": in_days(-2)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, body) = call(
        &app,
        Method::POST,
        &stages_uri,
        Some(&artist),
        Some(json!({"location": milano, "date": in_days(5)})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    let stage_uri = format!("{}/{}", stages_uri, body["data"]["id"].as_str().unwrap());

    let (status, body) = call(&app, Method::PATCH, &stage_uri, Some(&artist), Some(json!({"location": roma}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["location"]["address"], "Roma");

    let (status, body) = call(&app, Method::GET, &tour_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["stages"].as_array().unwrap().len(), 1);
    let (_, body) = call(&app, Method::GET, &format!("/api/tours?userId={}", artist_id), None, None).await;
    assert_eq!(body["data"][0]["name"], "Summer tour 2");

    let (status, _) = call(&app, Method::DELETE, &stage_uri, Some(&other), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = call(&app, Method::DELETE, &stage_uri, Some(&artist), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, &stage_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = call(&app, Method::DELETE, &tour_uri, Some(&artist), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = call(&app, Method::GET, &tour_uri, None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
