//! Key management through the admin API

use axum::http::StatusCode;
use serde_json::json;

#[path = "../common/mod.rs"]
mod common;
use common::*;

#[tokio::test]
async fn test_generate_key_with_expiry() {
    let (clock, _) = manual_clock(T0);
    let app = test_app(create_test_app_state_with_clock(clock));

    let (status, json) = send(
        &app,
        admin_request("POST", "/api/admin/generate", Some(json!({ "expiryDays": 30 }))),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let code = json["code"].as_str().expect("response should include code");
    assert_eq!(code.len(), 19, "code should be XXXX-XXXX-XXXX-XXXX");
    assert_eq!(json["createdAt"], T0);
    assert_eq!(json["expiresAt"], T0 + 30 * ONE_DAY);
    assert_eq!(json["active"], true);
    assert!(json["hardwareId"].is_null());
}

#[tokio::test]
async fn test_generate_accepts_snake_case_expiry() {
    let (clock, _) = manual_clock(T0);
    let app = test_app(create_test_app_state_with_clock(clock));

    for body in [json!({ "expiry_days": 30 }), json!({ "durationDays": 30 })] {
        let (status, json) =
            send(&app, admin_request("POST", "/api/admin/generate", Some(body))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["expiresAt"], T0 + 30 * ONE_DAY);
    }
}

#[tokio::test]
async fn test_generate_rejects_unknown_fields() {
    let state = create_test_app_state();
    let app = test_app(state.clone());

    for (uri, body) in [
        ("/api/admin/generate", json!({ "expiry": 30 })),
        ("/api/admin/generate", json!({ "expiresInDays": 30 })),
        ("/api/admin/generate/bulk", json!({ "count": 3, "expiry": 30 })),
    ] {
        let (status, json) = send(&app, admin_request("POST", uri, Some(body.clone()))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{} {} should be rejected", uri, body);
        assert_eq!(json["error"], "Bad request");
    }

    assert!(
        state.licenses().list().unwrap().is_empty(),
        "a misspelled expiry must not mint a lifetime key"
    );
}

#[tokio::test]
async fn test_generate_lifetime_key() {
    let app = test_app(create_test_app_state());

    for body in [json!({}), json!({ "expiry_days": 0 }), json!({ "duration_days": -1 })] {
        let (status, json) =
            send(&app, admin_request("POST", "/api/admin/generate", Some(body))).await;
        assert_eq!(status, StatusCode::OK);
        assert!(json["expiresAt"].is_null(), "expected a lifetime key");
    }
}

#[tokio::test]
async fn test_generate_bulk() {
    let app = test_app(create_test_app_state());

    let (status, json) = send(
        &app,
        admin_request(
            "POST",
            "/api/admin/generate/bulk",
            Some(json!({ "count": 5, "expiryDays": 7 })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let keys = json["keys"].as_array().expect("keys array");
    assert_eq!(keys.len(), 5);
    assert!(keys.iter().all(|k| k["expiresAt"].is_i64()));

    let (_, listed) = send(&app, admin_request("GET", "/api/admin/keys", None)).await;
    assert_eq!(listed["keys"].as_array().unwrap().len(), 5);
}

#[tokio::test]
async fn test_generate_bulk_rejects_bad_counts() {
    let app = test_app(create_test_app_state());

    for count in [0, 101] {
        let (status, _) = send(
            &app,
            admin_request("POST", "/api/admin/generate/bulk", Some(json!({ "count": count }))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "count {} should be rejected", count);
    }
}

#[tokio::test]
async fn test_list_keys_newest_first() {
    let (clock, cell) = manual_clock(T0);
    let state = create_test_app_state_with_clock(clock);
    let older = state.licenses().generate(None).unwrap();
    advance(&cell, 5);
    let newer = state.licenses().generate(None).unwrap();
    let app = test_app(state);

    let (status, json) = send(&app, admin_request("GET", "/api/admin/keys", None)).await;

    assert_eq!(status, StatusCode::OK);
    let codes: Vec<&str> = json["keys"]
        .as_array()
        .unwrap()
        .iter()
        .map(|k| k["code"].as_str().unwrap())
        .collect();
    assert_eq!(codes, vec![newer.code.as_str(), older.code.as_str()]);
}

#[tokio::test]
async fn test_get_key() {
    let state = create_test_app_state();
    let key = state.licenses().generate(None).unwrap();
    let app = test_app(state);

    let (status, json) = send(
        &app,
        admin_request("GET", &format!("/api/admin/keys/{}", key.code), None),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["code"], key.code.as_str());

    let (status, json) =
        send(&app, admin_request("GET", "/api/admin/keys/ZZZZ-ZZZZ-ZZZZ-ZZZZ", None)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"], "Not found");
}

#[tokio::test]
async fn test_soft_revoke_and_reinstate() {
    let state = create_test_app_state();
    let key = state.licenses().generate(None).unwrap();
    let app = test_app(state);
    let uri = format!("/api/admin/keys/{}/active", key.code);

    let (status, json) = send(&app, admin_request("PUT", &uri, Some(json!({ "active": false })))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active"], false);

    let (_, outcome) = send(
        &app,
        json_request("POST", "/api/validate", json!({ "code": key.code, "hardwareId": "H1" })),
    )
    .await;
    assert_eq!(outcome["reason"], "revoked");

    let (status, _) = send(&app, admin_request("PUT", &uri, Some(json!({ "active": true })))).await;
    assert_eq!(status, StatusCode::OK);

    let (_, outcome) = send(
        &app,
        json_request("POST", "/api/validate", json!({ "code": key.code, "hardwareId": "H1" })),
    )
    .await;
    assert_eq!(outcome["valid"], true);
}

#[tokio::test]
async fn test_set_active_unknown_key_is_not_found() {
    let app = test_app(create_test_app_state());

    let (status, _) = send(
        &app,
        admin_request(
            "PUT",
            "/api/admin/keys/ZZZZ-ZZZZ-ZZZZ-ZZZZ/active",
            Some(json!({ "active": false })),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_key() {
    let state = create_test_app_state();
    let key = state.licenses().generate(Some(30)).unwrap();
    let app = test_app(state);
    let uri = format!("/api/admin/keys/{}", key.code);

    let (status, json) = send(&app, admin_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["deleted"], true);

    let (status, json) = send(&app, admin_request("DELETE", &uri, None)).await;
    assert_eq!(status, StatusCode::OK, "deleting twice is not an error");
    assert_eq!(json["deleted"], false);

    let (_, outcome) = send(
        &app,
        json_request("POST", "/api/validate", json!({ "code": key.code, "hardwareId": "H1" })),
    )
    .await;
    assert_eq!(outcome["reason"], "invalid_key");
}

#[tokio::test]
async fn test_stats() {
    let (clock, cell) = manual_clock(T0);
    let state = create_test_app_state_with_clock(clock);
    let short = state.licenses().generate(Some(1)).unwrap();
    let lifetime = state.licenses().generate(None).unwrap();
    state.licenses().validate(&lifetime.code, "H1").unwrap();
    state.licenses().validate(&short.code, "H2").unwrap();
    let app = test_app(state);

    advance(&cell, 2 * ONE_DAY);

    let (status, json) = send(&app, admin_request("GET", "/api/admin/stats", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json, json!({ "total": 2, "active": 1, "expired": 1, "bound": 2 }));
}
