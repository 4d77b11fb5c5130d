mod common;

use common::{TestServer, USER_ID_HEADER};
use http::StatusCode;
use serde_json::{json, Value};

async fn fetch_catalogs(server: &TestServer, user: Option<&str>) -> Vec<Value> {
    let mut request = server.client.get(server.url("/catalogs"));
    if let Some(user) = user {
        request = request.header(USER_ID_HEADER, user);
    }
    let response = request.send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    response.json().await.unwrap()
}

#[tokio::test]
async fn fresh_identity_gets_a_persisted_default_catalog() {
    let server = TestServer::spawn().await;

    let first = fetch_catalogs(&server, Some("alice")).await;
    assert_eq!(first.len(), 1);
    assert_eq!(first[0]["name"], "My Book Catalog");
    assert_eq!(first[0]["owner"], "alice");

    // Fetching again returns the same catalog, not a second new one.
    let second = fetch_catalogs(&server, Some("alice")).await;
    assert_eq!(second, first);
}

#[tokio::test]
async fn guest_catalogs_live_in_the_local_backend() {
    let server = TestServer::spawn().await;

    let guest = fetch_catalogs(&server, None).await;
    assert_eq!(guest.len(), 1);
    assert_eq!(guest[0]["owner"], Value::Null);

    // A signed-in user does not see the guest catalog.
    let user = fetch_catalogs(&server, Some("alice")).await;
    assert_ne!(user[0]["id"], guest[0]["id"]);
}

#[tokio::test]
async fn create_update_delete_catalog() {
    let server = TestServer::spawn().await;

    let created: Value = server
        .client
        .post(server.url("/catalogs"))
        .header(USER_ID_HEADER, "alice")
        .json(&json!({"name": "Cookbooks", "description": "Kitchen shelf"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(created["name"], "Cookbooks");
    let id = created["id"].as_str().unwrap();

    let updated: Value = server
        .client
        .put(server.url(&format!("/catalogs/{}", id)))
        .header(USER_ID_HEADER, "alice")
        .json(&json!({"name": "Baking", "color": "amber"}))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(updated["name"], "Baking");
    assert_eq!(updated["color"], "amber");
    assert_eq!(updated["description"], "Kitchen shelf");

    let delete_status = server
        .client
        .delete(server.url(&format!("/catalogs/{}", id)))
        .header(USER_ID_HEADER, "alice")
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(delete_status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn empty_catalog_name_is_rejected() {
    let server = TestServer::spawn().await;

    let status = server
        .client
        .post(server.url("/catalogs"))
        .json(&json!({"name": "   "}))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn one_user_cannot_touch_anothers_catalog() {
    let server = TestServer::spawn().await;

    let catalogs = fetch_catalogs(&server, Some("alice")).await;
    let id = catalogs[0]["id"].as_str().unwrap();

    let update_status = server
        .client
        .put(server.url(&format!("/catalogs/{}", id)))
        .header(USER_ID_HEADER, "mallory")
        .json(&json!({"name": "Mine now"}))
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(update_status, StatusCode::NOT_FOUND);

    let delete_status = server
        .client
        .delete(server.url(&format!("/catalogs/{}", id)))
        .header(USER_ID_HEADER, "mallory")
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(delete_status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn mutating_a_missing_catalog_is_not_found() {
    let server = TestServer::spawn().await;

    let status = server
        .client
        .delete(server.url("/catalogs/no-such-id"))
        .header(USER_ID_HEADER, "alice")
        .send()
        .await
        .unwrap()
        .status();
    assert_eq!(status, StatusCode::NOT_FOUND);
}
