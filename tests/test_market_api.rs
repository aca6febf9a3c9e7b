//! End-to-end HTTP tests, mostly against the in-memory store.

mod common;

use campus_market::MemoryStore;
use common::{
    id_of, names, signer, spawn_app, spawn_configured, spawn_with_store, UnreachableStore,
};
use serde_json::{json, Value};
use std::sync::Arc;

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = spawn_app().await;

    let first = app.register("asha", "9876543210").await;
    assert_eq!(first.status(), 200);
    let body: Value = first.json().await.unwrap();
    assert_eq!(body["message"], "Registered");

    let second = app.register("asha", "9123456789").await;
    assert_eq!(second.status(), 400);
    let body: Value = second.json().await.unwrap();
    assert_eq!(body["error"], "Username already taken");
}

#[tokio::test]
async fn registration_rejects_bad_mobile() {
    let app = spawn_app().await;
    let res = app.register("asha", "12345").await;
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn login_issues_a_token_for_the_account() {
    let app = spawn_app().await;
    app.register("asha", "9876543210").await;

    let res = app
        .client
        .post(app.url("/login"))
        .json(&json!({ "username": "asha", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["username"], "asha");
    assert_eq!(body["branch"], "Computer");
    assert_eq!(body["mobile"], "9876543210");

    let claims = signer().verify(body["token"].as_str().unwrap()).unwrap();
    assert_eq!(claims.username, "asha");
    assert_eq!(claims.branch, "Computer");

    let wrong = app
        .client
        .post(app.url("/login"))
        .json(&json!({ "username": "asha", "password": "nope" }))
        .send()
        .await
        .unwrap();
    assert_eq!(wrong.status(), 400);
    let body: Value = wrong.json().await.unwrap();
    assert_eq!(body["error"], "Invalid credentials");

    let unknown = app
        .client
        .post(app.url("/login"))
        .json(&json!({ "username": "ghost", "password": "hunter22" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), 400);
    let body: Value = unknown.json().await.unwrap();
    assert_eq!(body["error"], "User not found");
}

#[tokio::test]
async fn feed_filters_by_search_and_category() {
    let app = spawn_app().await;
    let token = app.signup("asha", "9876543210").await;

    for (name, category) in [
        ("Phone Case", "Electronics"),
        ("Engineering Maths", "Books"),
        ("Desk Lamp", "Electronics"),
    ] {
        let res = app.add_product(&token, "asha", name, category).await;
        assert_eq!(res.status(), 200);
        let body: Value = res.json().await.unwrap();
        assert_eq!(body["message"], "Item added!");
    }

    let all = app.products(&[("search", ""), ("category", "All")]).await;
    assert_eq!(names(&all), vec!["Desk Lamp", "Engineering Maths", "Phone Case"]);
    assert!(all.iter().all(|p| p["status"] == "active"));
    // No contactPhone was sent, so the registered mobile is used.
    assert!(all.iter().all(|p| p["contactPhone"] == "9876543210"));

    let books = app.products(&[("category", "Books")]).await;
    assert_eq!(names(&books), vec!["Engineering Maths"]);

    let phones = app.products(&[("search", "phone")]).await;
    assert_eq!(names(&phones), vec!["Phone Case"]);

    let none = app
        .products(&[("search", "lamp"), ("category", "Books")])
        .await;
    assert!(none.is_empty());
}

#[tokio::test]
async fn sold_items_leave_the_feed_but_stay_in_my_ads() {
    let app = spawn_app().await;
    let token = app.signup("asha", "9876543210").await;
    app.add_product(&token, "asha", "Cycle", "Other").await;
    app.add_product(&token, "asha", "Kettle", "Other").await;

    let ads = app.my_ads("asha").await;
    let cycle = id_of(&ads, "Cycle");

    let res = app
        .client
        .put(app.url(&format!("/mark-sold/{}", cycle)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Marked as sold");

    let feed = app.products(&[]).await;
    assert_eq!(names(&feed), vec!["Kettle"]);

    let ads = app.my_ads("asha").await;
    assert_eq!(ads.len(), 2);
    let sold = ads.iter().find(|p| p["name"] == "Cycle").unwrap();
    assert_eq!(sold["status"], "sold");
}

#[tokio::test]
async fn profile_update_rewrites_contact_phone_on_every_listing() {
    let app = spawn_app().await;
    let token = app.signup("asha", "9876543210").await;
    app.add_product(&token, "asha", "Cycle", "Other").await;
    app.add_product(&token, "asha", "Kettle", "Other").await;

    let res = app
        .client
        .put(app.url("/update-profile"))
        .bearer_auth(&token)
        .json(&json!({ "username": "asha", "mobile": "9000000001", "branch": "IT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Profile and Ads updated successfully!");
    assert_eq!(body["mobile"], "9000000001");
    assert_eq!(body["branch"], "IT");

    let ads = app.my_ads("asha").await;
    assert_eq!(ads.len(), 2);
    assert!(ads.iter().all(|p| p["contactPhone"] == "9000000001"));
}

#[tokio::test]
async fn update_and_delete_listing() {
    let app = spawn_app().await;
    let token = app.signup("asha", "9876543210").await;
    app.add_product(&token, "asha", "Cycle", "Other").await;
    let id = id_of(&app.my_ads("asha").await, "Cycle");

    let res = app
        .client
        .put(app.url(&format!("/update-product/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "price": "350", "description": "New tyres" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["message"], "Product updated successfully");
    assert_eq!(body["product"]["price"], 350.0);
    assert_eq!(body["product"]["description"], "New tyres");
    assert_eq!(body["product"]["name"], "Cycle");

    let res = app
        .client
        .delete(app.url(&format!("/delete-product/{}", id)))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
    assert!(app.products(&[]).await.is_empty());
    assert!(app.my_ads("asha").await.is_empty());

    let missing = app
        .client
        .put(app.url(&format!("/update-product/{}", id)))
        .bearer_auth(&token)
        .json(&json!({ "name": "Ghost" }))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), 404);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Product not found");
}

#[tokio::test]
async fn mutations_require_a_token_and_ownership() {
    let app = spawn_app().await;
    let asha = app.signup("asha", "9876543210").await;
    let ravi = app.signup("ravi", "9123456789").await;
    app.add_product(&asha, "asha", "Cycle", "Other").await;
    let id = id_of(&app.my_ads("asha").await, "Cycle");

    let anonymous = app
        .client
        .put(app.url(&format!("/mark-sold/{}", id)))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous.status(), 401);

    let forged = app
        .client
        .delete(app.url(&format!("/delete-product/{}", id)))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(forged.status(), 401);

    let foreign = app
        .client
        .delete(app.url(&format!("/delete-product/{}", id)))
        .bearer_auth(&ravi)
        .send()
        .await
        .unwrap();
    assert_eq!(foreign.status(), 403);

    let form = reqwest::multipart::Form::new()
        .text("name", "Anon")
        .text("price", "10")
        .text("category", "Other")
        .text("sellerName", "asha");
    let anonymous_add = app
        .client
        .post(app.url("/add-product"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous_add.status(), 401);

    let anonymous_edit = app
        .client
        .put(app.url(&format!("/update-product/{}", id)))
        .json(&json!({ "name": "Stolen" }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous_edit.status(), 401);

    let anonymous_profile = app
        .client
        .put(app.url("/update-profile"))
        .json(&json!({ "username": "asha", "mobile": "9000000001", "branch": "IT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(anonymous_profile.status(), 401);
    let body: Value = anonymous_profile.json().await.unwrap();
    assert!(body["error"].is_string());

    let impersonation = app.add_product(&ravi, "asha", "Fake", "Other").await;
    assert_eq!(impersonation.status(), 403);

    let other_profile = app
        .client
        .put(app.url("/update-profile"))
        .bearer_auth(&ravi)
        .json(&json!({ "username": "asha", "mobile": "9000000001", "branch": "IT" }))
        .send()
        .await
        .unwrap();
    assert_eq!(other_profile.status(), 403);

    assert_eq!(names(&app.products(&[]).await), vec!["Cycle"]);
    assert!(app
        .my_ads("asha")
        .await
        .iter()
        .all(|p| p["contactPhone"] == "9876543210"));
}

#[tokio::test]
async fn uploaded_images_are_served_back() {
    let app = spawn_app().await;
    let token = app.signup("asha", "9876543210").await;

    let image = b"\x89PNG fake image bytes".to_vec();
    let form = reqwest::multipart::Form::new()
        .text("name", "Poster")
        .text("price", "120")
        .text("category", "Other")
        .text("sellerName", "asha")
        .part(
            "image",
            reqwest::multipart::Part::bytes(image.clone()).file_name("my poster.png"),
        );
    let res = app
        .client
        .post(app.url("/add-product"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);

    let feed = app.products(&[]).await;
    let image_url = feed[0]["imageUrl"].as_str().unwrap().to_string();
    assert!(image_url.starts_with(&format!("{}/uploads/", app.base_url)));

    let served = app.client.get(&image_url).send().await.unwrap();
    assert_eq!(served.status(), 200);
    assert_eq!(served.bytes().await.unwrap().to_vec(), image);
}

#[tokio::test]
async fn listing_without_image_uses_placeholder() {
    let app = spawn_app().await;
    let token = app.signup("asha", "9876543210").await;
    app.add_product(&token, "asha", "Cycle", "Other").await;
    let feed = app.products(&[]).await;
    assert_eq!(feed[0]["imageUrl"], "https://via.placeholder.com/300");
}

#[tokio::test]
async fn health_reports_ok() {
    let app = spawn_app().await;
    let res = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn oversized_uploads_are_refused() {
    let app = spawn_configured(Arc::new(MemoryStore::new()), |state| {
        state.max_upload_bytes = 1024;
    })
    .await;
    let token = app.signup("asha", "9876543210").await;

    let form = reqwest::multipart::Form::new()
        .text("name", "Huge Poster")
        .text("price", "120")
        .text("category", "Other")
        .text("sellerName", "asha")
        .part(
            "image",
            reqwest::multipart::Part::bytes(vec![7u8; 4 * 1024]).file_name("poster.png"),
        );
    let res = app
        .client
        .post(app.url("/add-product"))
        .bearer_auth(&token)
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert!(res.status().is_client_error(), "got {}", res.status());

    assert!(app.my_ads("asha").await.is_empty());
    let mut stored = tokio::fs::read_dir(app.uploads.path()).await.unwrap();
    assert!(stored.next_entry().await.unwrap().is_none());

    // Small listings still fit under the limit.
    let ok = app.add_product(&token, "asha", "Cycle", "Other").await;
    assert_eq!(ok.status(), 200);
    assert_eq!(names(&app.my_ads("asha").await), vec!["Cycle"]);
}

#[tokio::test]
async fn health_reports_unreachable_store() {
    let app = spawn_with_store(Arc::new(UnreachableStore)).await;
    let res = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), 503);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["status"], "unhealthy");

    let feed = app.client.get(app.url("/products")).send().await.unwrap();
    assert_eq!(feed.status(), 500);
    let body: Value = feed.json().await.unwrap();
    assert_eq!(body["error"], "Internal server error");
}
