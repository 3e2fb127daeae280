//! API integration tests

use bookshelf_api::{create_router, AppConfig, AppState};
use reqwest::{Client, StatusCode};
use serde_json::{json, Value};

/// Start a server on an ephemeral port with an empty catalog
async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr = listener.local_addr().expect("No local address");
    let app = create_router(AppState::new(AppConfig::default()));

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("Server failed");
    });

    format!("http://{}", addr)
}

fn book(name: &str, page_count: i64, read_page: i64, reading: bool) -> Value {
    json!({
        "name": name,
        "year": 2010,
        "author": "John Doe",
        "summary": "Lorem ipsum dolor sit amet",
        "publisher": "Dicoding Indonesia",
        "pageCount": page_count,
        "readPage": read_page,
        "reading": reading
    })
}

async fn create(client: &Client, base: &str, payload: &Value) -> String {
    let response = client
        .post(format!("{}/books", base))
        .json(payload)
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::CREATED);

    let body: Value = response.json().await.expect("Failed to parse response");
    body["data"]["bookId"].as_str().expect("No book ID").to_string()
}

async fn list(client: &Client, base: &str, query: &str) -> Vec<Value> {
    let response = client
        .get(format!("{}/books{}", base, query))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    body["data"]["books"].as_array().expect("No books array").clone()
}

fn names(books: &[Value]) -> Vec<&str> {
    books.iter().filter_map(|b| b["name"].as_str()).collect()
}

#[tokio::test]
async fn test_health_check() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .get(format!("{}/health", base))
        .send()
        .await
        .expect("Failed to send request");

    assert!(response.status().is_success());

    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_and_get_book() {
    let base = spawn_server().await;
    let client = Client::new();

    let missing = client
        .get(format!("{}/books/aaaaaaaaaaaaaaaa", base))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);

    let id = create(&client, &base, &book("Buku A", 100, 100, false)).await;

    let response = client
        .get(format!("{}/books/{}", base, id))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("Failed to parse response");
    let stored = &body["data"]["book"];
    assert_eq!(stored["id"], id.as_str());
    assert_eq!(stored["name"], "Buku A");
    assert_eq!(stored["year"], 2010);
    assert_eq!(stored["author"], "John Doe");
    assert_eq!(stored["summary"], "Lorem ipsum dolor sit amet");
    assert_eq!(stored["publisher"], "Dicoding Indonesia");
    assert_eq!(stored["pageCount"], 100);
    assert_eq!(stored["readPage"], 100);
    assert_eq!(stored["reading"], false);
    assert_eq!(stored["finished"], true);
    assert!(stored["insertedAt"].as_str().unwrap().ends_with('Z'));
    assert_eq!(stored["insertedAt"], stored["updatedAt"]);
}

#[tokio::test]
async fn test_create_validation() {
    let base = spawn_server().await;
    let client = Client::new();

    let response = client
        .post(format!("{}/books", base))
        .json(&json!({ "pageCount": 10, "readPage": 1 }))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Gagal menambahkan buku. Mohon isi nama buku");

    let response = client
        .post(format!("{}/books", base))
        .json(&book("Buku A", 80, 90, false))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(
        body["message"],
        "Gagal menambahkan buku. readPage tidak boleh lebih besar dari pageCount"
    );

    assert!(list(&client, &base, "").await.is_empty());
}

#[tokio::test]
async fn test_finished_with_zero_pages() {
    let base = spawn_server().await;
    let client = Client::new();
    let id = create(&client, &base, &book("Kosong", 0, 0, false)).await;

    let finished = list(&client, &base, "?finished=1").await;
    assert_eq!(finished.len(), 1);
    assert_eq!(finished[0]["id"], id.as_str());
}

#[tokio::test]
async fn test_list_filters() {
    let base = spawn_server().await;
    let client = Client::new();

    create(&client, &base, &book("Harry Potter", 100, 100, false)).await;
    create(&client, &base, &book("I'm Scream", 100, 10, true)).await;
    create(&client, &base, &book("The Scream", 100, 20, false)).await;

    let all = list(&client, &base, "").await;
    assert_eq!(names(&all), vec!["Harry Potter", "I'm Scream", "The Scream"]);
    for entry in &all {
        assert_eq!(entry.as_object().unwrap().len(), 3);
    }

    let screams = list(&client, &base, "?name=scream").await;
    assert_eq!(names(&screams), vec!["I'm Scream", "The Scream"]);

    let reading = list(&client, &base, "?reading=1").await;
    assert_eq!(names(&reading), vec!["I'm Scream"]);

    let not_reading = list(&client, &base, "?reading=0").await;
    assert_eq!(names(&not_reading), vec!["Harry Potter", "The Scream"]);

    let finished = list(&client, &base, "?finished=1").await;
    assert_eq!(names(&finished), vec!["Harry Potter"]);

    let unfinished = list(&client, &base, "?finished=0").await;
    assert_eq!(names(&unfinished), vec!["I'm Scream", "The Scream"]);

    // name wins over the flag filters
    let combined = list(&client, &base, "?name=harry&reading=1").await;
    assert_eq!(names(&combined), vec!["Harry Potter"]);

    assert!(list(&client, &base, "?reading=maybe").await.is_empty());
}

#[tokio::test]
async fn test_update_book() {
    let base = spawn_server().await;
    let client = Client::new();
    let id = create(&client, &base, &book("Buku A", 100, 10, false)).await;

    let response = client
        .put(format!("{}/books/{}", base, id))
        .json(&book("Buku A Revisi", 200, 150, true))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Buku berhasil diperbarui");

    let body: Value = client
        .get(format!("{}/books/{}", base, id))
        .send()
        .await
        .expect("Failed to send request")
        .json()
        .await
        .expect("Failed to parse response");
    let stored = &body["data"]["book"];
    assert_eq!(stored["name"], "Buku A Revisi");
    assert_eq!(stored["pageCount"], 200);
    assert_eq!(stored["readPage"], 150);
    assert_eq!(stored["reading"], true);

    let response = client
        .put(format!("{}/books/{}", base, id))
        .json(&book("Buku A", 100, 101, false))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .put(format!("{}/books/xxxxxxxxxxxxxxxx", base))
        .json(&book("Buku A", 100, 10, false))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Gagal memperbarui buku. Id tidak ditemukan");
}

#[tokio::test]
async fn test_delete_book() {
    let base = spawn_server().await;
    let client = Client::new();

    let first = create(&client, &base, &book("A", 10, 1, false)).await;
    let second = create(&client, &base, &book("B", 10, 1, false)).await;
    let third = create(&client, &base, &book("C", 10, 1, false)).await;

    let response = client
        .delete(format!("{}/books/{}", base, second))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["message"], "Buku berhasil dihapus");

    let ids: Vec<String> = list(&client, &base, "")
        .await
        .iter()
        .filter_map(|b| b["id"].as_str().map(str::to_string))
        .collect();
    assert_eq!(ids, vec![first, third]);

    let response = client
        .delete(format!("{}/books/{}", base, second))
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Buku gagal dihapus. Id tidak ditemukan");

    assert_eq!(list(&client, &base, "").await.len(), 2);
}
