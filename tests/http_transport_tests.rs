//! End-to-end tests over a real HTTP server.
//!
//! The connection is blocking, so every client-side call runs inside
//! `spawn_blocking` while wiremock serves from the async side.

use restmodel::transport::HttpConnection;
use restmodel::{params, Api, Error, Model, Value};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn blocking<T, F>(work: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .expect("blocking task panicked")
}

fn post_model(base_url: &str) -> Model {
    let connection = HttpConnection::new(base_url).unwrap();
    Api::new(connection).register(Model::builder("Post"))
}

#[tokio::test]
async fn test_find_round_trips_a_record() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts/1"))
        .and(header("Accept", "application/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"id": 1, "title": "One"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let record = blocking(move || post_model(&base).find(1)).await.unwrap();

    assert!(record.persisted());
    assert_eq!(record.attributes()["title"], Value::from("One"));
}

#[tokio::test]
async fn test_filters_ride_in_the_query_string() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .and(query_param("published", "true"))
        .and(query_param("page", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"[{"id": 1}]"#, "application/json"))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let first = blocking(move || {
        post_model(&base)
            .filter(params! { "published" => true })
            .first()
    })
    .await
    .unwrap();

    assert!(first.is_some());
}

#[tokio::test]
async fn test_save_posts_a_json_body() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/posts"))
        .and(body_json(serde_json::json!({"title": "Hello"})))
        .respond_with(
            ResponseTemplate::new(201).set_body_raw(r#"{"id": 10, "title": "Hello"}"#, "application/json"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let record = blocking(move || {
        let mut record = post_model(&base).new_record(params! { "title" => "Hello" });
        record.try_save().map(|()| record)
    })
    .await
    .unwrap();

    assert_eq!(record.attributes()["id"], Value::from(10));
}

#[tokio::test]
async fn test_pagination_headers_flow_through() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/posts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw("[]", "application/json")
                .insert_header("X-Page", "1")
                .insert_header("X-Total", "6")
                .insert_header("X-Total-Pages", "3"),
        )
        .mount(&server)
        .await;

    let base = server.uri();
    let count = blocking(move || post_model(&base).all().count()).await.unwrap();

    assert_eq!(count, 6);
}

#[tokio::test]
async fn test_failure_status_carries_field_errors() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/posts"))
        .respond_with(ResponseTemplate::new(422).set_body_raw(
            r#"{"errors": {"title": ["can't be blank"]}}"#,
            "application/json",
        ))
        .mount(&server)
        .await;

    let base = server.uri();
    let error = blocking(move || {
        post_model(&base)
            .try_create(params! {})
            .expect_err("save should fail")
    })
    .await;

    match error {
        Error::Request(request_error) => {
            assert_eq!(request_error.status(), 422);
            let field_errors = request_error.field_errors().unwrap();
            assert_eq!(field_errors["title"], vec!["can't be blank".to_string()]);
        }
        other => panic!("expected a request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_delete_tolerates_an_empty_body() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/posts/5"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let base = server.uri();
    let record = blocking(move || {
        let mut record = post_model(&base).load(params! { "id" => 5 });
        record.try_destroy().map(|()| record)
    })
    .await
    .unwrap();

    assert!(!record.persisted());
    assert_eq!(record.attributes()["id"], Value::Null);
}
