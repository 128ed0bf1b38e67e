mod common;

use std::sync::Arc;

use common::MockConnection;
use restmodel::transport::Method;
use restmodel::{params, Api, Model, Value};

fn post_model(connection: MockConnection) -> (Arc<MockConnection>, Model) {
    let connection = Arc::new(connection);
    let api = Api::with_connection(connection.clone());
    let post = api.register(Model::builder("Post"));
    (connection, post)
}

#[test]
fn test_count_reads_the_total_pages_header() {
    let (connection, post) = post_model(MockConnection::new().stub_listing("posts", 6, 3, "[]"));

    assert_eq!(post.all().pages().count().unwrap(), 3);
    assert_eq!(connection.call_count(), 1);
}

#[test]
fn test_at_requests_one_page() {
    let (connection, post) = post_model(
        MockConnection::new().stub_page("posts", 2, 6, 3, r#"[{"id": 3}, {"id": 4}]"#),
    );

    let records = post.all().pages().at(2).unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].attributes()["id"], Value::from(3));
    assert_eq!(connection.calls()[0].params["page"], Value::from(2));
}

#[test]
fn test_at_keeps_the_relation_filters() {
    let (connection, post) = post_model(MockConnection::new().stub_matching(
        Method::Get,
        "posts",
        params! { "published" => true, "page" => 1 },
        200,
        "[]",
    ));

    post.filter(params! { "published" => true })
        .pages()
        .at(1)
        .unwrap();

    let call = &connection.calls()[0];
    assert_eq!(call.params["published"], Value::Bool(true));
    assert_eq!(call.params["page"], Value::from(1));
}

#[test]
fn test_first_is_page_one() {
    let (connection, post) = post_model(
        MockConnection::new().stub_page("posts", 1, 6, 3, r#"[{"id": 1}]"#),
    );

    post.all().pages().first().unwrap();
    assert_eq!(connection.calls()[0].params["page"], Value::from(1));
}

#[test]
fn test_last_probes_the_count_then_fetches_that_page() {
    let (connection, post) = post_model(
        MockConnection::new()
            .stub_listing("posts", 6, 3, "[]")
            .stub_page("posts", 3, 6, 3, r#"[{"id": 5}, {"id": 6}]"#),
    );

    let records = post.all().pages().last().unwrap();
    assert_eq!(records[1].attributes()["id"], Value::from(6));

    let calls = connection.calls();
    assert_eq!(calls.len(), 2);
    assert!(!calls[0].params.contains_key("page"));
    assert_eq!(calls[1].params["page"], Value::from(3));
}

#[test]
fn test_iteration_yields_each_page_once() {
    let (_, post) = post_model(
        MockConnection::new()
            .stub_listing("posts", 3, 2, "[]")
            .stub_page("posts", 1, 3, 2, r#"[{"id": 1}, {"id": 2}]"#)
            .stub_page("posts", 2, 3, 2, r#"[{"id": 3}]"#),
    );

    let sizes: Vec<usize> = post
        .all()
        .pages()
        .iter()
        .map(|page| page.unwrap().len())
        .collect();

    assert_eq!(sizes, [2, 1]);
}

#[test]
fn test_iteration_is_lazy_and_restartable() {
    let (connection, post) = post_model(
        MockConnection::new()
            .stub_listing("posts", 3, 2, "[]")
            .stub_page("posts", 1, 3, 2, r#"[{"id": 1}]"#)
            .stub_page("posts", 2, 3, 2, r#"[{"id": 2}]"#),
    );

    let pager = post.all().pages();

    let mut pages = pager.iter();
    assert_eq!(connection.call_count(), 0);
    pages.next().unwrap().unwrap();
    // Probe plus page one; page two untouched.
    assert_eq!(connection.call_count(), 2);

    // A fresh iterator starts over with its own probe.
    let mut restarted = pager.iter();
    restarted.next().unwrap().unwrap();
    assert_eq!(connection.call_count(), 4);
}

#[test]
fn test_iteration_stops_after_an_error() {
    let (_, post) = post_model(
        MockConnection::new()
            .stub_listing("posts", 3, 2, "[]")
            .stub_page("posts", 1, 3, 2, r#"[{"id": 1}]"#)
            .stub_matching(Method::Get, "posts", params! { "page" => 2 }, 503, ""),
    );

    let results: Vec<_> = post.all().pages().iter().collect();
    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(results[1].is_err());
}

#[test]
fn test_empty_relation_yields_no_pages() {
    let (connection, post) = post_model(MockConnection::new().stub_listing("posts", 0, 0, "[]"));

    assert_eq!(post.all().pages().iter().count(), 0);
    assert_eq!(connection.call_count(), 1);
}
