//! End-to-end selection flow: mocked Airtable table through digest
//! composition to a rendered mail message.

use projectmail::airtable::AirtableClient;
use projectmail::config::AirtableConfig;
use projectmail::digest::build_digest;
use projectmail::mailer;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn table_config() -> AirtableConfig {
    AirtableConfig {
        api_key: "key-test".to_owned(),
        base_id: "appBase".to_owned(),
        table_name: "Projects".to_owned(),
        retry_count: 1,
        retry_sleep: 0,
    }
}

#[tokio::test]
async fn fetched_table_becomes_a_deterministic_digest() {
    let server = MockServer::start().await;

    // cat1's only open record is A, cat2's only record is C, so the digest
    // is fully determined: do-soon section then one pick per category.
    Mock::given(method("GET"))
        .and(path("/appBase/Projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"id": "rec1", "fields": {"Project": "A", "Category": "cat1", "Do soon": true}},
                {"id": "rec2", "fields": {"Project": "B", "Category": "cat1", "Done": true}},
                {"id": "rec3", "fields": {"Project": "C", "Category": "cat2"}}
            ]
        })))
        .mount(&server)
        .await;

    let records = AirtableClient::new(table_config())
        .with_base_url(server.uri())
        .fetch_records()
        .await
        .unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let body = build_digest(&records, "Projects for this weekend:", &mut rng);
    assert_eq!(body, "Projects for this weekend:\n- A\n- A\n- C");

    // Same input and seed, same digest.
    let mut rng = StdRng::seed_from_u64(7);
    assert_eq!(
        build_digest(&records, "Projects for this weekend:", &mut rng),
        body
    );
}

#[tokio::test]
async fn digest_body_lands_in_a_high_priority_message() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/appBase/Projects"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                {"id": "rec1", "fields": {"Project": "Fix gutter", "Category": "house"}}
            ]
        })))
        .mount(&server)
        .await;

    let records = AirtableClient::new(table_config())
        .with_base_url(server.uri())
        .fetch_records()
        .await
        .unwrap();

    let mut rng = StdRng::seed_from_u64(1);
    let body = build_digest(&records, "This week:", &mut rng);

    let message = mailer::compose(
        "digest@example.com",
        &["friend@example.com".to_owned()],
        "Weekend projects",
        &body,
        true,
    )
    .unwrap();

    let rendered = String::from_utf8_lossy(&message.formatted()).to_string();
    assert!(rendered.contains("X-Priority: 2"));
    assert!(rendered.contains("Fix gutter"));
}
