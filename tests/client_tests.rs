//! HTTP client tests against a local mock of the PokeAPI routes

use pokedex::api::{CatalogClient, CatalogError};
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn list_body(names: &[&str], base: &str) -> serde_json::Value {
    let results: Vec<_> = names
        .iter()
        .enumerate()
        .map(|(idx, name)| json!({ "name": name, "url": format!("{base}/pokemon/{}/", idx + 1) }))
        .collect();
    json!({ "count": 1302, "next": null, "previous": null, "results": results })
}

fn bulbasaur_body() -> serde_json::Value {
    json!({
        "id": 1,
        "name": "bulbasaur",
        "height": 7,
        "weight": 69,
        "base_experience": 64,
        "sprites": {
            "front_default": "https://img/1.png",
            "front_shiny": "https://img/shiny/1.png",
            "other": { "official-artwork": { "front_default": "https://img/art/1.png" } }
        },
        "types": [
            { "slot": 1, "type": { "name": "grass", "url": "https://x/type/12/" } },
            { "slot": 2, "type": { "name": "poison", "url": "https://x/type/4/" } }
        ],
        "stats": [
            { "base_stat": 45, "effort": 0, "stat": { "name": "hp", "url": "https://x/stat/1/" } },
            { "base_stat": 49, "effort": 0, "stat": { "name": "attack", "url": "https://x/stat/2/" } }
        ],
        "abilities": [
            { "ability": { "name": "overgrow", "url": "https://x/ability/65/" }, "is_hidden": false, "slot": 1 },
            { "ability": { "name": "chlorophyll", "url": "https://x/ability/34/" }, "is_hidden": true, "slot": 3 }
        ]
    })
}

#[tokio::test]
async fn list_summaries_requests_page_and_keeps_order() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pokemon"))
        .and(query_param("limit", "150"))
        .and(query_param("offset", "0"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(list_body(&["bulbasaur", "ivysaur", "venusaur"], &server.uri())),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = CatalogClient::new(server.uri());
    let summaries = client.list_summaries(150, 0).await.unwrap();

    let names: Vec<_> = summaries.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["bulbasaur", "ivysaur", "venusaur"]);
    assert_eq!(summaries[2].id(), Some(3));
}

#[tokio::test]
async fn list_summaries_non_success_reports_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pokemon"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = CatalogClient::new(server.uri());
    let error = client.list_summaries(150, 0).await.unwrap_err();
    assert_eq!(error, CatalogError::RequestFailed { status: 500 });
}

#[tokio::test]
async fn get_detail_by_id_and_by_name() {
    let server = MockServer::start().await;
    for route in ["/pokemon/1", "/pokemon/bulbasaur"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_json(bulbasaur_body()))
            .expect(1)
            .mount(&server)
            .await;
    }

    let client = CatalogClient::new(server.uri());
    let by_id = client.get_detail("1").await.unwrap();
    let by_name = client.get_detail("bulbasaur").await.unwrap();

    assert_eq!(by_id, by_name);
    assert_eq!(by_id.types, vec!["grass", "poison"]);
    assert_eq!(by_id.artwork_url(), Some("https://img/art/1.png"));
    assert_eq!(by_id.base_experience, Some(64));
    assert!(by_id.abilities[1].is_hidden);
}

#[tokio::test]
async fn get_detail_missing_entry_is_request_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pokemon/missingno"))
        .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
        .mount(&server)
        .await;

    let client = CatalogClient::new(server.uri());
    let error = client.get_detail("missingno").await.unwrap_err();
    assert_eq!(error, CatalogError::RequestFailed { status: 404 });
}

#[tokio::test]
async fn malformed_body_is_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pokemon/1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{ not json"))
        .mount(&server)
        .await;

    let client = CatalogClient::new(server.uri());
    let error = client.get_detail("1").await.unwrap_err();
    assert!(matches!(error, CatalogError::Parse(_)), "got {error:?}");
}

#[tokio::test]
async fn repeated_calls_are_not_cached() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pokemon/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(bulbasaur_body()))
        .expect(2)
        .mount(&server)
        .await;

    let client = CatalogClient::new(server.uri());
    client.get_detail("1").await.unwrap();
    client.get_detail("1").await.unwrap();
}
