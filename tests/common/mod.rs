#![allow(dead_code)]

use std::time::Duration;

use bizfinder::{
    configuration::FetchSettings,
    domain::PhoneQuery,
    services::{Fetcher, MatchStrategy, Pipeline, PlaceSearchClient, RegistryClient, RetryPolicy},
};
use reqwest::header::HeaderMap;
use url::Url;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const PLACE_PATH: &str = "/p/api/search/allSearch";
pub const SEARCH_COORD: &str = "126.85150490000274;37.553927499999716";

pub fn phone(raw: &str) -> PhoneQuery {
    PhoneQuery::parse(raw.to_string()).unwrap()
}

pub fn fetch_settings() -> FetchSettings {
    FetchSettings {
        max_retries: 5,
        initial_delay_millis: 1,
        timeout_secs: 5,
        user_agent: "bizfinder-tests".to_string(),
        accept_language: "ko-KR,ko;q=0.9".to_string(),
    }
}

pub fn fetcher() -> Fetcher {
    Fetcher::new(
        reqwest::Client::new(),
        RetryPolicy {
            max_retries: 5,
            initial_delay: Duration::from_millis(1),
        },
    )
}

pub fn place_client(server: &MockServer) -> PlaceSearchClient {
    let endpoint = Url::parse(&server.uri()).unwrap().join(PLACE_PATH).unwrap();
    PlaceSearchClient::new(fetcher(), endpoint, SEARCH_COORD.to_string(), HeaderMap::new())
}

pub fn registry_client(server: &MockServer, max_candidates: usize) -> RegistryClient {
    RegistryClient::new(
        fetcher(),
        Url::parse(&server.uri()).unwrap(),
        "/",
        MatchStrategy::JaroWinkler.scorer(),
        max_candidates,
        &fetch_settings(),
    )
    .unwrap()
}

pub fn pipeline(
    place_server: &MockServer,
    registry_server: &MockServer,
    max_candidates: usize,
    workers: usize,
) -> Pipeline {
    Pipeline::new(
        place_client(place_server),
        registry_client(registry_server, max_candidates),
        workers,
    )
}

pub fn place_envelope(names: &[&str]) -> serde_json::Value {
    let list: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "name": name,
                "tel": "02-123-4567",
                "category": ["제조업", "기계"],
                "roadAddress": "서울특별시 강서구 공항대로 1"
            })
        })
        .collect();

    serde_json::json!({ "result": { "place": { "list": list } } })
}

/// Map service answering `phone` with the given place names.
pub async fn mount_places(server: &MockServer, phone: &str, names: &[&str]) {
    Mock::given(method("GET"))
        .and(path(PLACE_PATH))
        .and(query_param("query", phone))
        .and(query_param("searchCoord", SEARCH_COORD))
        .respond_with(ResponseTemplate::new(200).set_body_json(place_envelope(names)))
        .mount(server)
        .await;
}

pub fn listing_page(entries: &[(&str, &str)]) -> String {
    let blocks: String = entries
        .iter()
        .map(|(title, link)| {
            format!(
                r#"<div class="single-post"><div class="titles"><a href="{}">{}</a></div><p>요약</p></div>"#,
                link, title
            )
        })
        .collect();

    format!("<html><body><section>{}</section></body></html>", blocks)
}

pub fn detail_page(registration_number: &str, representative: &str) -> String {
    format!(
        r#"<html><body><table class="table_guide01">
            <tr><th>회사명(영문)</th><td>ACME Co., Ltd.</td></tr>
            <tr><th>업태</th><td>제조업</td></tr>
            <tr><th>대표자명</th><td>{}</td></tr>
            <tr><th>사업자등록번호</th><td>{}</td></tr>
            <tr><th>회사주소</th><td>서울특별시 강서구 공항대로 1</td></tr>
        </table></body></html>"#,
        representative, registration_number
    )
}

/// Registry search page for `name` listing the given `(title, link)` entries.
pub async fn mount_listing(server: &MockServer, name: &str, entries: &[(&str, &str)]) {
    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("query", name))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(listing_page(entries))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

pub async fn mount_detail(server: &MockServer, link: &str, registration_number: &str) {
    Mock::given(method("GET"))
        .and(path(link))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(detail_page(registration_number, "홍길동"))
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}
