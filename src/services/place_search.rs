use anyhow::Context;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, COOKIE, USER_AGENT};
use url::Url;

use crate::{
    configuration::{FetchSettings, PlaceSearchSettings},
    domain::{PhoneQuery, PlaceCandidate, PlaceEnvelope},
};

use super::{Fetcher, LookupError};

/// Looks phone numbers up on the map search service.
#[derive(Clone)]
pub struct PlaceSearchClient {
    fetcher: Fetcher,
    endpoint: Url,
    search_coord: String,
    headers: HeaderMap,
}

impl PlaceSearchClient {
    pub fn new(fetcher: Fetcher, endpoint: Url, search_coord: String, headers: HeaderMap) -> Self {
        PlaceSearchClient {
            fetcher,
            endpoint,
            search_coord,
            headers,
        }
    }

    pub fn from_settings(
        fetcher: Fetcher,
        settings: &PlaceSearchSettings,
        fetch_settings: &FetchSettings,
    ) -> anyhow::Result<Self> {
        let endpoint = Url::parse(&settings.base_url)
            .and_then(|base| base.join(&settings.path))
            .with_context(|| format!("Invalid place search url: {}", settings.base_url))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json, text/plain, */*"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&fetch_settings.accept_language)
                .context("Invalid accept language header")?,
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&fetch_settings.user_agent).context("Invalid user agent")?,
        );
        if let Some(cookie) = &settings.cookie {
            headers.insert(
                COOKIE,
                HeaderValue::from_str(cookie).context("Invalid place search cookie")?,
            );
        }

        Ok(PlaceSearchClient::new(
            fetcher,
            endpoint,
            settings.search_coord.clone(),
            headers,
        ))
    }

    pub fn search_url(&self, phone: &PhoneQuery) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("query", phone.as_str())
            .append_pair("type", "all")
            .append_pair("searchCoord", &self.search_coord)
            .append_pair("boundary", "");
        url
    }

    /// Returns every listed place in source order, or exactly one sentinel
    /// candidate when the lookup fails or lists nothing.
    pub async fn lookup_places(&self, phone: &PhoneQuery) -> Vec<PlaceCandidate> {
        match self.try_lookup_places(phone).await {
            Ok(candidates) => {
                log::info!("Found {} places for {}", candidates.len(), phone);
                candidates
            }
            Err(LookupError::EmptyResult) => {
                log::warn!("No place results for {}", phone);
                vec![PlaceCandidate::no_result(phone)]
            }
            Err(e) => {
                log::error!("Place lookup failed for {}: {}", phone, e);
                vec![PlaceCandidate::no_result(phone)]
            }
        }
    }

    async fn try_lookup_places(
        &self,
        phone: &PhoneQuery,
    ) -> Result<Vec<PlaceCandidate>, LookupError> {
        let url = self.search_url(phone);
        let body = self.fetcher.fetch(&url, self.headers.clone()).await.into_body()?;
        parse_places(phone, &body)
    }
}

pub fn parse_places(phone: &PhoneQuery, body: &str) -> Result<Vec<PlaceCandidate>, LookupError> {
    let envelope: PlaceEnvelope = serde_json::from_str(body)?;

    let candidates: Vec<PlaceCandidate> = envelope
        .into_items()
        .into_iter()
        .map(|item| item.into_candidate(phone))
        .collect();

    match candidates.is_empty() {
        true => Err(LookupError::EmptyResult),
        false => Ok(candidates),
    }
}
