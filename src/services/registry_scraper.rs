use std::{cmp::Ordering, collections::HashMap, sync::Arc};

use anyhow::Context;
use lazy_static::lazy_static;
use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, REFERER, USER_AGENT,
};
use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::{
    configuration::{FetchSettings, RegistrySettings},
    domain::{RegistryMatch, RegistryRecord},
};

use super::{Fetcher, LookupError, SimilarityScorer};

const DOCUMENT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";

lazy_static! {
    static ref RESULT_BLOCK: Selector = Selector::parse("div.single-post").unwrap();
    static ref RESULT_TITLE: Selector = Selector::parse("div.titles").unwrap();
    static ref RESULT_LINK: Selector = Selector::parse("a[href]").unwrap();
    static ref DETAIL_TABLE: Selector = Selector::parse("table.table_guide01").unwrap();
    static ref TABLE_ROW: Selector = Selector::parse("tr").unwrap();
    static ref TABLE_CELL: Selector = Selector::parse("th, td").unwrap();
}

#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub title: String,
    pub link: String,
}

/// Matches canonical names against the business registry site and scrapes
/// the detail page of the accepted entries.
#[derive(Clone)]
pub struct RegistryClient {
    fetcher: Fetcher,
    base_url: Url,
    search_url: Url,
    scorer: Arc<dyn SimilarityScorer>,
    max_candidates: usize,
    user_agent: HeaderValue,
    accept_language: HeaderValue,
}

impl RegistryClient {
    pub fn new(
        fetcher: Fetcher,
        base_url: Url,
        search_path: &str,
        scorer: Arc<dyn SimilarityScorer>,
        max_candidates: usize,
        fetch_settings: &FetchSettings,
    ) -> anyhow::Result<Self> {
        let search_url = base_url
            .join(search_path)
            .with_context(|| format!("Invalid registry search path: {}", search_path))?;

        Ok(RegistryClient {
            fetcher,
            base_url,
            search_url,
            scorer,
            max_candidates: max_candidates.max(1),
            user_agent: HeaderValue::from_str(&fetch_settings.user_agent)
                .context("Invalid user agent")?,
            accept_language: HeaderValue::from_str(&fetch_settings.accept_language)
                .context("Invalid accept language header")?,
        })
    }

    pub fn from_settings(
        fetcher: Fetcher,
        settings: &RegistrySettings,
        fetch_settings: &FetchSettings,
    ) -> anyhow::Result<Self> {
        let base_url = Url::parse(&settings.base_url)
            .with_context(|| format!("Invalid registry url: {}", settings.base_url))?;

        RegistryClient::new(
            fetcher,
            base_url,
            &settings.search_path,
            settings.match_strategy.scorer(),
            settings.max_candidates,
            fetch_settings,
        )
    }

    pub fn max_candidates(&self) -> usize {
        self.max_candidates
    }

    pub fn query_url(&self, name: &str) -> Url {
        let mut url = self.search_url.clone();
        url.query_pairs_mut()
            .append_pair("area", "")
            .append_pair("query", name);
        url
    }

    /// Returns up to `max_candidates` matches for `name`. An empty vec means
    /// the search failed or listed nothing. A match whose detail page could
    /// not be read carries an all-empty record.
    pub async fn resolve_registry(&self, name: &str) -> Vec<RegistryMatch> {
        let listings = match self.search(name).await {
            Ok(listings) => listings,
            Err(e) => {
                log::warn!("Registry search for {} found nothing: {}", name, e);
                return vec![];
            }
        };

        let matches = select_matches(name, &listings, self.scorer.as_ref(), self.max_candidates);
        if matches.is_empty() {
            log::warn!(
                "None of {} registry listings matched {}",
                listings.len(),
                name
            );
        }

        let mut results = vec![];
        for (listing, score) in matches {
            log::info!(
                "Matched {} to registry listing {} (score {:.3})",
                name,
                listing.title,
                score
            );

            let record = match self.fetch_detail(&listing).await {
                Ok(record) => record,
                Err(e) => {
                    log::error!("Registry detail for {} unavailable: {}", listing.title, e);
                    RegistryRecord::empty()
                }
            };

            results.push(RegistryMatch {
                label: listing.title.clone(),
                score,
                record,
            });
        }

        results
    }

    async fn search(&self, name: &str) -> Result<Vec<Listing>, LookupError> {
        let url = self.query_url(name);
        let headers = self.document_headers(&url, "same-origin");
        let body = self.fetcher.fetch(&url, headers).await.into_body()?;

        parse_listings(&body)
    }

    async fn fetch_detail(&self, listing: &Listing) -> Result<RegistryRecord, LookupError> {
        let url = self
            .base_url
            .join(&listing.link)
            .map_err(|_| LookupError::ParseMiss("detail link"))?;
        let headers = self.document_headers(&url, "none");
        let body = self.fetcher.fetch(&url, headers).await.into_body()?;

        parse_detail(&body)
    }

    fn document_headers(&self, url: &Url, fetch_site: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(DOCUMENT_ACCEPT));
        headers.insert(ACCEPT_LANGUAGE, self.accept_language.clone());
        headers.insert(USER_AGENT, self.user_agent.clone());
        headers.insert(
            HeaderName::from_static("upgrade-insecure-requests"),
            HeaderValue::from_static("1"),
        );
        if let Ok(referer) = HeaderValue::from_str(url.as_str()) {
            headers.insert(REFERER, referer);
        }
        headers.insert(
            HeaderName::from_static("sec-fetch-dest"),
            HeaderValue::from_static("document"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-mode"),
            HeaderValue::from_static("navigate"),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-site"),
            HeaderValue::from_static(fetch_site),
        );
        headers.insert(
            HeaderName::from_static("sec-fetch-user"),
            HeaderValue::from_static("?1"),
        );
        headers
    }
}

fn stripped_text(element: ElementRef) -> String {
    element.text().map(str::trim).collect()
}

fn trimmed_text(element: ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Result blocks with both a title and a link, in page order.
pub fn parse_listings(html: &str) -> Result<Vec<Listing>, LookupError> {
    let document = Html::parse_document(html);

    let listings: Vec<Listing> = document
        .select(&RESULT_BLOCK)
        .filter_map(|block| {
            let title = block.select(&RESULT_TITLE).next().map(stripped_text)?;
            let link = block
                .select(&RESULT_LINK)
                .next()
                .and_then(|a| a.value().attr("href"))?;

            Some(Listing {
                title,
                link: link.to_string(),
            })
        })
        .collect();

    match listings.is_empty() {
        true => Err(LookupError::EmptyResult),
        false => Ok(listings),
    }
}

/// Reads the two-column label/value table of a detail page.
pub fn parse_detail(html: &str) -> Result<RegistryRecord, LookupError> {
    let document = Html::parse_document(html);
    let table = document
        .select(&DETAIL_TABLE)
        .next()
        .ok_or(LookupError::ParseMiss("detail table"))?;

    let mut values = HashMap::new();
    for row in table.select(&TABLE_ROW) {
        let cells: Vec<ElementRef> = row.select(&TABLE_CELL).collect();
        if let [label, value] = cells.as_slice() {
            values.insert(trimmed_text(*label), trimmed_text(*value));
        }
    }

    Ok(RegistryRecord::from_table(&values))
}

/// Scores every listing against `query` and keeps at most `max` of them.
///
/// Only strictly positive scores qualify. With `max == 1` the best entry is
/// replaced only by a strictly greater score, so the earliest listing wins ties;
/// larger `max` values keep the same tie order through a stable sort.
pub fn select_matches(
    query: &str,
    listings: &[Listing],
    scorer: &dyn SimilarityScorer,
    max: usize,
) -> Vec<(Listing, f64)> {
    if max <= 1 {
        let mut best: Option<&Listing> = None;
        let mut highest = 0.0;
        for listing in listings {
            let score = scorer.score(query, &listing.title);
            if score > highest {
                highest = score;
                best = Some(listing);
            }
        }
        return best
            .map(|listing| vec![(listing.clone(), highest)])
            .unwrap_or_default();
    }

    let mut scored: Vec<(Listing, f64)> = listings
        .iter()
        .map(|listing| (listing.clone(), scorer.score(query, &listing.title)))
        .filter(|(_, score)| *score > 0.0)
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
    scored.truncate(max);
    scored
}

#[cfg(test)]
mod tests {
    use super::{parse_detail, parse_listings, select_matches, Listing};
    use crate::services::{
        CorporatePrefix, JaroWinkler, LookupError, MatchStrategy, SimilarityScorer,
    };

    const LISTING_PAGE: &str = r#"
        <html><body>
          <div class="single-post">
            <div class="titles"><a href="/article/1111"> ACME <span>Trading</span></a></div>
          </div>
          <div class="single-post">
            <div class="titles">no link here</div>
          </div>
          <div class="single-post">
            <div class="titles"><a href="/article/2222">ACME</a></div>
          </div>
        </body></html>
    "#;

    const DETAIL_PAGE: &str = r#"
        <html><body>
          <table class="table_guide01">
            <tr><th> 사업자등록번호 </th><td> 123-45-67890 </td></tr>
            <tr><th>대표자명</th><td>홍길동</td></tr>
            <tr><th>회사주소</th><td>서울특별시 강서구</td></tr>
            <tr><th>colspan row</th></tr>
            <tr><th>a</th><td>b</td><td>c</td></tr>
          </table>
        </body></html>
    "#;

    fn listing(title: &str, link: &str) -> Listing {
        Listing {
            title: title.to_string(),
            link: link.to_string(),
        }
    }

    struct Fixed;

    impl SimilarityScorer for Fixed {
        fn score(&self, _query: &str, title: &str) -> f64 {
            match title {
                "low" => 0.2,
                "zero" => 0.0,
                _ => 0.8,
            }
        }
    }

    #[test]
    fn listings_need_title_and_link() {
        let listings = parse_listings(LISTING_PAGE).unwrap();

        assert_eq!(
            listings,
            vec![
                listing("ACMETrading", "/article/1111"),
                listing("ACME", "/article/2222"),
            ]
        );
    }

    #[test]
    fn page_without_blocks_is_empty_result() {
        assert!(matches!(
            parse_listings("<html><body><p>검색 결과가 없습니다</p></body></html>"),
            Err(LookupError::EmptyResult)
        ));
    }

    #[test]
    fn detail_table_maps_to_record() {
        let record = parse_detail(DETAIL_PAGE).unwrap();

        assert_eq!(record.business_registration_number, "123-45-67890");
        assert_eq!(record.representative, "홍길동");
        assert_eq!(record.address, "서울특별시 강서구");
        assert_eq!(record.homepage, "");
    }

    #[test]
    fn missing_detail_table_is_parse_miss() {
        assert!(matches!(
            parse_detail("<html><body><table><tr><th>x</th><td>y</td></tr></table></body></html>"),
            Err(LookupError::ParseMiss(_))
        ));
    }

    #[test]
    fn best_match_prefers_higher_score() {
        let listings = parse_listings(LISTING_PAGE).unwrap();
        let matches = select_matches("ACME", &listings, &JaroWinkler, 1);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0.link, "/article/2222");
        assert_eq!(matches[0].1, 1.0);
    }

    #[test]
    fn equal_scores_keep_first_listing() {
        let listings = vec![
            listing("first", "/1"),
            listing("low", "/2"),
            listing("second", "/3"),
        ];

        let best = select_matches("q", &listings, &Fixed, 1);
        assert_eq!(best[0].0.link, "/1");

        let top = select_matches("q", &listings, &Fixed, 2);
        let links: Vec<&str> = top.iter().map(|(l, _)| l.link.as_str()).collect();
        assert_eq!(links, vec!["/1", "/3"]);
    }

    #[test]
    fn zero_scores_never_match() {
        let listings = vec![listing("zero", "/1")];
        assert!(select_matches("q", &listings, &Fixed, 1).is_empty());
        assert!(select_matches("q", &listings, &Fixed, 3).is_empty());
        assert!(select_matches("한빛", &[listing("푸른산업", "/x")], &CorporatePrefix, 1).is_empty());
    }

    #[test]
    fn top_candidates_are_bounded() {
        let listings: Vec<Listing> = (0..10)
            .map(|i| listing("same", &format!("/{}", i)))
            .collect();

        assert_eq!(select_matches("q", &listings, &Fixed, 3).len(), 3);
    }

    #[test]
    fn default_strategy_matches_corporate_titles() {
        let scorer = MatchStrategy::default().scorer();

        let matches = select_matches(
            "한빛상사",
            &[listing("(주)한빛상사", "/article/1")],
            scorer.as_ref(),
            1,
        );
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].0.link, "/article/1");

        let listings = vec![listing("Zenith", "/article/2"), listing("㈜ACME", "/article/3")];
        let matches = select_matches("ACME", &listings, scorer.as_ref(), 1);
        assert_eq!(matches[0].0.link, "/article/3");
    }
}
