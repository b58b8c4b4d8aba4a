use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::domain::models::{LookupError, ShowRecord};
use crate::workflows::pipeline::ShowLookup;

const SUGGESTION_API_BASE: &str = "https://v2.sg.media-imdb.com/suggestion";
const TITLE_PAGE_BASE: &str = "https://www.imdb.com/title";
const USER_AGENT: &str = "Mozilla/5.0";

/// Resolves a show title in two round-trips: the suggestion API picks the
/// best-ranked TV series, then the title page's ld+json block supplies the
/// rating, votes, genres, runtime, release date, and creators.
#[derive(Debug)]
pub struct ImdbClient {
    http: reqwest::blocking::Client,
}

#[derive(Debug, Deserialize)]
struct SuggestionResponse {
    #[serde(default, rename = "d")]
    matches: Vec<Suggestion>,
}

#[derive(Debug, Deserialize)]
struct Suggestion {
    id: String,
    #[serde(rename = "l")]
    title: String,
    #[serde(default, rename = "q")]
    kind: Option<String>,
    #[serde(default, rename = "qid")]
    kind_id: Option<String>,
    #[serde(default, rename = "y")]
    year: Option<i32>,
}

#[derive(Debug, Deserialize)]
struct TitleDocument {
    #[serde(default)]
    name: Option<String>,
    #[serde(default, rename = "aggregateRating")]
    aggregate_rating: Option<AggregateRating>,
    #[serde(default)]
    genre: Vec<String>,
    #[serde(default, rename = "datePublished")]
    date_published: Option<String>,
    #[serde(default)]
    duration: Option<String>,
    #[serde(default)]
    creator: Vec<Credit>,
    #[serde(default)]
    director: Vec<Credit>,
}

#[derive(Debug, Deserialize)]
struct AggregateRating {
    #[serde(default, rename = "ratingValue")]
    rating_value: Option<f64>,
    #[serde(default, rename = "ratingCount")]
    rating_count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct Credit {
    // Organizations in the creator list carry no name; only named credits
    // make it into the record.
    #[serde(default)]
    name: Option<String>,
}

impl ImdbClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
        }
    }

    fn get(&self, url: &str) -> Result<String, LookupError> {
        let response = self
            .http
            .get(url)
            .header("User-Agent", USER_AGENT)
            .send()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Http(status.as_u16()));
        }

        response
            .text()
            .map_err(|e| LookupError::Network(e.to_string()))
    }

    fn search(&self, title: &str) -> Result<Vec<Suggestion>, LookupError> {
        let query = title.trim().to_lowercase();
        let Some(initial) = query.chars().next() else {
            return Err(LookupError::NotFound);
        };

        let url = format!(
            "{SUGGESTION_API_BASE}/{initial}/{}.json",
            urlencoding::encode(&query)
        );
        let body = self.get(&url)?;
        parse_suggestions(&body)
    }

    fn title_details(&self, hit: &Suggestion) -> Result<ShowRecord, LookupError> {
        let url = format!("{TITLE_PAGE_BASE}/{}/", hit.id);
        let html = self.get(&url)?;
        let document = extract_title_document(&html)?;
        Ok(build_record(hit, &url, document))
    }
}

impl Default for ImdbClient {
    fn default() -> Self {
        Self::new()
    }
}

impl ShowLookup for ImdbClient {
    fn lookup(&mut self, title: &str) -> Result<ShowRecord, LookupError> {
        let matches = self.search(title)?;
        if matches.is_empty() {
            return Err(LookupError::NotFound);
        }

        let hit = matches
            .into_iter()
            .find(is_tv_series)
            .ok_or(LookupError::NoTvMatch)?;
        log::debug!("matched '{title}' to {} ({})", hit.title, hit.id);

        self.title_details(&hit)
    }
}

fn parse_suggestions(body: &str) -> Result<Vec<Suggestion>, LookupError> {
    let response: SuggestionResponse = serde_json::from_str(body)
        .map_err(|e| LookupError::BadResponse(format!("suggestion payload: {e}")))?;
    Ok(response.matches)
}

fn is_tv_series(suggestion: &Suggestion) -> bool {
    if !suggestion.id.starts_with("tt") {
        return false;
    }
    match suggestion.kind_id.as_deref() {
        Some("tvSeries") | Some("tvMiniSeries") => true,
        Some(_) => false,
        // Older payloads only carry the display label, e.g. "TV series".
        None => suggestion
            .kind
            .as_deref()
            .is_some_and(|q| q.to_ascii_lowercase().contains("tv")),
    }
}

fn extract_title_document(html: &str) -> Result<TitleDocument, LookupError> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"script[type="application/ld+json"]"#).unwrap();

    let script = document
        .select(&selector)
        .next()
        .ok_or_else(|| LookupError::BadResponse("missing ld+json metadata block".to_string()))?;
    let raw = script.text().collect::<String>();

    serde_json::from_str(&raw).map_err(|e| LookupError::BadResponse(format!("ld+json: {e}")))
}

fn build_record(hit: &Suggestion, url: &str, document: TitleDocument) -> ShowRecord {
    let year = document
        .date_published
        .as_deref()
        .and_then(|date| date.get(..4))
        .and_then(|y| y.parse().ok())
        .or(hit.year);

    // Series pages usually only publish a premiere date; when even that is
    // missing, fall back to January 1st of the known year.
    let release_date = document
        .date_published
        .clone()
        .or_else(|| year.map(|y| format!("{y}-01-01")));

    let mut directors: Vec<String> = document
        .creator
        .iter()
        .filter_map(|c| c.name.clone())
        .collect();
    if directors.is_empty() {
        directors = document
            .director
            .iter()
            .filter_map(|c| c.name.clone())
            .collect();
    }

    let (rating, votes) = match document.aggregate_rating {
        Some(aggregate) => (aggregate.rating_value, aggregate.rating_count),
        None => (None, None),
    };

    ShowRecord {
        // Caller assigns the list position.
        position: 0,
        imdb_id: hit.id.clone(),
        title: document.name.unwrap_or_else(|| hit.title.clone()),
        url: url.to_string(),
        rating,
        votes,
        year,
        genres: document.genre,
        runtime_minutes: document.duration.as_deref().and_then(parse_runtime_minutes),
        release_date,
        directors,
    }
}

/// ISO-8601 durations as IMDb emits them: "PT49M", "PT1H", "PT1H5M".
fn parse_runtime_minutes(duration: &str) -> Option<i32> {
    let re = Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?").unwrap();
    let caps = re.captures(duration)?;

    let hours: i32 = caps.get(1).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let minutes: i32 = caps.get(2).and_then(|m| m.as_str().parse().ok()).unwrap_or(0);
    let total = hours * 60 + minutes;
    (total > 0).then_some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUGGESTION_BODY: &str = r#"{
        "d": [
            {"id": "nm0186505", "l": "Bryan Cranston", "rank": 500},
            {"id": "tt2084970", "l": "The Imitation Game", "q": "feature", "qid": "movie", "y": 2014},
            {"id": "tt0903747", "l": "Breaking Bad", "q": "TV series", "qid": "tvSeries", "y": 2008}
        ]
    }"#;

    fn title_html(ld_json: &str) -> String {
        format!(
            "<html><head><script type=\"application/ld+json\">{ld_json}</script></head><body></body></html>"
        )
    }

    fn breaking_bad_hit() -> Suggestion {
        Suggestion {
            id: "tt0903747".to_string(),
            title: "Breaking Bad".to_string(),
            kind: Some("TV series".to_string()),
            kind_id: Some("tvSeries".to_string()),
            year: Some(2008),
        }
    }

    #[test]
    fn test_parse_suggestions_and_tv_filter() {
        let matches = parse_suggestions(SUGGESTION_BODY).unwrap();
        assert_eq!(matches.len(), 3);

        let hit = matches.into_iter().find(is_tv_series).unwrap();
        assert_eq!(hit.id, "tt0903747");
        assert_eq!(hit.title, "Breaking Bad");
    }

    #[test]
    fn test_suggestions_without_tv_entries_have_no_match() {
        let body = r#"{"d": [{"id": "tt2084970", "l": "The Imitation Game", "qid": "movie"}]}"#;
        let matches = parse_suggestions(body).unwrap();
        assert!(!matches.is_empty());
        assert!(matches.into_iter().find(is_tv_series).is_none());
    }

    #[test]
    fn test_tv_filter_falls_back_to_display_label() {
        let body = r#"{"d": [{"id": "tt1234567", "l": "Some Show", "q": "TV mini-series"}]}"#;
        let matches = parse_suggestions(body).unwrap();
        assert!(matches.into_iter().any(|s| is_tv_series(&s)));
    }

    #[test]
    fn test_empty_payload_parses_to_no_matches() {
        assert!(parse_suggestions("{}").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_payload_is_a_bad_response() {
        let err = parse_suggestions("<html>Too Many Requests</html>").unwrap_err();
        assert!(matches!(err, LookupError::BadResponse(_)));
    }

    #[test]
    fn test_full_title_document() {
        let html = title_html(
            r#"{
                "@type": "TVSeries",
                "name": "Breaking Bad",
                "genre": ["Crime", "Drama", "Thriller"],
                "datePublished": "2008-01-20",
                "duration": "PT49M",
                "creator": [
                    {"@type": "Organization", "url": "https://www.imdb.com/company/co0159275/"},
                    {"@type": "Person", "name": "Vince Gilligan"}
                ],
                "director": [],
                "aggregateRating": {"ratingValue": 9.5, "ratingCount": 1854764}
            }"#,
        );

        let document = extract_title_document(&html).unwrap();
        let record = build_record(
            &breaking_bad_hit(),
            "https://www.imdb.com/title/tt0903747/",
            document,
        );

        assert_eq!(record.imdb_id, "tt0903747");
        assert_eq!(record.title, "Breaking Bad");
        assert_eq!(record.rating, Some(9.5));
        assert_eq!(record.votes, Some(1_854_764));
        assert_eq!(record.year, Some(2008));
        assert_eq!(record.genres, vec!["Crime", "Drama", "Thriller"]);
        assert_eq!(record.runtime_minutes, Some(49));
        assert_eq!(record.release_date.as_deref(), Some("2008-01-20"));
        assert_eq!(record.directors, vec!["Vince Gilligan"]);
    }

    #[test]
    fn test_sparse_title_document_leaves_fields_empty() {
        let html = title_html(r#"{"@type": "TVSeries", "name": "Obscure Show"}"#);
        let document = extract_title_document(&html).unwrap();

        let mut hit = breaking_bad_hit();
        hit.year = None;
        let record = build_record(&hit, "https://www.imdb.com/title/tt0903747/", document);

        assert_eq!(record.title, "Obscure Show");
        assert!(record.rating.is_none());
        assert!(record.votes.is_none());
        assert!(record.year.is_none());
        assert!(record.genres.is_empty());
        assert!(record.runtime_minutes.is_none());
        assert!(record.release_date.is_none());
        assert!(record.directors.is_empty());
    }

    #[test]
    fn test_year_and_release_date_fall_back_to_suggestion() {
        let html = title_html(r#"{"@type": "TVSeries", "name": "Breaking Bad"}"#);
        let document = extract_title_document(&html).unwrap();
        let record = build_record(
            &breaking_bad_hit(),
            "https://www.imdb.com/title/tt0903747/",
            document,
        );

        assert_eq!(record.year, Some(2008));
        assert_eq!(record.release_date.as_deref(), Some("2008-01-01"));
    }

    #[test]
    fn test_director_credits_used_when_no_creators() {
        let html = title_html(
            r#"{"name": "Some Show", "director": [{"@type": "Person", "name": "Jane Doe"}]}"#,
        );
        let document = extract_title_document(&html).unwrap();
        let record = build_record(
            &breaking_bad_hit(),
            "https://www.imdb.com/title/tt0903747/",
            document,
        );
        assert_eq!(record.directors, vec!["Jane Doe"]);
    }

    #[test]
    fn test_page_without_metadata_block_is_a_bad_response() {
        let err = extract_title_document("<html><body>captcha</body></html>").unwrap_err();
        assert!(matches!(err, LookupError::BadResponse(_)));
    }

    #[test]
    fn test_parse_runtime_minutes() {
        assert_eq!(parse_runtime_minutes("PT49M"), Some(49));
        assert_eq!(parse_runtime_minutes("PT1H"), Some(60));
        assert_eq!(parse_runtime_minutes("PT1H5M"), Some(65));
        assert_eq!(parse_runtime_minutes("PT0M"), None);
        assert_eq!(parse_runtime_minutes("49 min"), None);
    }
}
