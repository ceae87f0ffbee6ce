//! Shared test harness for integration tests.
//!
//! [`TestHarness`] starts a [`MockServer`] standing in for OMDb, builds a
//! full [`AppContext`] pointed at it, and serves the router on a random port.

#![allow(dead_code)]

use std::net::SocketAddr;

use serde_json::json;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use sr_core::config::Config;
use sr_server::context::AppContext;
use sr_server::router::build_router;

pub const TEST_API_KEY: &str = "test-key";

/// A running server plus the fake upstream behind it.
pub struct TestHarness {
    pub ctx: AppContext,
    pub omdb: MockServer,
    pub addr: SocketAddr,
    pub client: reqwest::Client,
}

impl TestHarness {
    /// Start with default configuration and a configured API key.
    pub async fn start() -> Self {
        Self::start_with(|_| {}).await
    }

    /// Start after letting the caller adjust the configuration.
    pub async fn start_with(configure: impl FnOnce(&mut Config)) -> Self {
        let omdb = MockServer::start().await;

        let mut config = Config::default();
        config.omdb.base_url = omdb.uri();
        config.omdb.api_key = Some(TEST_API_KEY.into());
        config.omdb.requests_per_second = 1000;
        configure(&mut config);

        let ctx = AppContext::from_config(config).expect("failed to build context");
        let app = build_router(ctx.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind random port");
        let addr = listener.local_addr().expect("failed to get local addr");

        tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        Self {
            ctx,
            omdb,
            addr,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// GET `path` as the client identified by `client_ip`.
    pub async fn get_as(&self, path: &str, client_ip: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .header("x-forwarded-for", client_ip)
            .send()
            .await
            .expect("request failed")
    }

    pub async fn get(&self, path: &str) -> reqwest::Response {
        self.get_as(path, "203.0.113.1").await
    }

    /// Number of requests the fake upstream has seen.
    pub async fn upstream_calls(&self) -> usize {
        self.omdb
            .received_requests()
            .await
            .map_or(0, |requests| requests.len())
    }

    /// Serve `title` as a series whose seasons carry the given ratings.
    pub async fn mount_series(&self, title: &str, imdb_id: &str, seasons: &[&[&str]]) {
        Mock::given(method("GET"))
            .and(query_param("t", title))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": title,
                "Type": "series",
                "imdbID": imdb_id,
                "Poster": "N/A",
                "Plot": "A test series.",
                "totalSeasons": seasons.len().to_string(),
                "Response": "True"
            })))
            .mount(&self.omdb)
            .await;

        for (index, ratings) in seasons.iter().enumerate() {
            let episodes: Vec<_> = ratings
                .iter()
                .enumerate()
                .map(|(i, rating)| {
                    json!({
                        "Title": format!("Episode {}", i + 1),
                        "Episode": (i + 1).to_string(),
                        "imdbRating": rating,
                    })
                })
                .collect();

            Mock::given(method("GET"))
                .and(query_param("i", imdb_id))
                .and(query_param("Season", (index + 1).to_string()))
                .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                    "Title": title,
                    "Season": (index + 1).to_string(),
                    "Episodes": episodes,
                    "Response": "True"
                })))
                .mount(&self.omdb)
                .await;
        }
    }

    /// Serve `title` as a non-series entry of `media_type`.
    pub async fn mount_title(&self, title: &str, media_type: &str) {
        Mock::given(method("GET"))
            .and(query_param("t", title))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Title": title,
                "Type": media_type,
                "imdbID": "tt0000001",
                "Response": "True"
            })))
            .mount(&self.omdb)
            .await;
    }

    /// Answer every unmatched lookup with OMDb's error body.
    pub async fn mount_not_found(&self, message: &str) {
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Response": "False",
                "Error": message
            })))
            .with_priority(10)
            .mount(&self.omdb)
            .await;
    }

    /// Serve a search for `query` returning `(title, type)` pairs.
    pub async fn mount_search(&self, query: &str, items: &[(&str, &str)]) {
        let search: Vec<_> = items
            .iter()
            .enumerate()
            .map(|(i, (title, media_type))| {
                json!({
                    "Title": title,
                    "Year": "2010",
                    "imdbID": format!("tt{:07}", i + 1),
                    "Type": media_type,
                    "Poster": "N/A",
                })
            })
            .collect();

        Mock::given(method("GET"))
            .and(query_param("s", query))
            .and(query_param("type", "series"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Search": search,
                "totalResults": items.len().to_string(),
                "Response": "True"
            })))
            .mount(&self.omdb)
            .await;
    }
}
