use serde::{Deserialize, Serialize};

/// One news item as returned by `GET /api/news`. The backend passes the
/// aggregator's article objects through verbatim, so the optional fields
/// really do arrive as JSON `null` for some sources.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct Article {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub author: Option<String>,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "urlToImage")]
    pub url_to_image: Option<String>,
    #[serde(rename = "publishedAt", default)]
    pub published_at: String,
}

/// Summary returned by `GET /status`: when the server last pulled from its
/// upstream source and how many articles it is holding.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FetchStatus {
    pub last_fetch_time: Option<String>,
    pub articles_count: u64,
}

/// Acknowledgment body of `GET /fetch_news` and `POST /api/preferences`.
/// Anything other than `status == "success"` is an application-level failure
/// even when the HTTP status is 200.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct FetchAck {
    pub status: String,
    #[serde(default)]
    pub message: Option<String>,
}

impl FetchAck {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// POST body for `/api/preferences`. The server accepts a list of topics;
/// the client always sends a single-element list around the selected topic.
#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct PreferencePayload {
    pub topics: Vec<String>,
    #[serde(rename = "customSearch")]
    pub custom_search: String,
}

impl PreferencePayload {
    pub fn new(topic: &str, custom_search: &str) -> Self {
        Self {
            topics: vec![topic.to_string()],
            custom_search: custom_search.to_string(),
        }
    }
}

/// Display state of the feed panel. `Ready` with an empty list renders the
/// "no results" placeholder rather than an empty list widget.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedState {
    #[default]
    Idle,
    Loading,
    Ready(Vec<Article>),
    Failed {
        message: String,
    },
}
