use crate::config::CatalogConfig;
use crate::error::app_error::AppError;
use crate::models::game::GameSearchResult;
use serde::Deserialize;
use tracing::warn;

/// Raw shape of a catalog search response. Only the fields we project are
/// deserialized; everything else the catalog sends is dropped.
#[derive(Deserialize, Debug)]
struct CatalogSearchResponse {
    results: Vec<CatalogGame>,
}

#[derive(Deserialize, Debug)]
struct CatalogGame {
    id: i64,
    name: String,
    released: Option<String>,
    background_image: Option<String>,
}

impl From<CatalogGame> for GameSearchResult {
    fn from(game: CatalogGame) -> Self {
        Self {
            id: game.id,
            name: game.name,
            released: game.released,
            background_image: game.background_image,
        }
    }
}

/// Client for the external game catalog. The API key is held server-side
/// and never reaches clients; responses are projected down before leaving
/// this module.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl CatalogClient {
    pub fn new(config: &CatalogConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        }
    }

    /// Use a custom HTTP client (for connection pool reuse or testing).
    #[must_use]
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http = client;
        self
    }

    /// Free-text search against the catalog. No retries: an upstream
    /// failure is reported generically to the caller and logged here.
    pub async fn search(&self, term: &str) -> Result<Vec<GameSearchResult>, AppError> {
        let url = format!("{}/games", self.base_url);

        let response = self
            .http
            .get(&url)
            .query(&[("key", self.api_key.as_str()), ("search", term)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            warn!(status = %status, "game catalog returned an error");
            return Err(AppError::upstream(format!("Game catalog returned status {}", status.as_u16()), None));
        }

        let body = response.json::<CatalogSearchResponse>().await?;
        Ok(body.results.into_iter().map(GameSearchResult::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_projects_fields() {
        // Trimmed-down catalog payload: extra fields must be ignored,
        // missing optional fields tolerated.
        let payload = serde_json::json!({
            "count": 2,
            "next": null,
            "results": [
                {
                    "id": 3498,
                    "slug": "grand-theft-auto-v",
                    "name": "Grand Theft Auto V",
                    "released": "2013-09-17",
                    "background_image": "https://example.com/gta.jpg",
                    "rating": 4.47,
                    "platforms": []
                },
                {
                    "id": 41,
                    "name": "Unreleased Game",
                    "released": null,
                    "background_image": null
                }
            ]
        });

        let parsed: CatalogSearchResponse = serde_json::from_value(payload).unwrap();
        let projected: Vec<GameSearchResult> = parsed.results.into_iter().map(GameSearchResult::from).collect();

        assert_eq!(
            projected[0],
            GameSearchResult {
                id: 3498,
                name: "Grand Theft Auto V".to_string(),
                released: Some("2013-09-17".to_string()),
                background_image: Some("https://example.com/gta.jpg".to_string()),
            }
        );
        assert_eq!(projected[1].id, 41);
        assert!(projected[1].released.is_none());
    }

    #[test]
    fn projection_never_exposes_api_key() {
        let result = GameSearchResult {
            id: 1,
            name: "Game".to_string(),
            released: None,
            background_image: None,
        };
        let json = serde_json::to_string(&result).unwrap();
        assert!(!json.contains("key"));
    }

    #[test]
    fn base_url_trailing_slash_is_normalized() {
        let config = CatalogConfig {
            base_url: "https://api.rawg.io/api/".to_string(),
            api_key: "k".to_string(),
        };
        let client = CatalogClient::new(&config);
        assert_eq!(client.base_url, "https://api.rawg.io/api");
    }
}
