use crate::error::TmdbError;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use std::future::Future;
use tracing::debug;

pub const DEFAULT_API_BASE_URL: &str = "https://api.themoviedb.org/3";
pub const DEFAULT_IMAGE_BASE_URL: &str = "https://www.themoviedb.org/t/p";

const USER_AGENT: &str = concat!("poster-lookup/", env!("CARGO_PKG_VERSION"));

// TMDb sends `null` for some fields it also omits.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub results: Vec<Movie>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Movie {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub overview: Option<String>,
    #[serde(default)]
    pub poster_path: Option<String>,
}

impl Movie {
    pub fn release_year(&self) -> Option<&str> {
        let date = self.release_date.as_deref().filter(|d| !d.is_empty())?;
        let end = date.char_indices().nth(4).map(|(i, _)| i).unwrap_or(date.len());
        Some(&date[..end])
    }

    pub fn display_title(&self) -> String {
        match self.release_year() {
            Some(year) => format!("{} ({})", self.title, year),
            None => self.title.clone(),
        }
    }

    pub fn poster(&self) -> Option<&str> {
        self.poster_path.as_deref().filter(|p| !p.is_empty())
    }
}

/// `<image-base>/<size-token><poster_path>`
pub fn image_url(image_base: &str, size: &str, poster_path: &str) -> String {
    format!("{}/{}{}", image_base.trim_end_matches('/'), size, poster_path)
}

pub trait MovieSearch {
    fn search_movie(&self, query: &str) -> impl Future<Output = Result<SearchPage, TmdbError>> + Send;
}

#[derive(Clone)]
pub struct TmdbClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl TmdbClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, TmdbError> {
        let client = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self::with_client(client, api_key, base_url))
    }

    pub fn with_client(client: Client, api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            client,
            api_key: api_key.into(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn handle_response(&self, response: reqwest::Response) -> Result<SearchPage, TmdbError> {
        let status = response.status();
        if !status.is_success() {
            let status_text = status
                .canonical_reason()
                .map(str::to_owned)
                .unwrap_or_else(|| status.as_str().to_owned());
            return Err(TmdbError::Api {
                status_code: status.as_u16(),
                status_text,
            });
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

impl MovieSearch for TmdbClient {
    async fn search_movie(&self, query: &str) -> Result<SearchPage, TmdbError> {
        let url = self.url("/search/movie");
        debug!("GET {} query={:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        self.handle_response(response).await
    }
}

#[cfg(test)]
pub(crate) mod test_server {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::oneshot;

    /// Answers a single request with a canned response. Returns the base URL
    /// and a receiver for the request line the server saw.
    pub async fn serve_once(status_line: &'static str, body: &'static str) -> (String, oneshot::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 1024];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut chunk).await.unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let request = String::from_utf8_lossy(&buf);
            let request_line = request.lines().next().unwrap_or_default().to_string();

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            let _ = socket.shutdown().await;
            let _ = tx.send(request_line);
        });

        (format!("http://{}/3", addr), rx)
    }

    pub fn local_client() -> reqwest::Client {
        reqwest::Client::builder().no_proxy().build().unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_server::{local_client, serve_once};
    use super::*;

    #[test]
    fn test_parse_search_page() {
        let body = r#"{
            "page": 1,
            "results": [
                {"id": 438631, "title": "Dune", "release_date": "2021-09-15",
                 "overview": "Paul Atreides...", "poster_path": "/d5NXSklXo0qyIYkgV94XAgMIckC.jpg"},
                {"id": 841, "title": "Dune", "release_date": "1984-12-14", "poster_path": null}
            ],
            "total_pages": 1,
            "total_results": 2
        }"#;
        let page: SearchPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].poster(), Some("/d5NXSklXo0qyIYkgV94XAgMIckC.jpg"));
        assert_eq!(page.results[1].poster(), None);
        assert_eq!(page.results[1].overview, None);
    }

    #[test]
    fn test_missing_results_is_empty() {
        let page: SearchPage = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_null_results_is_empty() {
        let page: SearchPage = serde_json::from_str(r#"{"page": 1, "results": null}"#).unwrap();
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_null_title_is_empty() {
        let body = r#"{"results": [{"title": null, "poster_path": "/x.jpg"}]}"#;
        let page: SearchPage = serde_json::from_str(body).unwrap();
        assert_eq!(page.results[0].title, "");
        assert_eq!(page.results[0].poster(), Some("/x.jpg"));
    }

    #[test]
    fn test_display_title() {
        let mut movie = Movie {
            title: "Dune".to_string(),
            release_date: Some("2021-10-01".to_string()),
            ..Default::default()
        };
        assert_eq!(movie.display_title(), "Dune (2021)");

        movie.release_date = Some(String::new());
        assert_eq!(movie.display_title(), "Dune");

        movie.release_date = None;
        assert_eq!(movie.display_title(), "Dune");

        movie.release_date = Some("19".to_string());
        assert_eq!(movie.display_title(), "Dune (19)");
    }

    #[test]
    fn test_empty_poster_path_is_absent() {
        let movie = Movie {
            title: "Blank".to_string(),
            poster_path: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(movie.poster(), None);
    }

    #[test]
    fn test_image_url() {
        assert_eq!(
            image_url("https://image.example/t/p", "w500", "/abc.jpg"),
            "https://image.example/t/p/w500/abc.jpg"
        );
        assert_eq!(
            image_url("https://image.example/t/p/", "original", "/abc.jpg"),
            "https://image.example/t/p/original/abc.jpg"
        );
    }

    #[test]
    fn test_client_url() {
        let client = TmdbClient::with_client(Client::new(), "key", "https://api.example/3/");
        assert_eq!(client.url("/search/movie"), "https://api.example/3/search/movie");
    }

    #[tokio::test]
    async fn test_search_sends_key_and_encoded_query() {
        let body = r#"{"results": [{"title": "Fast & Furious", "release_date": "2009-04-02", "poster_path": "/ff.jpg"}]}"#;
        let (base, request_line) = serve_once("200 OK", body).await;
        let client = TmdbClient::with_client(local_client(), "secret", base);

        let page = client.search_movie("Fast & Furious").await.unwrap();
        assert_eq!(page.results.len(), 1);
        assert_eq!(page.results[0].display_title(), "Fast & Furious (2009)");

        let request_line = request_line.await.unwrap();
        assert_eq!(
            request_line,
            "GET /3/search/movie?api_key=secret&query=Fast+%26+Furious HTTP/1.1"
        );
    }

    #[tokio::test]
    async fn test_non_success_status_keeps_reason() {
        let (base, _) = serve_once("401 Unauthorized", r#"{"status_code": 7}"#).await;
        let client = TmdbClient::with_client(local_client(), "bad", base);

        match client.search_movie("Dune").await {
            Err(TmdbError::Api { status_code, status_text }) => {
                assert_eq!(status_code, 401);
                assert_eq!(status_text, "Unauthorized");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_status_falls_back_to_code() {
        let (base, _) = serve_once("499 Client Closed Request", "").await;
        let client = TmdbClient::with_client(local_client(), "key", base);

        match client.search_movie("Dune").await {
            Err(TmdbError::Api { status_code, status_text }) => {
                assert_eq!(status_code, 499);
                assert_eq!(status_text, "499");
            }
            other => panic!("expected API error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body_is_json_error() {
        let (base, _) = serve_once("200 OK", "<html>oops</html>").await;
        let client = TmdbClient::with_client(local_client(), "key", base);

        assert!(matches!(
            client.search_movie("Dune").await,
            Err(TmdbError::Json(_))
        ));
    }
}
