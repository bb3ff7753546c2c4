use tracing::{debug, warn};

use super::client::SlackClient;
use super::error::ApiError;
use super::types::FileListPage;

/// Walks `files.list` page by page, applying the checkpoint as a lower
/// bound. Pages are numbered from 1; the first empty page ends the listing
/// for good.
pub struct FileListing<'a> {
    client: &'a SlackClient,
    ts_from: Option<u64>,
    page: u64,
    done: bool,
}

impl<'a> FileListing<'a> {
    pub fn new(client: &'a SlackClient, ts_from: Option<u64>) -> Self {
        Self {
            client,
            ts_from,
            page: 1,
            done: false,
        }
    }

    /// Fetch the next batch of descriptors, or `None` once the listing is
    /// exhausted. Transport failures propagate to the caller; a page with
    /// `ok: false` is warned about but its files are still handed out.
    pub async fn next_page(&mut self) -> Result<Option<FileListPage>, ApiError> {
        if self.done {
            return Ok(None);
        }

        debug!(page = self.page, ts_from = ?self.ts_from, "Fetching file listing page");
        let page = self.client.list_files(self.page, self.ts_from).await?;

        if !page.ok {
            warn!(
                page = self.page,
                error = page.error.as_deref().unwrap_or("unknown"),
                "File listing reported an error, processing what it returned anyway"
            );
        }

        if page.files.is_empty() {
            debug!(page = self.page, "Empty page, listing complete");
            self.done = true;
            return Ok(None);
        }

        self.page += 1;
        Ok(Some(page))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn page_with_files(ids: &[&str]) -> serde_json::Value {
        serde_json::json!({
            "ok": true,
            "files": ids.iter().map(|id| serde_json::json!({
                "id": id,
                "name": "a.txt",
                "timestamp": 1443295987.0,
                "user": "U1",
                "channels": ["C1"],
                "url_private_download": "https://files.example.com/a.txt"
            })).collect::<Vec<_>>()
        })
    }

    async fn mount_page(server: &MockServer, page: u64, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path("/files.list"))
            .and(body_string_contains(format!("page={page}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn pages_are_fetched_in_order_until_an_empty_one() {
        let server = MockServer::start().await;
        mount_page(&server, 1, page_with_files(&["F1", "F2"])).await;
        mount_page(&server, 2, page_with_files(&["F3"])).await;
        mount_page(&server, 3, page_with_files(&[])).await;

        let client = SlackClient::with_api_base("xoxp-test", &server.uri());
        let mut listing = FileListing::new(&client, None);

        let first = listing.next_page().await.unwrap().unwrap();
        assert_eq!(first.files.len(), 2);
        let second = listing.next_page().await.unwrap().unwrap();
        assert_eq!(second.files[0].id, "F3");
        assert!(listing.next_page().await.unwrap().is_none());
        // Exhausted listings stay exhausted without further requests.
        assert!(listing.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn an_empty_first_page_ends_immediately() {
        let server = MockServer::start().await;
        mount_page(&server, 1, page_with_files(&[])).await;

        let client = SlackClient::with_api_base("xoxp-test", &server.uri());
        let mut listing = FileListing::new(&client, Some(1443295988));
        assert!(listing.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn a_not_ok_page_with_files_is_still_returned() {
        let server = MockServer::start().await;
        let mut body = page_with_files(&["F1"]);
        body["ok"] = serde_json::json!(false);
        body["error"] = serde_json::json!("rate_limited");
        mount_page(&server, 1, body).await;
        mount_page(&server, 2, page_with_files(&[])).await;

        let client = SlackClient::with_api_base("xoxp-test", &server.uri());
        let mut listing = FileListing::new(&client, None);

        let page = listing.next_page().await.unwrap().unwrap();
        assert!(!page.ok);
        assert_eq!(page.files.len(), 1);
        assert!(listing.next_page().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/files.list"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = SlackClient::with_api_base("xoxp-test", &server.uri());
        let mut listing = FileListing::new(&client, None);
        let err = listing.next_page().await.unwrap_err();
        assert!(matches!(err, ApiError::Status { status: 500, .. }), "{err}");
    }

    #[tokio::test]
    async fn the_bound_is_passed_through_on_every_page() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/files.list"))
            .and(body_string_contains("ts_from=1443295988"))
            .respond_with(ResponseTemplate::new(200).set_body_json(page_with_files(&[])))
            .expect(1)
            .mount(&server)
            .await;

        let client = SlackClient::with_api_base("xoxp-test", &server.uri());
        let mut listing = FileListing::new(&client, Some(1443295988));
        assert!(listing.next_page().await.unwrap().is_none());
    }
}
