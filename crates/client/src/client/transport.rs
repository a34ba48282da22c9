//! Authenticated HTTP plumbing and NDJSON decoding.

use tracing::debug;

use super::CriblSearchClient;
use crate::error::{ClientError, Result};
use crate::interpret::interpret_error_body;
use crate::models::{Event, QueryHeader, ResultPage};

impl CriblSearchClient {
    /// Issue an authenticated GET and return the raw response body.
    pub(crate) async fn get_raw(&self, path: &str, query: &[(&str, String)]) -> Result<Vec<u8>> {
        let token = self.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "GET");
        let response = self
            .http
            .get(&url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;
        read_response(response).await
    }

    /// Issue an authenticated POST with a preassembled body.
    pub(crate) async fn post_raw(
        &self,
        path: &str,
        content_type: &str,
        body: &str,
    ) -> Result<Vec<u8>> {
        let token = self.bearer_token().await?;
        let url = format!("{}{}", self.base_url, path);
        debug!(%url, "POST");
        let response = self
            .http
            .post(&url)
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(body.to_string())
            .send()
            .await?;
        read_response(response).await
    }
}

/// Collect a response body, turning non-2xx statuses into an [`ClientError::Api`]
/// with the most specific message the body yields.
async fn read_response(response: reqwest::Response) -> Result<Vec<u8>> {
    let status = response.status();
    let url = response.url().to_string();
    let body = response.bytes().await?;
    if status.is_success() {
        return Ok(body.to_vec());
    }

    let message = interpret_error_body(&body)
        .unwrap_or_else(|| String::from_utf8_lossy(&body).into_owned());
    Err(ClientError::Api {
        status: status.as_u16(),
        url,
        message,
    })
}

/// Decode an NDJSON query response: the first non-blank line is the header,
/// every later non-blank line is one result event.
pub(crate) fn parse_ndjson(body: &[u8]) -> Result<ResultPage> {
    let text = String::from_utf8_lossy(body);
    let mut header: Option<QueryHeader> = None;
    let mut events = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        if header.is_none() {
            header = Some(serde_json::from_str(line).map_err(|_| parse_error(idx, line))?);
        } else {
            let event: Event = serde_json::from_str(line).map_err(|_| parse_error(idx, line))?;
            events.push(event);
        }
    }

    let header = header
        .ok_or_else(|| ClientError::InvalidResponse("empty query response".to_string()))?;
    Ok(ResultPage { header, events })
}

fn parse_error(idx: usize, line: &str) -> ClientError {
    const SNIPPET_MAX: usize = 120;
    let snippet: String = line.chars().take(SNIPPET_MAX).collect();
    ClientError::Parse {
        line: idx + 1,
        snippet,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ndjson_header_and_events() {
        let body = concat!(
            r#"{"job":{"id":"job-1","status":"completed"},"isFinished":true,"totalEventCount":2}"#,
            "\n",
            r#"{"_time":1728744793,"host":"a"}"#,
            "\n",
            r#"{"_time":1728744794,"host":"b"}"#,
            "\n",
        );
        let page = parse_ndjson(body.as_bytes()).unwrap();
        assert_eq!(page.header.job.unwrap().id, "job-1");
        assert!(page.header.is_finished);
        assert_eq!(page.events.len(), 2);
        assert_eq!(page.events[1]["host"], "b");
    }

    #[test]
    fn test_parse_ndjson_skips_blank_lines() {
        let body = "\n{\"isFinished\":true,\"totalEventCount\":0}\n\n\n";
        let page = parse_ndjson(body.as_bytes()).unwrap();
        assert!(page.events.is_empty());
    }

    #[test]
    fn test_parse_ndjson_reports_line_of_malformed_json() {
        let body = "{\"isFinished\":true}\n{\"ok\":1}\n{broken\n";
        let err = parse_ndjson(body.as_bytes()).unwrap_err();
        match err {
            ClientError::Parse { line, snippet } => {
                assert_eq!(line, 3);
                assert_eq!(snippet, "{broken");
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_ndjson_rejects_empty_body() {
        assert!(matches!(
            parse_ndjson(b"").unwrap_err(),
            ClientError::InvalidResponse(_)
        ));
        assert!(matches!(
            parse_ndjson(b"\n  \n").unwrap_err(),
            ClientError::InvalidResponse(_)
        ));
    }
}
