use std::time::Duration;

use reqwest::{
    blocking::{Client, Response},
    header::{COOKIE, HeaderMap, HeaderValue},
};

use crate::{
    domain::{
        progress::{ProgressRecord, ProgressUpdate},
        track::FileId,
    },
    http::{error::ApiError, urls::Endpoints},
};

/// Blocking client for the progress service endpoints
#[derive(Clone)]
pub struct ProgressClient {
    client: Client,
    pub endpoints: Endpoints,
}

impl ProgressClient {
    pub fn new(
        endpoints: Endpoints,
        session_cookie: Option<&str>,
        timeout: Duration,
    ) -> Result<Self, ApiError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = session_cookie {
            headers.insert(COOKIE, HeaderValue::from_str(cookie)?);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self { client, endpoints })
    }

    /// `GET /api/progress?file=...`
    pub fn get_progress(&self, file: &FileId) -> Result<ProgressRecord, ApiError> {
        let response = self
            .client
            .get(self.endpoints.progress_query_url(file))
            .send()?;
        let body = check_status(response)?.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// `POST /api/progress`, the response body is not inspected
    pub fn post_progress(&self, update: &ProgressUpdate) -> Result<(), ApiError> {
        let response = self
            .client
            .post(self.endpoints.progress_url())
            .json(update)
            .send()?;
        check_status(response)?;
        Ok(())
    }
}

fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        log::debug!("{} -> {}", response.url(), status);
        Err(ApiError::from_status(status.as_u16()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::fake::{FakeService, ok_progress, unauthorized};
    use rouille::Response;

    fn client_for(service: &FakeService, cookie: Option<&str>) -> ProgressClient {
        ProgressClient::new(service.endpoints.clone(), cookie, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_get_progress_success() -> anyhow::Result<()> {
        let service = FakeService::start(|_| ok_progress(75.0, 120.0));

        let record = client_for(&service, None).get_progress(&FileId::new("dir/a.mp3"))?;

        assert_eq!(record.position, 75.0);
        assert_eq!(record.duration, 120.0);

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "GET");
        assert_eq!(requests[0].url, "/api/progress?file=dir%2Fa.mp3");
        Ok(())
    }

    #[test]
    fn test_get_progress_unauthenticated() {
        let service = FakeService::start(|_| unauthorized());

        let result = client_for(&service, None).get_progress(&FileId::new("a.mp3"));

        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn test_get_progress_not_found_is_status_error() {
        let service = FakeService::start(|_| Response::text("Audio file not found").with_status_code(404));

        let result = client_for(&service, None).get_progress(&FileId::new("a.mp3"));

        assert!(matches!(result, Err(ApiError::Status(404))));
    }

    #[test]
    fn test_get_progress_malformed_body() {
        let service = FakeService::start(|_| Response::text("not json"));

        let result = client_for(&service, None).get_progress(&FileId::new("a.mp3"));

        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn test_post_progress_sends_json_body() -> anyhow::Result<()> {
        let service = FakeService::start(|_| Response::json(&serde_json::json!({"status": "ok"})));

        let update = ProgressUpdate::capture(&FileId::new("a.mp3"), 75.0, 120.0);
        client_for(&service, None).post_progress(&update)?;

        let requests = service.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].method, "POST");
        assert_eq!(requests[0].url, "/api/progress");
        assert_eq!(
            requests[0].json_body(),
            serde_json::json!({"file": "a.mp3", "position": 75.0, "duration": 120.0})
        );
        Ok(())
    }

    #[test]
    fn test_post_progress_unauthenticated() {
        let service = FakeService::start(|_| unauthorized());

        let update = ProgressUpdate::capture(&FileId::new("a.mp3"), 1.0, 2.0);
        let result = client_for(&service, None).post_progress(&update);

        assert!(matches!(result, Err(ApiError::Unauthenticated)));
    }

    #[test]
    fn test_session_cookie_is_sent() -> anyhow::Result<()> {
        let service = FakeService::start(|_| ok_progress(0.0, 0.0));

        client_for(&service, Some("player_session=abc")).get_progress(&FileId::new("a.mp3"))?;

        assert_eq!(
            service.requests()[0].cookie.as_deref(),
            Some("player_session=abc")
        );
        Ok(())
    }

    #[test]
    fn test_unreachable_service_is_transport_error() {
        let client = ProgressClient::new(
            Endpoints::new("http://127.0.0.1:1"),
            None,
            Duration::from_secs(1),
        )
        .unwrap();

        let result = client.get_progress(&FileId::new("a.mp3"));

        assert!(matches!(result, Err(ApiError::Transport(_))));
    }
}
