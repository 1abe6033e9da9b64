//! In-process stand-in for the progress service, used by the http tests.

use std::{
    io::Read,
    sync::{Arc, Mutex, mpsc::Sender},
    thread::JoinHandle,
    time::{Duration, Instant},
};

use rouille::{Request, Response};

use crate::http::urls::Endpoints;

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub url: String,
    pub body: String,
    pub cookie: Option<String>,
}

impl RecordedRequest {
    pub fn json_body(&self) -> serde_json::Value {
        serde_json::from_str(&self.body).unwrap()
    }
}

pub struct FakeService {
    pub base_url: String,
    pub endpoints: Endpoints,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
    stop: Option<(JoinHandle<()>, Sender<()>)>,
}

impl FakeService {
    pub fn start<F>(respond: F) -> Self
    where
        F: Fn(&RecordedRequest) -> Response + Send + Sync + 'static,
    {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let recorded = Arc::clone(&requests);

        let server = rouille::Server::new("127.0.0.1:0", move |request: &Request| {
            let mut body = String::new();
            if let Some(mut data) = request.data() {
                data.read_to_string(&mut body).unwrap();
            }
            let request = RecordedRequest {
                method: request.method().to_string(),
                url: request.raw_url().to_string(),
                body,
                cookie: request.header("Cookie").map(str::to_string),
            };
            let response = respond(&request);
            recorded.lock().unwrap().push(request);
            response
        })
        .unwrap();

        let base_url = format!("http://{}", server.server_addr());
        Self {
            endpoints: Endpoints::new(&base_url),
            base_url,
            requests,
            stop: Some(server.stoppable()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// waits until the service has seen `count` requests
    pub fn wait_for(&self, count: usize) -> Vec<RecordedRequest> {
        let deadline = Instant::now() + Duration::from_secs(5);
        while Instant::now() < deadline {
            let requests = self.requests();
            if requests.len() >= count {
                return requests;
            }
            std::thread::sleep(Duration::from_millis(10));
        }
        self.requests()
    }
}

impl Drop for FakeService {
    fn drop(&mut self) {
        if let Some((handle, stop)) = self.stop.take() {
            let _ = stop.send(());
            let _ = handle.join();
        }
    }
}

pub fn ok_progress(position: f64, duration: f64) -> Response {
    Response::json(&serde_json::json!({
        "position": position,
        "duration": duration,
        "played": false,
    }))
}

pub fn unauthorized() -> Response {
    Response::text("Not authenticated").with_status_code(401)
}
