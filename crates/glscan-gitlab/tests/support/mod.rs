//! Local mock GitLab for integration tests.
//!
//! A `tiny_http` server on `127.0.0.1:0`. Every request is logged and then
//! answered from its own thread, so per-request delays overlap the way a
//! real server's would.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use glscan_core::{Project, ProjectId};
use glscan_gitlab::{GitLabClient, ProgressEvent, ProgressSink, auth_headers};

pub const TOKEN: &str = "glpat-test-token";

/// A request as the mock saw it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub path: String,
    pub query: Vec<(String, String)>,
    pub token: Option<String>,
}

impl Seen {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn page(&self) -> Option<u32> {
        self.param("page").and_then(|p| p.parse().ok())
    }

    /// Project id segment of `/api/v4/projects/:id/repository/commits`.
    pub fn commits_project(&self) -> Option<String> {
        let rest = self.path.strip_prefix("/api/v4/projects/")?;
        let id = rest.strip_suffix("/repository/commits")?;
        Some(urlencoding::decode(id).ok()?.into_owned())
    }

    pub fn is_fallback_probe(&self) -> bool {
        self.param("all") == Some("true")
    }
}

/// What the mock answers with.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub body: String,
    pub delay: Duration,
}

impl Reply {
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn empty() -> Self {
        Self::json("[]")
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: format!(r#"{{"message":"{status}"}}"#),
            delay: Duration::ZERO,
        }
    }

    pub fn projects(projects: &[Project]) -> Self {
        Self::json(serde_json::to_string(projects).expect("projects serialize"))
    }

    pub fn one_commit() -> Self {
        Self::json(r#"[{"id":"ed899a2f4b50b4370feeea94676502b42383c746","title":"init"}]"#)
    }

    pub fn after(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

type Handler = dyn Fn(&Seen) -> Reply + Send + Sync;

pub struct MockGitLab {
    server: Arc<tiny_http::Server>,
    api_base: String,
    seen: Arc<Mutex<Vec<Seen>>>,
    peak: Arc<AtomicUsize>,
    thread: Option<JoinHandle<()>>,
}

impl MockGitLab {
    pub fn start(handler: impl Fn(&Seen) -> Reply + Send + Sync + 'static) -> Self {
        let server = Arc::new(tiny_http::Server::http("127.0.0.1:0").expect("mock server binds"));
        let addr = server
            .server_addr()
            .to_ip()
            .expect("mock server has an ip address");
        let api_base = format!("http://{addr}/api/v4");

        let handler: Arc<Handler> = Arc::new(handler);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let in_flight = Arc::new(AtomicUsize::new(0));
        let peak = Arc::new(AtomicUsize::new(0));

        let thread = {
            let server = Arc::clone(&server);
            let seen = Arc::clone(&seen);
            let peak = Arc::clone(&peak);
            std::thread::spawn(move || {
                for request in server.incoming_requests() {
                    let request_seen = parse(&request);
                    seen.lock().unwrap().push(request_seen.clone());

                    let handler = Arc::clone(&handler);
                    let in_flight = Arc::clone(&in_flight);
                    let peak = Arc::clone(&peak);
                    std::thread::spawn(move || {
                        let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                        peak.fetch_max(now, Ordering::SeqCst);

                        let reply = handler(&request_seen);
                        if !reply.delay.is_zero() {
                            std::thread::sleep(reply.delay);
                        }

                        // Decrement before answering: the client may fire its
                        // next request as soon as this one completes.
                        in_flight.fetch_sub(1, Ordering::SeqCst);
                        let response = tiny_http::Response::from_string(reply.body)
                            .with_status_code(reply.status)
                            .with_header(
                                tiny_http::Header::from_bytes("Content-Type", "application/json")
                                    .unwrap(),
                            );
                        let _ = request.respond(response);
                    });
                }
            })
        };

        Self {
            server,
            api_base,
            seen,
            peak,
            thread: Some(thread),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Client pointed at the mock, bypassing any proxy from the environment.
    pub fn client(&self) -> GitLabClient {
        let http = reqwest::Client::builder()
            .no_proxy()
            .default_headers(auth_headers(TOKEN).unwrap())
            .build()
            .unwrap();
        GitLabClient::from_http(http, &self.api_base).unwrap()
    }

    pub fn requests(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count(&self, predicate: impl Fn(&Seen) -> bool) -> usize {
        self.requests().iter().filter(|seen| predicate(seen)).count()
    }

    /// Most requests the mock was serving at the same moment.
    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

impl Drop for MockGitLab {
    fn drop(&mut self) {
        self.server.unblock();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn parse(request: &tiny_http::Request) -> Seen {
    let (path, query) = request
        .url()
        .split_once('?')
        .unwrap_or((request.url(), ""));
    let query = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (
                urlencoding::decode(key).unwrap().into_owned(),
                urlencoding::decode(value).unwrap().into_owned(),
            )
        })
        .collect();
    let token = request
        .headers()
        .iter()
        .find(|header| header.field.equiv("PRIVATE-TOKEN"))
        .map(|header| header.value.as_str().to_string());
    Seen {
        path: path.to_string(),
        query,
        token,
    }
}

/// A project as the listing endpoint would return it.
pub fn project(id: u64) -> Project {
    Project {
        id: ProjectId::Numeric(id),
        path_with_namespace: format!("acme/project-{id}"),
        last_activity_at: Some(format!("2024-01-{:02}T12:00:00.000Z", id % 28 + 1)),
        web_url: format!("https://gitlab.example.com/acme/project-{id}"),
    }
}

/// Records every progress event as a short line.
#[derive(Debug, Default)]
pub struct RecordingSink {
    lines: Mutex<Vec<String>>,
}

impl RecordingSink {
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }

    pub fn count_prefix(&self, prefix: &str) -> usize {
        self.lines().iter().filter(|l| l.starts_with(prefix)).count()
    }
}

impl ProgressSink for RecordingSink {
    fn observe(&self, event: &ProgressEvent<'_>) {
        let line = match event {
            ProgressEvent::PageFetched { page, items } => format!("page {page} ({items} items)"),
            ProgressEvent::CeilingReached { max_pages, .. } => format!("ceiling {max_pages}"),
            ProgressEvent::ListingComplete { total } => format!("listed {total}"),
            ProgressEvent::ProbesStarted { total } => format!("probing {total}"),
            ProgressEvent::Matched { project, .. } => {
                format!("matched {}", project.path_with_namespace)
            }
            ProgressEvent::NotMatched { project, .. } => {
                format!("not-matched {}", project.path_with_namespace)
            }
            ProgressEvent::Failed { project, error, .. } => {
                format!("failed {}: {error}", project.path_with_namespace)
            }
        };
        self.lines.lock().unwrap().push(line);
    }
}
