//! Headless playback session driving the synchronizer from the terminal.

use std::{
    io::Write,
    sync::mpsc::{self, Receiver, RecvTimeoutError, Sender},
    time::{Duration, Instant},
};

use anyhow::{Context, bail};
use log::warn;

use crate::{
    config::Config,
    domain::track::TrackRef,
    http::{BackgroundProgressApi, ProgressClient, urls::Endpoints},
    player::{
        AuthGuard, Navigator, PlayerEvent, PlayerView, RateControl, SimulatedMedia, Synchronizer,
        SystemClock,
    },
    storage::LocalStorage,
};

/// how often simulated playback reports its position
const TICK: Duration = Duration::from_millis(250);
/// how long to wait for the final save once playback has ended
const FINISH_TIMEOUT: Duration = Duration::from_secs(5);

/// There is no browser to send to the login page, so the user is told where to go.
struct ConsoleNavigator;

impl Navigator for ConsoleNavigator {
    fn navigate(&mut self, url: &str) {
        println!();
        println!("Not logged in. Log in at {url} and put the session cookie into server.session_cookie");
    }
}

#[derive(Default)]
struct StatusLine {
    last: String,
}

impl StatusLine {
    fn show(&mut self, view: &PlayerView) {
        if view.status == self.last {
            return;
        }
        self.last = view.status.clone();
        print!("\r{:<48}", view.status);
        let _ = std::io::stdout().flush();
    }
}

pub fn play(cfg: &Config, track: TrackRef, duration: f64) -> anyhow::Result<()> {
    if !(duration.is_finite() && duration > 0.0) {
        bail!("duration must be a positive number of seconds, got {duration}");
    }

    let (tx, rx) = mpsc::channel();
    let unload = tx.clone();
    ctrlc::set_handler(move || {
        let _ = unload.send(PlayerEvent::Unload);
    })
    .context("Failed to install Ctrl-C handler")?;

    run_session(cfg, track, duration, tx, rx)
}

/// Plays `track` until it ends, the user is sent to log in or an `Unload` arrives.
///
/// Returns once every progress write issued by the session has been delivered.
fn run_session(
    cfg: &Config,
    track: TrackRef,
    duration: f64,
    tx: Sender<PlayerEvent>,
    rx: Receiver<PlayerEvent>,
) -> anyhow::Result<()> {
    let endpoints = Endpoints::new(&cfg.server.base_url);
    let client = ProgressClient::new(
        endpoints.clone(),
        cfg.server.session_cookie.as_deref(),
        cfg.server.timeout(),
    )?;
    let storage = LocalStorage::new(&cfg.storage)?;

    let mut sync = Synchronizer::new(
        SimulatedMedia::new(),
        Box::new(BackgroundProgressApi::new(client, tx)),
        Box::new(SystemClock),
        AuthGuard::new(Box::new(ConsoleNavigator), &endpoints, &cfg.server.page),
        RateControl::init(Box::new(storage), cfg.playback.rate_options.clone()),
        endpoints,
        cfg.sync.interval(),
    );

    println!("Now playing: {} at {}x", track.name, sync.playback_rate());
    sync.handle(PlayerEvent::TrackSelected(track));
    sync.media_mut().load_metadata(duration);
    sync.handle(PlayerEvent::MetadataLoaded);
    sync.media_mut().play();

    let mut status = StatusLine::default();
    let mut last_tick = Instant::now();
    let mut finishing: Option<Instant> = None;

    loop {
        status.show(sync.view());

        match rx.recv_timeout(TICK) {
            Ok(PlayerEvent::Unload) => {
                sync.handle(PlayerEvent::Unload);
                break;
            }
            Ok(event) => {
                let saved = matches!(event, PlayerEvent::SaveCompleted { .. });
                sync.handle(event);
                // the end-of-track write may still be in flight, dropping `sync` waits for it
                if saved && finishing.is_some() {
                    break;
                }
            }
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }

        if sync.is_redirected() {
            break;
        }

        if let Some(since) = finishing {
            if since.elapsed() > FINISH_TIMEOUT {
                warn!("Gave up waiting for the final progress save");
                break;
            }
            continue;
        }

        let now = Instant::now();
        let ended = sync.media_mut().advance(now - last_tick);
        last_tick = now;

        sync.handle(PlayerEvent::TimeUpdate);
        if ended {
            sync.handle(PlayerEvent::Ended);
            finishing = Some(Instant::now());
        }
    }

    status.show(sync.view());
    println!();
    drop(sync);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    use rouille::Response;

    use super::*;
    use crate::http::fake::{FakeService, RecordedRequest, ok_progress};

    fn config_for(service: &FakeService) -> Config {
        Config::parse(&format!(
            r#"
version = 1

[server]
base_url = "{}"

[storage]
kind = "in_memory"

[sync]
interval_ms = 1
"#,
            service.base_url
        ))
        .unwrap()
    }

    fn is_post_at(request: &RecordedRequest, position: f64) -> bool {
        request.method == "POST" && request.json_body()["position"] == serde_json::json!(position)
    }

    fn saved() -> Response {
        Response::json(&serde_json::json!({"status": "ok"}))
    }

    #[test]
    fn test_track_end_waits_for_every_final_save() {
        // the first write of the final position is answered at once, later ones are slow
        let final_writes = Arc::new(AtomicUsize::new(0));
        let arrived = Arc::clone(&final_writes);
        let service = FakeService::start(move |request| {
            if request.method == "GET" {
                return ok_progress(0.0, 0.0);
            }
            if is_post_at(request, 0.6) && arrived.fetch_add(1, Ordering::SeqCst) > 0 {
                std::thread::sleep(Duration::from_millis(500));
            }
            saved()
        });
        let cfg = config_for(&service);
        let (tx, rx) = mpsc::channel();

        run_session(&cfg, TrackRef::from_file("a.mp3"), 0.6, tx, rx).unwrap();

        let finals = service
            .requests()
            .into_iter()
            .filter(|request| is_post_at(request, 0.6))
            .collect::<Vec<_>>();
        assert!(!finals.is_empty());
        assert_eq!(finals.len(), final_writes.load(Ordering::SeqCst));
        assert_eq!(
            finals[0].json_body(),
            serde_json::json!({"file": "a.mp3", "position": 0.6, "duration": 0.6})
        );
    }

    #[test]
    fn test_unload_delivers_beacon_before_returning() {
        let service = FakeService::start(|request| {
            if request.method == "GET" {
                return ok_progress(0.0, 0.0);
            }
            std::thread::sleep(Duration::from_millis(200));
            saved()
        });
        let cfg = config_for(&service);
        let (tx, rx) = mpsc::channel();
        tx.send(PlayerEvent::Unload).unwrap();

        run_session(&cfg, TrackRef::from_file("a.mp3"), 60.0, tx, rx).unwrap();

        let posts = service
            .requests()
            .into_iter()
            .filter(|request| request.method == "POST")
            .collect::<Vec<_>>();
        assert_eq!(posts.len(), 1);
        assert_eq!(
            posts[0].json_body(),
            serde_json::json!({"file": "a.mp3", "position": 0.0, "duration": 60.0})
        );
    }
}
