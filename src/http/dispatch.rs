use std::{cell::RefCell, sync::mpsc::Sender, thread, thread::JoinHandle};

use log::debug;

use crate::{
    domain::{progress::ProgressUpdate, track::FileId},
    http::client::ProgressClient,
    player::{
        api::{LoadTicket, ProgressApi},
        events::PlayerEvent,
        scheduler::DeliveryMode,
    },
};

/// Runs progress requests on worker threads so the event loop never blocks.
///
/// Completions are posted back to the event loop through `events`; best-effort
/// writes are not reported. Every write still in flight is joined when the api
/// is dropped, so a session that shuts down right after a save does not lose it.
pub struct BackgroundProgressApi {
    client: ProgressClient,
    events: Sender<PlayerEvent>,
    writes: RefCell<Vec<JoinHandle<()>>>,
}

impl BackgroundProgressApi {
    pub fn new(client: ProgressClient, events: Sender<PlayerEvent>) -> Self {
        Self {
            client,
            events,
            writes: RefCell::new(Vec::new()),
        }
    }

    fn spawn_write<F>(&self, write: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let handle = thread::spawn(write);

        let mut writes = self.writes.borrow_mut();
        writes.retain(|write| !write.is_finished());
        writes.push(handle);
    }
}

impl ProgressApi for BackgroundProgressApi {
    fn fetch_progress(&self, ticket: LoadTicket) {
        let client = self.client.clone();
        let events = self.events.clone();
        thread::spawn(move || {
            let outcome = client.get_progress(&ticket.file);
            // the event loop may be gone already
            let _ = events.send(PlayerEvent::ProgressFetched { ticket, outcome });
        });
    }

    fn save_progress(&self, update: ProgressUpdate, mode: DeliveryMode) {
        match mode {
            DeliveryMode::Awaited => {
                let client = self.client.clone();
                let events = self.events.clone();
                self.spawn_write(move || {
                    let outcome = client.post_progress(&update);
                    let _ = events.send(PlayerEvent::SaveCompleted {
                        file: FileId::new(update.file),
                        outcome,
                    });
                });
            }
            DeliveryMode::BestEffort => {
                let client = self.client.clone();
                self.spawn_write(move || {
                    if let Err(e) = client.post_progress(&update) {
                        debug!("Beacon for {} failed: {e}", update.file);
                    }
                });
            }
        }
    }
}

impl Drop for BackgroundProgressApi {
    fn drop(&mut self) {
        for write in self.writes.get_mut().drain(..) {
            let _ = write.join();
        }
    }
}
