//! Fixed-rate controller polling loop
//!
//! The source is built inside the polling thread, so controller backends
//! that are not `Send` still work.

use super::adapter::{InputAdapter, PadSource};
use super::types::IntentSnapshot;
use crate::constants::INTENT_CHANNEL_CAPACITY;
use crate::settings::InputConfig;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace};

type SourceFactory<S> = Arc<dyn Fn() -> S + Send + Sync>;

pub struct InputPoller<S: PadSource> {
    factory: SourceFactory<S>,
    config: InputConfig,
    running: Option<(CancellationToken, JoinHandle<()>)>,
}

impl<S: PadSource + 'static> InputPoller<S> {
    pub fn new<F>(config: InputConfig, factory: F) -> Self
    where
        F: Fn() -> S + Send + Sync + 'static,
    {
        Self {
            factory: Arc::new(factory),
            config,
            running: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|(_, handle)| !handle.is_finished())
    }

    /// Start polling. Returns the snapshot stream, or `None` if already running.
    pub fn start(&mut self) -> Option<mpsc::Receiver<IntentSnapshot>> {
        if self.is_running() {
            return None;
        }
        self.stop();

        let (tx, rx) = mpsc::channel(INTENT_CHANNEL_CAPACITY);
        let token = CancellationToken::new();
        let factory = self.factory.clone();
        let config = self.config;
        let thread_token = token.clone();

        let spawned = std::thread::Builder::new()
            .name("padlaunch-input".into())
            .spawn(move || poll_loop(factory(), config, tx, thread_token));

        match spawned {
            Ok(handle) => {
                info!(poll_hz = config.poll_hz, "Input polling started");
                self.running = Some((token, handle));
                Some(rx)
            }
            Err(e) => {
                error!(error = %e, "Failed to spawn input thread");
                None
            }
        }
    }

    /// Stop polling and wait for the thread. Safe to call repeatedly.
    pub fn stop(&mut self) {
        if let Some((token, handle)) = self.running.take() {
            token.cancel();
            if handle.join().is_err() {
                error!("Input thread panicked");
            }
            info!("Input polling stopped");
        }
    }
}

impl<S: PadSource> Drop for InputPoller<S> {
    fn drop(&mut self) {
        if let Some((token, handle)) = self.running.take() {
            token.cancel();
            handle.join().ok();
        }
    }
}

fn poll_loop<S: PadSource>(
    source: S,
    config: InputConfig,
    tx: mpsc::Sender<IntentSnapshot>,
    token: CancellationToken,
) {
    let mut adapter = InputAdapter::new(source, config);
    let period = config.poll_interval();
    let mut next = Instant::now();

    while !token.is_cancelled() {
        let snapshot = adapter.poll(Instant::now());
        match tx.try_send(snapshot) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => trace!("Intent channel full, dropping frame"),
            Err(mpsc::error::TrySendError::Closed(_)) => {
                debug!("Intent receiver dropped, ending poll loop");
                break;
            }
        }

        next += period;
        let now = Instant::now();
        if next > now {
            std::thread::sleep(next - now);
        } else {
            // Fell behind; don't try to catch up with a burst of polls
            next = now;
        }
    }
}
