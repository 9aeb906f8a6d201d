//! ScriptedTransport: an in-memory `Transport` that plays back scripted results.
//!
//! - `connect` pops from the connect script; once it is empty every connect succeeds.
//! - `receive` pops from the receive script, sleeping through any scripted pauses; once it is
//!   empty it signals `drained` and never resolves, so the service sits idle until shut down.
//! - `send` records every attempt and pops from the send script (default `Ok`).

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use eventbot::{Action, BotError, Event, ServiceState, Session, Transport};
use tokio::sync::{watch, Notify};

pub const BOT_ID: &str = "bot-1";
pub const BOT_USERNAME: &str = "eventbot";

/// Shared view of what the service did with the transport.
#[derive(Debug, Default)]
pub struct Recorder {
    sent: Mutex<Vec<Action>>,
    delivered: Mutex<Vec<Action>>,
    connect_calls: AtomicUsize,
    close_calls: AtomicUsize,
    drained: Notify,
    state: Mutex<Option<watch::Receiver<ServiceState>>>,
    state_at_close: Mutex<Option<ServiceState>>,
}

impl Recorder {
    /// Every action passed to `send`, including ones that failed.
    pub fn sent(&self) -> Vec<Action> {
        self.sent.lock().unwrap().clone()
    }

    /// Actions whose send ran to completion and succeeded.
    pub fn delivered(&self) -> Vec<Action> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn connect_calls(&self) -> usize {
        self.connect_calls.load(Ordering::SeqCst)
    }

    pub fn close_calls(&self) -> usize {
        self.close_calls.load(Ordering::SeqCst)
    }

    /// Lets `close` capture the service state it was called in.
    pub fn watch_state(&self, rx: watch::Receiver<ServiceState>) {
        *self.state.lock().unwrap() = Some(rx);
    }

    /// Service state observed when `close` ran; needs [`watch_state`](Self::watch_state).
    pub fn state_at_close(&self) -> Option<ServiceState> {
        *self.state_at_close.lock().unwrap()
    }

    /// Waits until the receive script has been consumed.
    pub async fn wait_drained(&self) {
        tokio::time::timeout(Duration::from_secs(5), self.drained.notified())
            .await
            .expect("receive script was not drained in time");
    }

    /// Polls `condition` until it holds, failing after five seconds.
    pub async fn wait_until(&self, condition: impl Fn(&Recorder) -> bool) {
        tokio::time::timeout(Duration::from_secs(5), async {
            while !condition(self) {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("condition not reached in time");
    }
}

enum Step {
    Result(Result<Event, BotError>),
    Pause(Duration),
}

pub struct ScriptedTransport {
    connects: VecDeque<Result<Session, BotError>>,
    receives: Mutex<VecDeque<Step>>,
    sends: Mutex<VecDeque<Result<(), BotError>>>,
    send_delay: Option<Duration>,
    recorder: Arc<Recorder>,
}

impl ScriptedTransport {
    pub fn new() -> Self {
        Self {
            connects: VecDeque::new(),
            receives: Mutex::new(VecDeque::new()),
            sends: Mutex::new(VecDeque::new()),
            send_delay: None,
            recorder: Arc::new(Recorder::default()),
        }
    }

    pub fn recorder(&self) -> Arc<Recorder> {
        self.recorder.clone()
    }

    pub fn connect_result(mut self, result: Result<Session, BotError>) -> Self {
        self.connects.push_back(result);
        self
    }

    pub fn event(self, event: Event) -> Self {
        self.receives.lock().unwrap().push_back(Step::Result(Ok(event)));
        self
    }

    pub fn receive_error(self, error: BotError) -> Self {
        self.receives.lock().unwrap().push_back(Step::Result(Err(error)));
        self
    }

    /// The next `receive` sleeps this long before moving on to the following step.
    pub fn pause(self, duration: Duration) -> Self {
        self.receives.lock().unwrap().push_back(Step::Pause(duration));
        self
    }

    pub fn send_result(self, result: Result<(), BotError>) -> Self {
        self.sends.lock().unwrap().push_back(result);
        self
    }

    /// Every send sleeps this long before completing.
    pub fn send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }
}

pub fn session() -> Session {
    Session::new(BOT_ID, Some(BOT_USERNAME.to_string()))
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn connect(&mut self) -> Result<Session, BotError> {
        self.recorder.connect_calls.fetch_add(1, Ordering::SeqCst);
        self.connects.pop_front().unwrap_or_else(|| Ok(session()))
    }

    async fn receive(&mut self) -> Result<Event, BotError> {
        loop {
            let next = self.receives.lock().unwrap().pop_front();
            match next {
                Some(Step::Result(result)) => return result,
                Some(Step::Pause(duration)) => tokio::time::sleep(duration).await,
                None => {
                    self.recorder.drained.notify_one();
                    return std::future::pending().await;
                }
            }
        }
    }

    async fn send(&self, action: &Action) -> Result<(), BotError> {
        self.recorder.sent.lock().unwrap().push(action.clone());
        if let Some(delay) = self.send_delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.sends.lock().unwrap().pop_front();
        let result = next.unwrap_or(Ok(()));
        if result.is_ok() {
            self.recorder.delivered.lock().unwrap().push(action.clone());
        }
        result
    }

    async fn close(&mut self) {
        self.recorder.close_calls.fetch_add(1, Ordering::SeqCst);
        let observed = self.recorder.state.lock().unwrap().as_ref().map(|rx| *rx.borrow());
        if observed.is_some() {
            *self.recorder.state_at_close.lock().unwrap() = observed;
        }
    }
}
