//! Listener adapter: turns a delivery channel into callback invocations.
//!
//! `spawn_listener` creates a fresh channel, spawns one background task
//! that drains it and calls the listener for every event, and hands back
//! the send side so the caller can subscribe it to any number of topics.
//!
//! The task stops for good as soon as the bus's cancellation token fires.
//! Events still buffered in the channel at that point are never processed.

use std::any::Any;

use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use topicbus_types::config::BusConfig;
use topicbus_types::event::Event;
use tracing::debug;
use uuid::Uuid;

use crate::subscriber::Subscriber;

/// Errors reported when joining a listener task.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The listener callback panicked; the task died with it.
    #[error("listener panicked: {0}")]
    Panicked(String),

    /// The task was aborted through [`ListenerHandle::abort`].
    #[error("listener task was aborted")]
    Aborted,
}

/// Handle on a listener's background task.
///
/// Dropping the handle detaches the task; it keeps running until the
/// cancellation token fires.
#[derive(Debug)]
pub struct ListenerHandle {
    subscriber_id: Uuid,
    task: JoinHandle<()>,
}

impl ListenerHandle {
    /// Id of the subscriber this task drains.
    pub fn subscriber_id(&self) -> Uuid {
        self.subscriber_id
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    pub fn abort(&self) {
        self.task.abort();
    }

    /// Wait for the task to terminate.
    ///
    /// # Errors
    ///
    /// Returns [`ListenerError::Panicked`] if the callback panicked and
    /// [`ListenerError::Aborted`] if the task was aborted.
    pub async fn join(self) -> Result<(), ListenerError> {
        match self.task.await {
            Ok(()) => Ok(()),
            Err(err) if err.is_panic() => Err(ListenerError::Panicked(panic_message(
                err.into_panic(),
            ))),
            Err(_) => Err(ListenerError::Aborted),
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

enum Inbox<T> {
    Bounded(mpsc::Receiver<Event<T>>),
    Unbounded(mpsc::UnboundedReceiver<Event<T>>),
}

impl<T> Inbox<T> {
    async fn recv(&mut self) -> Option<Event<T>> {
        match self {
            Inbox::Bounded(rx) => rx.recv().await,
            Inbox::Unbounded(rx) => rx.recv().await,
        }
    }
}

/// Create a channel sized per `config` and spawn a task draining it into
/// `listener`.
///
/// # Panics
///
/// Panics if called outside a Tokio runtime.
pub(crate) fn spawn_listener<T, F>(
    config: &BusConfig,
    cancellation: CancellationToken,
    listener: F,
) -> (Subscriber<T>, ListenerHandle)
where
    T: Send + 'static,
    F: FnMut(&str, T) + Send + 'static,
{
    let (subscriber, inbox) = if config.unbounded_subscribers {
        let (subscriber, rx) = Subscriber::unbounded();
        (subscriber, Inbox::Unbounded(rx))
    } else {
        let (subscriber, rx) = Subscriber::bounded(config.effective_buffer());
        (subscriber, Inbox::Bounded(rx))
    };

    let subscriber_id = subscriber.id();
    let task = tokio::spawn(run(subscriber_id, inbox, cancellation, listener));

    (
        subscriber,
        ListenerHandle {
            subscriber_id,
            task,
        },
    )
}

async fn run<T, F>(
    subscriber_id: Uuid,
    mut inbox: Inbox<T>,
    cancellation: CancellationToken,
    mut listener: F,
) where
    F: FnMut(&str, T),
{
    debug!(%subscriber_id, "listener started");

    // Unbiased: when an event and cancellation are both ready either branch
    // may win.
    loop {
        tokio::select! {
            received = inbox.recv() => match received {
                Some(event) => {
                    let (topic, data) = event.into_parts();
                    listener(&topic, data);
                }
                None => {
                    debug!(%subscriber_id, "listener channel closed, stopping");
                    return;
                }
            },
            () = cancellation.cancelled() => {
                debug!(%subscriber_id, "listener cancelled, stopping");
                return;
            }
        }
    }
}
