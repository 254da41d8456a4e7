//! Streaming response body
//!
//! Bytes written to a [`MediaResponse`](super::exchange::MediaResponse) travel
//! through a bounded channel into a [`ResponseBody`] that hyper polls. The body
//! also reports the response lifecycle: reaching end-of-stream emits
//! `Finish`, being dropped (sent or abandoned by the client) emits `Close`.

use hyper::body::{Body, Bytes, Frame};
use std::io;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use tokio::sync::mpsc;

/// Response lifecycle signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    /// Underlying connection or body was dropped
    Close,
    /// The response was ended by its writer
    End,
    /// All body bytes were handed to the transport
    Finish,
}

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Listener registry for lifecycle events
#[derive(Default)]
pub struct Lifecycle {
    listeners: Mutex<Vec<(LifecycleEvent, Listener)>>,
}

impl Lifecycle {
    pub fn on(&self, event: LifecycleEvent, listener: Listener) {
        if let Ok(mut listeners) = self.listeners.lock() {
            listeners.push((event, listener));
        }
    }

    /// Run every listener registered for `event`
    pub fn emit(&self, event: LifecycleEvent) {
        // Snapshot so listeners may register further listeners
        let matching: Vec<Listener> = match self.listeners.lock() {
            Ok(listeners) => listeners
                .iter()
                .filter(|(e, _)| *e == event)
                .map(|(_, l)| Arc::clone(l))
                .collect(),
            Err(_) => return,
        };
        for listener in matching {
            listener();
        }
    }
}

impl std::fmt::Debug for Lifecycle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.listeners.lock().map_or(0, |l| l.len());
        f.debug_struct("Lifecycle").field("listeners", &count).finish()
    }
}

/// hyper body fed by a response writer
#[derive(Debug)]
pub struct ResponseBody {
    rx: mpsc::Receiver<Bytes>,
    lifecycle: Arc<Lifecycle>,
    finished: bool,
}

impl ResponseBody {
    pub(crate) const fn new(rx: mpsc::Receiver<Bytes>, lifecycle: Arc<Lifecycle>) -> Self {
        Self {
            rx,
            lifecycle,
            finished: false,
        }
    }

    /// Body with a fixed payload and no writer
    pub fn full(data: impl Into<Bytes>) -> Self {
        let data = data.into();
        let (tx, rx) = mpsc::channel(1);
        if !data.is_empty() {
            let _ = tx.try_send(data);
        }
        Self::new(rx, Arc::new(Lifecycle::default()))
    }

    pub fn empty() -> Self {
        Self::full(Bytes::new())
    }
}

impl Body for ResponseBody {
    type Data = Bytes;
    type Error = io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }
        match this.rx.poll_recv(cx) {
            Poll::Ready(Some(chunk)) => Poll::Ready(Some(Ok(Frame::data(chunk)))),
            Poll::Ready(None) => {
                this.finished = true;
                this.lifecycle.emit(LifecycleEvent::Finish);
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }

    fn is_end_stream(&self) -> bool {
        self.finished
    }
}

impl Drop for ResponseBody {
    fn drop(&mut self) {
        self.lifecycle.emit(LifecycleEvent::Close);
    }
}
