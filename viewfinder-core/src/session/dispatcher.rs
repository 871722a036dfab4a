//! Serialized execution context and background worker.
//!
//! ```text
//! [host threads] ──post──┐
//! [orientation]  ──post──┼─→ mpsc queue ─→ "camera-main" thread ─→ &mut C
//! [hw callbacks] ──post──┤
//! ["camera-open"] ─post──┘
//! ```

use std::sync::mpsc;
use std::thread::{self, JoinHandle, ThreadId};
use std::time::Duration;

use crate::models::error::CameraError;

type Task<C> = Box<dyn FnOnce(&mut C) + Send + 'static>;
type Job = Box<dyn FnOnce() + Send + 'static>;

enum Message<C> {
    Run(Task<C>),
    Shutdown,
}

/// Cloneable handle for enqueueing work on a `MainContext`.
pub(crate) struct Poster<C> {
    sender: mpsc::Sender<Message<C>>,
}

impl<C> Clone for Poster<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<C: 'static> Poster<C> {
    /// Enqueue `task`. Returns `false` once the context has shut down.
    pub(crate) fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.sender.send(Message::Run(Box::new(task))).is_ok()
    }
}

/// A dedicated thread owning a value of type `C` and running posted tasks
/// against it one at a time, in FIFO order.
pub(crate) struct MainContext<C> {
    poster: Poster<C>,
    thread_id: ThreadId,
    handle: Option<JoinHandle<()>>,
}

impl<C: 'static> MainContext<C> {
    /// Spawn the context thread. `init` builds the owned value on that thread.
    pub(crate) fn spawn<F>(name: &str, init: F) -> Result<Self, CameraError>
    where
        F: FnOnce(Poster<C>) -> C + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel::<Message<C>>();
        let poster = Poster { sender };
        let inner_poster = poster.clone();

        let handle = thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                let mut value = init(inner_poster);
                while let Ok(message) = receiver.recv() {
                    match message {
                        Message::Run(task) => task(&mut value),
                        Message::Shutdown => break,
                    }
                }
                log::debug!("main context exiting");
            })
            .map_err(|e| CameraError::Unknown(format!("failed to spawn main context: {}", e)))?;

        Ok(Self {
            poster,
            thread_id: handle.thread().id(),
            handle: Some(handle),
        })
    }

    #[cfg(test)]
    pub(crate) fn poster(&self) -> &Poster<C> {
        &self.poster
    }

    pub(crate) fn post<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.poster.post(task)
    }

    pub(crate) fn is_current(&self) -> bool {
        thread::current().id() == self.thread_id
    }

    /// Block until every task posted before this call has run.
    ///
    /// Returns `false` on timeout, after shutdown, or when called from the
    /// context thread itself (which would deadlock).
    pub(crate) fn sync(&self, timeout: Duration) -> bool {
        if self.is_current() {
            return false;
        }
        let (tx, rx) = mpsc::sync_channel(1);
        if !self.post(move |_| {
            let _ = tx.send(());
        }) {
            return false;
        }
        rx.recv_timeout(timeout).is_ok()
    }

    /// Run `last` on the context, then stop it.
    ///
    /// Joins the thread unless called from it.
    pub(crate) fn shutdown_with<F>(&mut self, last: F)
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        self.post(last);
        let _ = self.poster.sender.send(Message::Shutdown);
        if self.is_current() {
            return;
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// A single background thread running blocking jobs in submission order.
///
/// Dropping the worker does not wait for an in-flight job.
pub(crate) struct Worker {
    sender: mpsc::Sender<Job>,
}

impl Worker {
    pub(crate) fn spawn(name: &str) -> Result<Self, CameraError> {
        let (sender, receiver) = mpsc::channel::<Job>();
        thread::Builder::new()
            .name(name.into())
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
            })
            .map_err(|e| CameraError::Unknown(format!("failed to spawn {} worker: {}", name, e)))?;
        Ok(Self { sender })
    }

    pub(crate) fn submit<F>(&self, job: F) -> Result<(), CameraError>
    where
        F: FnOnce() + Send + 'static,
    {
        self.sender
            .send(Box::new(job))
            .map_err(|_| CameraError::Unknown("worker has stopped".into()))
    }
}
