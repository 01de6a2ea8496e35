//! Thread-affinity dispatch.
//!
//! Native webview objects are only safe to touch from the thread that owns
//! the UI event loop. Every public operation funnels through a
//! [`Dispatcher`]: calls made on the UI thread run immediately, calls made
//! anywhere else are marshaled onto the UI thread and the caller blocks on
//! the reply. The [`Pump`] side lives on the UI thread and services the
//! queue from inside the native event loop.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc;
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, ThreadId};

use glaze_common::DispatchError;
use tracing::trace;

type Job = Box<dyn FnOnce() + Send>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct Shared {
    ui_thread: ThreadId,
    queue: Mutex<VecDeque<Job>>,
    waker: Box<dyn Fn() + Send + Sync>,
    closed: AtomicBool,
}

/// Cheaply clonable handle used to marshal calls onto the UI thread.
#[derive(Clone)]
pub struct Dispatcher {
    shared: Arc<Shared>,
}

/// The UI-thread side of a dispatcher. Not clonable; dropping it closes
/// the dispatcher and wakes every blocked caller with
/// [`DispatchError::Closed`].
pub struct Pump {
    shared: Arc<Shared>,
}

/// Result handle for a marshaled call.
///
/// Calls issued on the UI thread resolve immediately; calls from other
/// threads resolve when the UI thread services the job. [`Reply::wait`]
/// blocks until then.
pub enum Reply<R> {
    Ready(R),
    Pending(mpsc::Receiver<R>),
}

impl<R> Reply<R> {
    /// Block until the UI thread has produced the result.
    pub fn wait(self) -> Result<R, DispatchError> {
        match self {
            Reply::Ready(value) => Ok(value),
            Reply::Pending(rx) => rx.recv().map_err(|_| DispatchError::Closed),
        }
    }
}

impl Dispatcher {
    /// Create a dispatcher bound to the calling thread's event loop.
    ///
    /// `waker` is invoked (from any thread) whenever a job is queued; it
    /// must cause the UI event loop to call [`Pump::drain`] soon.
    pub fn new(waker: impl Fn() + Send + Sync + 'static) -> (Dispatcher, Pump) {
        let shared = Arc::new(Shared {
            ui_thread: thread::current().id(),
            queue: Mutex::new(VecDeque::new()),
            waker: Box::new(waker),
            closed: AtomicBool::new(false),
        });
        (
            Dispatcher {
                shared: Arc::clone(&shared),
            },
            Pump { shared },
        )
    }

    /// Whether the calling thread is the UI thread.
    pub fn is_ui_thread(&self) -> bool {
        thread::current().id() == self.shared.ui_thread
    }

    /// Whether the UI event loop has shut down.
    pub fn is_closed(&self) -> bool {
        self.shared.closed.load(Ordering::Acquire)
    }

    /// Marshal `f` onto the UI thread.
    ///
    /// On the UI thread the callable runs before this returns and the
    /// reply is already resolved; re-entrant dispatch therefore always
    /// terminates. After shutdown this fails fast instead of blocking.
    pub fn dispatch<R, F>(&self, f: F) -> Result<Reply<R>, DispatchError>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        if self.is_closed() {
            return Err(DispatchError::Closed);
        }

        if self.is_ui_thread() {
            return Ok(Reply::Ready(f()));
        }

        let (tx, rx) = mpsc::sync_channel(1);
        let job: Job = Box::new(move || {
            let _ = tx.send(f());
        });

        {
            let mut queue = lock(&self.shared.queue);
            // Re-check under the queue lock: close() flips the flag while
            // holding it, so a job pushed here is guaranteed to be seen by
            // the closing drain.
            if self.shared.closed.load(Ordering::Acquire) {
                return Err(DispatchError::Closed);
            }
            queue.push_back(job);
        }

        (self.shared.waker)();
        Ok(Reply::Pending(rx))
    }

    /// Dispatch and wait: the synchronous-call view every public webview
    /// operation is built on.
    pub fn invoke<R, F>(&self, f: F) -> Result<R, DispatchError>
    where
        R: Send + 'static,
        F: FnOnce() -> R + Send + 'static,
    {
        self.dispatch(f)?.wait()
    }
}

impl Pump {
    /// Run every queued job in arrival order. UI thread only.
    pub fn drain(&self) {
        debug_assert_eq!(thread::current().id(), self.shared.ui_thread);
        loop {
            let job = lock(&self.shared.queue).pop_front();
            match job {
                Some(job) => job(),
                None => break,
            }
        }
    }

    /// Close the dispatcher: new dispatches are rejected and queued jobs
    /// are dropped, which wakes their callers with `Closed`.
    pub fn close(&self) {
        let dropped = {
            let mut queue = lock(&self.shared.queue);
            self.shared.closed.store(true, Ordering::Release);
            std::mem::take(&mut *queue)
        };
        if !dropped.is_empty() {
            trace!(count = dropped.len(), "dropping queued jobs on close");
        }
    }
}

impl Drop for Pump {
    fn drop(&mut self) {
        self.close();
    }
}
