//! Cross-thread message queue
//!
//! Any thread may post a message; only the owning (render/UI) thread
//! drains it. The mutex guards nothing but the queue itself: each
//! push/pop holds the lock for the duration of the queue operation only,
//! so dispatching a popped message can safely re-enter `post`. A handler
//! scheduling a follow-up message while another thread is posting must
//! never deadlock.

use std::collections::VecDeque;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::message::Message;

/// FIFO queue of owned message copies, guarded by a mutex.
///
/// Handles are cheap to clone ([`MessageQueue::handle`]) so worker
/// threads and window behaviors can post without access to the manager.
pub struct MessageQueue {
    inner: Mutex<VecDeque<Message>>,
}

impl MessageQueue {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(VecDeque::new()),
        })
    }

    /// Append an owned copy of the message to the tail of the queue.
    ///
    /// Blocks only for the mutex acquisition; never on application logic.
    pub fn post(&self, message: Message) {
        self.inner.lock().push_back(message);
    }

    /// Pop the front entry, releasing the lock before the caller
    /// dispatches it
    pub fn pop(&self) -> Option<Message> {
        self.inner.lock().pop_front()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    /// Drop all queued messages
    pub fn clear(&self) {
        self.inner.lock().clear();
    }
}

/// Cloneable posting handle shared with worker threads
pub type QueueHandle = Arc<MessageQueue>;
