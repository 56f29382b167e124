//! FIFO pairing of reassembled frames with waiting receivers.
//!
//! [`DeliveryQueue`] holds either a backlog of frames nobody has asked for
//! yet or a backlog of receivers waiting for the next frame, never both.
//! Each frame is delivered at most once, oldest receiver first. Ending the
//! queue releases every waiting receiver with the [`EndReason`] and drops
//! the frame backlog.

use std::{
    collections::VecDeque,
    sync::{Mutex, MutexGuard, PoisonError},
};

use tokio::sync::{Notify, oneshot};

use crate::{error::EndReason, frame::Frame};

/// Lifecycle state shared by a connection and its delivery queue.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    /// Frames may still arrive.
    Open,
    /// Terminal state; no further frames are produced.
    Ended(EndReason),
}

impl ConnectionState {
    /// Returns `true` while the connection is open.
    #[must_use]
    pub const fn is_open(&self) -> bool { matches!(self, Self::Open) }
}

/// Where [`DeliveryQueue::deliver`] placed a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Handed to the oldest waiting receiver.
    Received,
    /// Appended to the backlog.
    Queued,
    /// Dropped because the queue has ended.
    Discarded,
}

#[derive(Debug)]
struct Inner {
    state: ConnectionState,
    queued: VecDeque<Frame>,
    pending: VecDeque<oneshot::Sender<Frame>>,
}

/// Frame backlog and pending receivers for one connection.
///
/// The lock is never held across an await, and delivering a frame never runs
/// receiver code inline, so `deliver` cannot re-enter itself through a
/// receiver's continuation.
#[derive(Debug)]
pub struct DeliveryQueue {
    inner: Mutex<Inner>,
    ended: Notify,
}

impl Default for DeliveryQueue {
    fn default() -> Self { Self::new() }
}

impl DeliveryQueue {
    /// Create an open, empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                state: ConnectionState::Open,
                queued: VecDeque::new(),
                pending: VecDeque::new(),
            }),
            ended: Notify::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        // No code path panics while holding the lock; recover the data anyway.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Receive the next frame.
    ///
    /// Returns the oldest queued frame without suspending. Otherwise parks a
    /// receiver and waits for the next delivery or for the queue to end.
    /// Dropping the returned future withdraws the receiver. A frame already
    /// handed to it goes back to the front of the line.
    ///
    /// # Errors
    ///
    /// Returns the [`EndReason`] once the queue has ended.
    pub async fn receive(&self) -> Result<Frame, EndReason> {
        let rx = {
            let mut inner = self.lock();
            if let Some(frame) = inner.queued.pop_front() {
                return Ok(frame);
            }
            if let ConnectionState::Ended(reason) = &inner.state {
                return Err(reason.clone());
            }
            let (tx, rx) = oneshot::channel();
            inner.pending.retain(|waiter| !waiter.is_closed());
            inner.pending.push_back(tx);
            rx
        };
        let mut waiter = Waiter {
            queue: self,
            rx,
            settled: false,
        };
        let outcome = (&mut waiter.rx).await;
        waiter.settled = true;
        match outcome {
            Ok(frame) => Ok(frame),
            // Senders are only dropped by `end`, which records the reason first.
            Err(_) => Err(self.end_reason().unwrap_or(EndReason::Closed)),
        }
    }

    /// Hand `frame` to the oldest waiting receiver or queue it.
    ///
    /// Receivers whose futures were dropped are skipped.
    pub fn deliver(&self, frame: Frame) -> Delivery {
        let mut inner = self.lock();
        if !inner.state.is_open() {
            return Delivery::Discarded;
        }
        let mut frame = frame;
        while let Some(waiter) = inner.pending.pop_front() {
            match waiter.send(frame) {
                Ok(()) => return Delivery::Received,
                Err(returned) => frame = returned,
            }
        }
        inner.queued.push_back(frame);
        Delivery::Queued
    }

    /// Drop withdrawn receivers and put back a frame one of them was handed.
    fn withdraw(&self, orphan: Option<Frame>) {
        let mut inner = self.lock();
        inner.pending.retain(|waiter| !waiter.is_closed());
        let Some(mut frame) = orphan else { return };
        if !inner.state.is_open() {
            return;
        }
        // Receivers still waiting registered after the withdrawn one.
        while let Some(waiter) = inner.pending.pop_front() {
            match waiter.send(frame) {
                Ok(()) => return,
                Err(returned) => frame = returned,
            }
        }
        inner.queued.push_front(frame);
    }

    /// Move to the terminal state.
    ///
    /// Waiting receivers fail with `reason` and queued frames are dropped.
    /// Only the first call has an effect; it returns `true`.
    pub fn end(&self, reason: EndReason) -> bool {
        let (pending, queued) = {
            let mut inner = self.lock();
            if !inner.state.is_open() {
                return false;
            }
            inner.state = ConnectionState::Ended(reason);
            (
                std::mem::take(&mut inner.pending),
                std::mem::take(&mut inner.queued),
            )
        };
        tracing::debug!(
            released = pending.len(),
            discarded = queued.len(),
            "delivery queue ended"
        );
        drop(pending);
        drop(queued);
        self.ended.notify_waiters();
        true
    }

    /// Wait until the queue has ended and return the reason.
    pub async fn ended(&self) -> EndReason {
        loop {
            let notified = self.ended.notified();
            if let Some(reason) = self.end_reason() {
                return reason;
            }
            notified.await;
        }
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> ConnectionState { self.lock().state.clone() }

    /// The end reason, once the queue has ended.
    #[must_use]
    pub fn end_reason(&self) -> Option<EndReason> {
        match &self.lock().state {
            ConnectionState::Open => None,
            ConnectionState::Ended(reason) => Some(reason.clone()),
        }
    }

    /// Number of frames waiting for a receiver.
    #[must_use]
    pub fn queued_len(&self) -> usize { self.lock().queued.len() }

    /// Number of receivers waiting for a frame.
    #[must_use]
    pub fn pending_len(&self) -> usize { self.lock().pending.len() }
}

/// A parked receiver that returns its frame to the queue if abandoned.
struct Waiter<'a> {
    queue: &'a DeliveryQueue,
    rx: oneshot::Receiver<Frame>,
    settled: bool,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        self.rx.close();
        self.queue.withdraw(self.rx.try_recv().ok());
    }
}

#[cfg(test)]
mod tests;
