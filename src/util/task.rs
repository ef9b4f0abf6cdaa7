// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! One-shot background jobs polled from the UI thread.
//!
//! A slot holds the receiving end of at most one job. Starting a new job
//! or cancelling drops the previous receiver, so a late result from a
//! superseded job is discarded instead of being applied to state that has
//! moved on.

use std::sync::mpsc::{channel, Receiver, TryRecvError};

pub struct TaskSlot<T> {
    receiver: Option<Receiver<T>>,
}

impl<T> Default for TaskSlot<T> {
    fn default() -> Self {
        Self { receiver: None }
    }
}

impl<T: Send + 'static> TaskSlot<T> {
    /// Run `job` on a background thread, replacing any pending job.
    pub fn spawn<F>(&mut self, job: F)
    where
        F: FnOnce() -> T + Send + 'static,
    {
        let (sender, receiver) = channel();
        self.receiver = Some(receiver);
        std::thread::spawn(move || {
            // The slot may have been cancelled meanwhile.
            let _ = sender.send(job());
        });
    }

    /// Take the result if the job has finished.
    pub fn poll(&mut self) -> Option<T> {
        let receiver = self.receiver.as_ref()?;
        match receiver.try_recv() {
            Ok(value) => {
                self.receiver = None;
                Some(value)
            }
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => {
                self.receiver = None;
                None
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.receiver.is_some()
    }

    /// Forget the pending job; its result will be dropped.
    pub fn cancel(&mut self) {
        self.receiver = None;
    }
}
