// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Background frame loading.
//!
//! A small pool of worker threads decodes sequence frames. At most
//! `max_in_flight` frames are being loaded at any moment, and each worker
//! always picks the pending frame closest to the current focus (the frame
//! under the scroll position). Dropping the loader cancels it: pending
//! frames are discarded and workers exit after their current frame.

use super::frames::FrameSequence;
use crate::io::media::{self, LoadedImage, MediaError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};

/// Produces the pixels of one frame.
pub trait FrameSource: Send + Sync + 'static {
    fn load(&self, index: usize) -> Result<LoadedImage, MediaError>;
}

/// Loads frames from the filesystem, or over HTTP when the sequence path
/// template is a URL.
pub struct PathFrameSource {
    sequence: FrameSequence,
    client: Option<reqwest::blocking::Client>,
}

impl PathFrameSource {
    pub fn new(sequence: FrameSequence) -> Self {
        let client = sequence.is_remote().then(reqwest::blocking::Client::new);
        Self { sequence, client }
    }
}

impl FrameSource for PathFrameSource {
    fn load(&self, index: usize) -> Result<LoadedImage, MediaError> {
        let path = self.sequence.frame_path(index);
        match &self.client {
            Some(client) => media::fetch_image(client, &path),
            None => media::load_image(std::path::Path::new(&path)),
        }
    }
}

/// Outcome of one frame load.
#[derive(Debug)]
pub enum FrameEvent {
    Loaded { index: usize, image: LoadedImage },
    Failed { index: usize, error: String },
}

struct Queue {
    pending: Vec<usize>,
    focus: usize,
}

impl Queue {
    /// Remove and return the pending frame nearest the focus, preferring
    /// the earlier frame on ties.
    fn next(&mut self) -> Option<usize> {
        let focus = self.focus;
        let (pos, _) = self
            .pending
            .iter()
            .enumerate()
            .min_by_key(|&(_, &index)| (index.abs_diff(focus), index))?;
        Some(self.pending.swap_remove(pos))
    }
}

struct Shared {
    queue: Mutex<Queue>,
    cancelled: AtomicBool,
}

impl Shared {
    fn next(&self) -> Option<usize> {
        if self.cancelled.load(Ordering::Acquire) {
            return None;
        }
        self.queue.lock().ok()?.next()
    }
}

/// Handle to a running pool. Dropping it cancels outstanding work.
pub struct FrameLoader {
    shared: Arc<Shared>,
    events: Receiver<FrameEvent>,
}

impl FrameLoader {
    /// Start loading frames `0..count` with at most `max_in_flight`
    /// concurrent loads, nearest to `focus` first.
    pub fn start(source: Arc<dyn FrameSource>, count: usize, max_in_flight: usize, focus: usize) -> Self {
        let shared = Arc::new(Shared {
            queue: Mutex::new(Queue {
                pending: (0..count).collect(),
                focus,
            }),
            cancelled: AtomicBool::new(false),
        });
        let (sender, events) = channel();

        let workers = max_in_flight.max(1).min(count);
        log::info!("Loading {} frames with {} workers", count, workers);

        for _ in 0..workers {
            let shared = Arc::clone(&shared);
            let source = Arc::clone(&source);
            let sender = sender.clone();
            std::thread::spawn(move || worker(shared, source, sender));
        }

        Self { shared, events }
    }

    /// Reprioritize the remaining frames around `index`.
    pub fn set_focus(&self, index: usize) {
        if let Ok(mut queue) = self.shared.queue.lock() {
            queue.focus = index;
        }
    }

    /// Drain the events that have arrived so far without blocking.
    pub fn poll(&self) -> Vec<FrameEvent> {
        self.events.try_iter().collect()
    }

    /// Stop issuing new loads. Loads already running finish and are dropped.
    pub fn cancel(&self) {
        self.shared.cancelled.store(true, Ordering::Release);
        if let Ok(mut queue) = self.shared.queue.lock() {
            queue.pending.clear();
        }
    }
}

impl Drop for FrameLoader {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn worker(shared: Arc<Shared>, source: Arc<dyn FrameSource>, sender: Sender<FrameEvent>) {
    while let Some(index) = shared.next() {
        let event = match source.load(index) {
            Ok(image) => FrameEvent::Loaded { index, image },
            Err(e) => {
                log::warn!("Skipping frame {}: {}", index + 1, e);
                FrameEvent::Failed {
                    index,
                    error: e.to_string(),
                }
            }
        };

        if shared.cancelled.load(Ordering::Acquire) || sender.send(event).is_err() {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::time::{Duration, Instant};

    struct FakeSource {
        in_flight: AtomicUsize,
        max_seen: AtomicUsize,
        calls: AtomicUsize,
        delay: Duration,
        fail: Option<usize>,
    }

    impl FakeSource {
        fn new(delay_ms: u64, fail: Option<usize>) -> Arc<Self> {
            Arc::new(Self {
                in_flight: AtomicUsize::new(0),
                max_seen: AtomicUsize::new(0),
                calls: AtomicUsize::new(0),
                delay: Duration::from_millis(delay_ms),
                fail,
            })
        }
    }

    impl FrameSource for FakeSource {
        fn load(&self, index: usize) -> Result<LoadedImage, MediaError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_seen.fetch_max(now, Ordering::SeqCst);
            std::thread::sleep(self.delay);
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if self.fail == Some(index) {
                return Err(MediaError::Empty(format!("frame {index}")));
            }
            Ok(LoadedImage {
                width: 2,
                height: 1,
                pixels: vec![index as u8; 8],
            })
        }
    }

    fn collect(loader: &FrameLoader, expected: usize) -> Vec<FrameEvent> {
        let deadline = Instant::now() + Duration::from_secs(10);
        let mut events = Vec::new();
        while events.len() < expected && Instant::now() < deadline {
            events.extend(loader.poll());
            std::thread::sleep(Duration::from_millis(2));
        }
        events
    }

    fn index_of(event: &FrameEvent) -> usize {
        match event {
            FrameEvent::Loaded { index, .. } | FrameEvent::Failed { index, .. } => *index,
        }
    }

    #[test]
    fn test_in_flight_loads_are_bounded() {
        let source = FakeSource::new(5, None);
        let loader = FrameLoader::start(source.clone(), 24, 3, 0);
        let events = collect(&loader, 24);

        assert_eq!(events.len(), 24);
        assert!(source.max_seen.load(Ordering::SeqCst) <= 3);
        let mut indices: Vec<usize> = events.iter().map(index_of).collect();
        indices.sort_unstable();
        assert_eq!(indices, (0..24).collect::<Vec<_>>());
    }

    #[test]
    fn test_frames_near_focus_load_first() {
        let source = FakeSource::new(0, None);
        let loader = FrameLoader::start(source, 21, 1, 10);
        let events = collect(&loader, 21);
        let order: Vec<usize> = events.iter().map(index_of).collect();
        assert_eq!(&order[..5], &[10, 9, 11, 8, 12]);
    }

    #[test]
    fn test_failed_frame_is_reported_not_fatal() {
        let source = FakeSource::new(0, Some(2));
        let loader = FrameLoader::start(source, 5, 2, 0);
        let events = collect(&loader, 5);
        assert_eq!(events.len(), 5);
        let failed: Vec<usize> = events
            .iter()
            .filter(|e| matches!(e, FrameEvent::Failed { .. }))
            .map(index_of)
            .collect();
        assert_eq!(failed, vec![2]);
    }

    #[test]
    fn test_drop_cancels_remaining_loads() {
        let source = FakeSource::new(20, None);
        let loader = FrameLoader::start(source.clone(), 200, 2, 0);
        std::thread::sleep(Duration::from_millis(30));
        drop(loader);
        std::thread::sleep(Duration::from_millis(100));
        let calls = source.calls.load(Ordering::SeqCst);
        assert!(calls < 200, "calls = {calls}");
        std::thread::sleep(Duration::from_millis(100));
        assert_eq!(source.calls.load(Ordering::SeqCst), calls);
    }

    #[test]
    fn test_zero_frames_spawns_nothing() {
        let source = FakeSource::new(0, None);
        let loader = FrameLoader::start(source.clone(), 0, 6, 0);
        assert!(loader.shared.queue.lock().unwrap().pending.is_empty());
        assert!(loader.poll().is_empty());
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }
}
