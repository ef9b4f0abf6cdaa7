// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Scroll-synchronized frame renderer.
//!
//! Maps a scroll progress signal to one of N pre-rendered still frames,
//! smoothing the signal with a spring. Overlay scenes are sampled by the
//! caller from the raw progress. Texture upload is left to the caller so the
//! state machine stays independent of the GPU.

pub mod frames;
pub mod loader;
pub mod scenes;
pub mod spring;

use crate::io::media::LoadedImage;
use crate::util::geometry::{contain_fit, Placement};
use frames::{frame_index, FrameSequence, FrameSlots};
use loader::{FrameEvent, FrameLoader, FrameSource};
use spring::Spring;
use std::sync::Arc;

/// Renderer state for one mounted landing page.
pub struct FrameRenderer<T> {
    sequence: FrameSequence,
    slots: FrameSlots<T>,
    sizes: Vec<Option<(u32, u32)>>,
    loader: Option<FrameLoader>,
    spring: Spring,
    max_in_flight: usize,
    failed: usize,
    layout: Option<LayoutCache>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct LayoutCache {
    canvas: (f32, f32),
    image: (u32, u32),
    placement: Placement,
}

impl<T> FrameRenderer<T> {
    pub fn new(sequence: FrameSequence, max_in_flight: usize) -> Self {
        let count = sequence.count();
        Self {
            sequence,
            slots: FrameSlots::new(count),
            sizes: vec![None; count],
            loader: None,
            spring: Spring::scrub(0.0),
            max_in_flight,
            failed: 0,
            layout: None,
        }
    }

    pub fn sequence(&self) -> &FrameSequence {
        &self.sequence
    }

    /// Start loading every frame, nearest the current frame first.
    pub fn mount(&mut self, source: Arc<dyn FrameSource>) {
        if self.loader.is_some() {
            return;
        }
        let focus = self.current_index();
        self.loader = Some(FrameLoader::start(
            source,
            self.sequence.count(),
            self.max_in_flight,
            focus,
        ));
    }

    /// Cancel outstanding loads and release all frames.
    pub fn unmount(&mut self) {
        if let Some(loader) = self.loader.take() {
            loader.cancel();
            log::info!("Frame sequence unmounted, {} frames released", self.slots.loaded_count());
        }
        self.slots.clear();
        self.sizes.iter_mut().for_each(|s| *s = None);
        self.layout = None;
        self.failed = 0;
    }

    pub fn is_mounted(&self) -> bool {
        self.loader.is_some()
    }

    /// Move the spring toward `progress` and advance it by `dt` seconds.
    pub fn advance(&mut self, progress: f32, dt: f32) {
        self.spring.set_target(progress.clamp(0.0, 1.0));
        self.spring.step(dt);
        if let Some(loader) = &self.loader {
            loader.set_focus(self.current_index());
        }
    }

    pub fn is_animating(&self) -> bool {
        !self.spring.is_settled()
    }

    pub fn current_index(&self) -> usize {
        frame_index(self.spring.value(), self.sequence.count())
    }

    /// Hand finished frames to `upload` and keep the resulting handles.
    /// Returns how many frames arrived.
    pub fn ingest<F>(&mut self, mut upload: F) -> usize
    where
        F: FnMut(usize, LoadedImage) -> T,
    {
        let Some(loader) = &self.loader else {
            return 0;
        };
        let mut arrived = 0;
        for event in loader.poll() {
            match event {
                FrameEvent::Loaded { index, image } => {
                    if let Some(size) = self.sizes.get_mut(index) {
                        *size = Some((image.width, image.height));
                    }
                    let handle = upload(index, image);
                    self.slots.insert(index, handle);
                    arrived += 1;
                }
                FrameEvent::Failed { index, error } => {
                    log::debug!("Frame {} will not be drawn: {}", index + 1, error);
                    self.failed += 1;
                }
            }
        }
        if arrived > 0 && self.slots.loaded_count() == self.sequence.count() {
            log::info!("All {} frames loaded", self.sequence.count());
        }
        arrived
    }

    pub fn loaded_count(&self) -> usize {
        self.slots.loaded_count()
    }

    pub fn failed_count(&self) -> usize {
        self.failed
    }

    /// Nothing can be drawn yet.
    pub fn is_waiting_for_first_frame(&self) -> bool {
        self.slots.loaded_count() == 0
    }

    /// Frame to draw for the current progress on a canvas of the given
    /// size, and where it goes. Keeps the last drawn frame while the
    /// current one is still loading.
    pub fn draw(&mut self, canvas_w: f32, canvas_h: f32) -> Option<(&T, Placement)> {
        let index = self.current_index();
        let (drawn, _) = self.slots.resolve(index)?;
        let image = self.sizes.get(drawn).copied().flatten()?;
        let placement = self.placement((canvas_w, canvas_h), image)?;
        self.slots.resolve(drawn).map(|(_, handle)| (handle, placement))
    }

    /// Contain-fit placement, recomputed only when the canvas or image
    /// size changes.
    fn placement(&mut self, canvas: (f32, f32), image: (u32, u32)) -> Option<Placement> {
        if let Some(cache) = self.layout {
            if cache.canvas == canvas && cache.image == image {
                return Some(cache.placement);
            }
        }
        let placement = contain_fit(canvas.0, canvas.1, image.0 as f32, image.1 as f32)?;
        self.layout = Some(LayoutCache {
            canvas,
            image,
            placement,
        });
        Some(placement)
    }
}
