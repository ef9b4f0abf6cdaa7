// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Frame naming, scroll-to-frame math and the per-frame slot store.

/// An image sequence on disk or behind a URL prefix.
///
/// Frame `i` (0-based) lives at `<template><i+1 padded to 3 digits>.jpg`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSequence {
    path_template: String,
    count: usize,
}

impl FrameSequence {
    pub fn new(path_template: impl Into<String>, count: usize) -> Self {
        Self {
            path_template: path_template.into(),
            count,
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn path_template(&self) -> &str {
        &self.path_template
    }

    pub fn is_remote(&self) -> bool {
        self.path_template.starts_with("http://") || self.path_template.starts_with("https://")
    }

    /// Asset path of the 0-based frame `index`.
    pub fn frame_path(&self, index: usize) -> String {
        format!("{}{:03}.jpg", self.path_template, index + 1)
    }
}

/// `clamp(floor(progress * (count - 1)), 0, count - 1)`.
pub fn frame_index(progress: f32, count: usize) -> usize {
    if count == 0 {
        return 0;
    }
    let last = count - 1;
    let raw = (progress * last as f32).floor();
    if raw.is_nan() || raw <= 0.0 {
        0
    } else {
        (raw as usize).min(last)
    }
}

/// Normalized position of a scroll offset within a scroll region whose
/// progress runs from "region top at viewport top" to "region bottom at
/// viewport bottom".
pub fn scroll_progress(offset: f32, content_height: f32, viewport_height: f32) -> f32 {
    let range = content_height - viewport_height;
    if range <= 0.0 {
        return 0.0;
    }
    (offset / range).clamp(0.0, 1.0)
}

/// Loaded frame handles plus the last frame that was actually drawn.
///
/// Asking for a frame that has not arrived yet yields the last drawn one,
/// so the canvas keeps its previous contents instead of going blank.
#[derive(Debug)]
pub struct FrameSlots<T> {
    slots: Vec<Option<T>>,
    last_drawn: Option<usize>,
    loaded: usize,
}

impl<T> FrameSlots<T> {
    pub fn new(count: usize) -> Self {
        Self {
            slots: std::iter::repeat_with(|| None).take(count).collect(),
            last_drawn: None,
            loaded: 0,
        }
    }

    pub fn loaded_count(&self) -> usize {
        self.loaded
    }

    pub fn is_loaded(&self, index: usize) -> bool {
        matches!(self.slots.get(index), Some(Some(_)))
    }

    /// Store a loaded frame. Out-of-range indices are ignored.
    pub fn insert(&mut self, index: usize, handle: T) {
        if let Some(slot) = self.slots.get_mut(index) {
            if slot.is_none() {
                self.loaded += 1;
            }
            *slot = Some(handle);
        }
    }

    /// The frame to draw for `index`: that frame if loaded, otherwise the
    /// one drawn last time, otherwise nothing.
    pub fn resolve(&mut self, index: usize) -> Option<(usize, &T)> {
        if self.is_loaded(index) {
            self.last_drawn = Some(index);
        }
        let drawn = self.last_drawn?;
        self.slots[drawn].as_ref().map(|handle| (drawn, handle))
    }

    /// Release every handle.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.last_drawn = None;
        self.loaded = 0;
    }
}
