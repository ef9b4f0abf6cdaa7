// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Pages of the Baithak application.
//!
//! Each page is a `show` function (or a small state struct with one) that
//! draws into the given `Ui` and returns what the user asked for.

pub mod auth;
pub mod dashboard;
pub mod fallback;
pub mod landing;
pub mod profile;
pub mod settings;
pub mod sidebar;
pub mod vault;
