// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Plain data types shared by the vault, the backends and the UI.

pub mod identity;
pub mod profile;
pub mod resource;
