// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 forja contributors

//! Utility modules
//!
//! Terminal helpers for the forja CLI.

pub mod spinner;

pub use spinner::*;
