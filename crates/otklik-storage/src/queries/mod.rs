// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per table.

pub mod accounts;
pub mod examples;
pub mod feedbacks;
pub mod products;
pub mod settings;
