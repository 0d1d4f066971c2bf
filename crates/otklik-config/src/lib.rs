// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loading for the Otklik reply pipeline.
//!
//! TOML files merged over compiled defaults, with `OTKLIK_` environment
//! variable overrides. See [`loader`] for the merge order.

pub mod accounts;
pub mod loader;
pub mod model;

pub use accounts::{parse_account_specs, AccountSpec};
pub use loader::{load_config, load_config_from_str};
pub use model::OtklikConfig;
