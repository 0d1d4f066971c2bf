// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter traits implemented by the marketplace and generator crates.

pub mod generator;
pub mod marketplace;

pub use generator::ResponseGenerator;
pub use marketplace::MarketplaceAdapter;
