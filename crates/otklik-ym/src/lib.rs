// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Yandex Market goods-feedback API adapter.

pub mod client;

pub use client::YandexMarketClient;
