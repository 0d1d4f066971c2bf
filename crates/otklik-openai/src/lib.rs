// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenAI chat-completions backend for reply drafting.

pub mod client;

pub use client::OpenAiGenerator;
