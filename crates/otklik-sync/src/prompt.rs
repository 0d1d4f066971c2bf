// SPDX-FileCopyrightText: 2026 Otklik Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Prompt assembly: placeholder substitution, product benefits
//! formatting, and the few-shot example block.

use std::collections::HashMap;
use std::sync::LazyLock;

use otklik_core::types::Platform;
use otklik_storage::GroundingExample;
use regex::Regex;
use serde_json::Value;

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([A-Za-z0-9_]+)\}").unwrap());

/// Values substituted into the prompt template.
#[derive(Debug, Clone, Default)]
pub struct PromptPayload {
    pub text: String,
    pub rating: Option<i64>,
    pub pros: String,
    pub cons: String,
    pub product_name: String,
    pub product_title: String,
    pub product_description: String,
    pub product_benefits: String,
    pub marketplace: String,
}

impl PromptPayload {
    pub fn for_platform(platform: Platform) -> Self {
        Self {
            marketplace: platform.label().to_string(),
            ..Self::default()
        }
    }

    fn values(&self) -> HashMap<&'static str, String> {
        let mut values = HashMap::new();
        values.insert("text", self.text.clone());
        values.insert(
            "rating",
            self.rating.map(|r| r.to_string()).unwrap_or_default(),
        );
        values.insert("pros", self.pros.clone());
        values.insert("cons", self.cons.clone());
        values.insert("product_name", self.product_name.clone());
        values.insert("product_title", self.product_title.clone());
        values.insert("product_description", self.product_description.clone());
        values.insert("product_benefits", self.product_benefits.clone());
        values.insert("marketplace", self.marketplace.clone());
        values
    }
}

/// Render the template and append the grounding example block.
///
/// Unknown placeholders resolve to the empty string rather than failing;
/// a typo in a user-edited template must not take the pipeline down.
pub fn render_prompt(
    template: &str,
    payload: &PromptPayload,
    examples: &[GroundingExample],
) -> String {
    let values = payload.values();
    let mut prompt = PLACEHOLDER
        .replace_all(template, |caps: &regex::Captures<'_>| {
            values.get(&caps[1]).cloned().unwrap_or_default()
        })
        .into_owned();

    if !examples.is_empty() {
        prompt.push_str("\n\nПримеры ответов в нужном стиле:");
        for (idx, example) in examples.iter().enumerate() {
            prompt.push_str(&format!("\n\nПример {}:", idx + 1));
            push_line(&mut prompt, "Отзыв", &example.text);
            push_line(&mut prompt, "Плюсы", &example.pros);
            push_line(&mut prompt, "Минусы", &example.cons);
            if let Some(rating) = example.rating {
                push_line(&mut prompt, "Оценка", &rating.to_string());
            }
            push_line(&mut prompt, "Товар", &example.product_name);
            push_line(&mut prompt, "Ответ", strip_answer_prefix(&example.answer_text));
        }
    }
    prompt
}

fn push_line(prompt: &mut String, label: &str, value: &str) {
    let value = value.trim();
    if !value.is_empty() {
        prompt.push_str(&format!("\n{label}: {value}"));
    }
}

/// Curated answers sometimes carry their own `Ответ:`/`Answer:` label.
fn strip_answer_prefix(answer: &str) -> &str {
    let trimmed = answer.trim();
    for prefix in ["Ответ:", "ответ:", "Answer:", "answer:"] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            return rest.trim_start();
        }
    }
    trimmed
}

/// Format a stored characteristics JSON array into `name: value` lines.
///
/// List values are comma-joined. Pairs with both sides empty are dropped;
/// one-sided pairs keep the remaining side without a colon. Missing or
/// unparseable input formats to the empty string.
pub fn format_product_benefits(characteristics: Option<&str>) -> String {
    let Some(raw) = characteristics else {
        return String::new();
    };
    let Ok(items) = serde_json::from_str::<Vec<Value>>(raw) else {
        return String::new();
    };
    let mut lines = Vec::new();
    for item in items {
        let name = item
            .get("name")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_string();
        let value = match item.get("value") {
            Some(Value::Array(parts)) => parts
                .iter()
                .filter(|p| !p.is_null())
                .map(scalar_to_string)
                .collect::<Vec<_>>()
                .join(", "),
            Some(other) => scalar_to_string(other),
            None => String::new(),
        };
        let value = value.trim().to_string();
        match (name.is_empty(), value.is_empty()) {
            (true, true) => {}
            (false, false) => lines.push(format!("{name}: {value}")),
            (false, true) => lines.push(name),
            (true, false) => lines.push(value),
        }
    }
    lines.join("\n")
}

fn scalar_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
