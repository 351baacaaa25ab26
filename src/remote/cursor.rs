// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Ordering of remote log cursors.
//!
//! Networks encode their pagination cursors differently. Everything that
//! needs to order cursors goes through [`compare_cursors`].

use std::cmp::Ordering;

use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub(crate) enum Variant {
    /// base64 encoded JSON object carrying an `ordinate` field
    #[default]
    Envelope,
    /// Plain decimal cursor
    Numeric,
}

/// Numeric ordering key of `cursor`, if it can be read.
pub(crate) fn ordinal(variant: Variant, cursor: &str) -> Option<u64> {
    match variant {
        Variant::Numeric => cursor.trim().parse().ok(),
        Variant::Envelope => envelope_ordinate(cursor),
    }
}

fn envelope_ordinate(cursor: &str) -> Option<u64> {
    let engines = [
        base64::engine::general_purpose::STANDARD,
        base64::engine::general_purpose::URL_SAFE,
    ];
    let bytes = engines
        .iter()
        .find_map(|engine| engine.decode(cursor.trim()).ok())
        .or_else(|| {
            base64::engine::general_purpose::URL_SAFE_NO_PAD
                .decode(cursor.trim().trim_end_matches('='))
                .ok()
        })?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    match value.get("ordinate")? {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Order two cursors of the same network. Unreadable cursors sort first;
/// ties fall back to the cursor text so the order is total.
pub(crate) fn compare_cursors(variant: Variant, a: &str, b: &str) -> Ordering {
    ordinal(variant, a)
        .cmp(&ordinal(variant, b))
        .then_with(|| a.cmp(b))
}
