// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;

static VIEW_BOX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"viewBox\s*=\s*["']([^"']+)["']"#).expect("valid regex"));

/// A size declared by the `viewBox` attribute of an SVG.
///
/// Each axis is resolved independently, so a malformed height
/// does not discard a valid width.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct DeclaredSize {
    /// The third `viewBox` field.
    pub width: Option<f32>,
    /// The fourth `viewBox` field.
    pub height: Option<f32>,
}

impl DeclaredSize {
    /// Scans `markup` for the first `viewBox` attribute.
    ///
    /// Returns an empty size when there is no `viewBox` at all.
    pub fn from_markup(markup: &str) -> Self {
        match VIEW_BOX.captures(markup) {
            Some(caps) => Self::from_view_box(&caps[1]),
            None => DeclaredSize::default(),
        }
    }

    /// Parses a `min-x min-y width height` list.
    ///
    /// Fields can be separated by whitespace and/or commas.
    pub fn from_view_box(value: &str) -> Self {
        let fields: Vec<&str> = value
            .split(|c: char| c.is_ascii_whitespace() || c == ',')
            .filter(|s| !s.is_empty())
            .collect();

        if fields.len() != 4 {
            log::warn!("viewBox '{}' must have exactly 4 fields.", value);
        }

        DeclaredSize {
            width: fields.get(2).and_then(|s| parse_length(s)),
            height: fields.get(3).and_then(|s| parse_length(s)),
        }
    }

    /// Checks that both axes were declared.
    pub fn is_complete(&self) -> bool {
        self.width.is_some() && self.height.is_some()
    }

    /// Fills the missing axes from `fallback`.
    pub fn or(&self, fallback: usvg::Size) -> (f32, f32) {
        (
            self.width.unwrap_or_else(|| fallback.width()),
            self.height.unwrap_or_else(|| fallback.height()),
        )
    }
}

fn parse_length(s: &str) -> Option<f32> {
    let n = match svgtypes::Number::from_str(s) {
        Ok(n) => n.0 as f32,
        Err(_) => {
            log::warn!("'{}' is not a valid viewBox number.", s);
            return None;
        }
    };

    if n.is_finite() && n > 0.0 {
        Some(n)
    } else {
        log::warn!("viewBox size '{}' must be positive.", s);
        None
    }
}
