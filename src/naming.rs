// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::Scale;

/// A slug used when no title is available.
pub const DEFAULT_SLUG: &str = "svg-export";

const MAX_SLUG_LEN: usize = 50;

static NON_ALNUM: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
static SVG_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<title\b[^>]*>(.*?)</title>").expect("valid regex"));

/// Builds output file names like `solar-system-2024-05-01-2x.png`.
#[derive(Clone, Debug, Default)]
pub struct NamingPolicy {
    /// A fixed date. Today's UTC date is used when not set.
    pub date: Option<NaiveDate>,
}

impl NamingPolicy {
    /// Returns a file name for `title` exported at `scale`.
    pub fn file_name(&self, title: Option<&str>, scale: Scale) -> String {
        let date = self
            .date
            .unwrap_or_else(|| chrono::Utc::now().date_naive());

        format!(
            "{}-{}-{}.png",
            slugify(title.unwrap_or(DEFAULT_SLUG)),
            date.format("%Y-%m-%d"),
            scale.label()
        )
    }
}

/// Converts a title into a file system friendly slug.
///
/// Never returns an empty string.
pub fn slugify(title: &str) -> String {
    let lower = title.trim().to_lowercase();
    let collapsed = NON_ALNUM.replace_all(&lower, "-");
    let slug: String = collapsed.trim_matches('-').chars().take(MAX_SLUG_LEN).collect();

    if slug.is_empty() {
        DEFAULT_SLUG.to_string()
    } else {
        slug
    }
}

/// Returns the text of the first `<title>` element.
pub fn svg_title(markup: &str) -> Option<String> {
    let caps = SVG_TITLE.captures(markup)?;
    let title = caps[1].trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
