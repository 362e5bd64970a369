// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
SVG markup lookup in unstructured text.

Lookup is heuristic. A code view is preferred (fenced blocks, `<pre>` and
`<code>` elements), then the whole text is swept for the first `<svg>` element.
*/

use std::io::Read;
use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use once_cell::unsync::OnceCell;
use regex::Regex;

use crate::Error;

const SVG_NS: &str = "http://www.w3.org/2000/svg";

static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[^\n]*\n(.*?)```").expect("valid regex"));
static PRE_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<pre\b[^>]*>(.*?)</pre>").expect("valid regex"));
static CODE_ELEMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<code\b[^>]*>(.*?)</code>").expect("valid regex"));
static SVG_OPEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"<svg\b[^>]*>").expect("valid regex"));
static SVG_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<svg\b[^>]*>|</svg\s*>").expect("valid regex"));
static HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<h[12]\b[^>]*>(.*?)</h[12]>|(?m)^#{1,2}[ \t]+(.+?)[ \t]*#*$")
        .expect("valid regex")
});
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid regex"));

/// A provider of SVG markup.
pub trait MarkupSource {
    /// Returns markup expected to contain one `<svg>` element.
    ///
    /// `Ok(None)` means that nothing SVG-like was found.
    fn markup(&self) -> Result<Option<String>, Error>;

    /// Returns a human readable title of the content, if any.
    fn title(&self) -> Result<Option<String>, Error> {
        Ok(None)
    }
}

/// An in-memory text, like a saved page or a chat transcript.
#[derive(Clone, Debug)]
pub struct TextSource(pub String);

impl MarkupSource for TextSource {
    fn markup(&self) -> Result<Option<String>, Error> {
        Ok(find_markup(&self.0))
    }

    fn title(&self) -> Result<Option<String>, Error> {
        Ok(find_heading(&self.0))
    }
}

/// A file on disk.
///
/// `.svg` and `.svgz` files are used as is, everything else is searched.
/// The file is read once, on first use, so markup and title always come
/// from the same contents.
#[derive(Clone, Debug)]
pub struct FileSource {
    path: PathBuf,
    text: OnceCell<String>,
}

impl FileSource {
    /// Creates a source for `path`. Nothing is read yet.
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        FileSource {
            path: path.into(),
            text: OnceCell::new(),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn is_svg_file(&self) -> bool {
        match self.path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.eq_ignore_ascii_case("svg") || ext.eq_ignore_ascii_case("svgz"),
            None => false,
        }
    }

    fn text(&self) -> Result<&str, Error> {
        let text = self.text.get_or_try_init(|| -> Result<String, Error> {
            let data = std::fs::read(&self.path)?;
            decode_text(data)
        })?;
        Ok(text.as_str())
    }
}

impl MarkupSource for FileSource {
    fn markup(&self) -> Result<Option<String>, Error> {
        let text = self.text()?;
        if self.is_svg_file() {
            Ok(Some(text.to_string()))
        } else {
            Ok(find_markup(text))
        }
    }

    fn title(&self) -> Result<Option<String>, Error> {
        if self.is_svg_file() {
            Ok(None)
        } else {
            Ok(find_heading(self.text()?))
        }
    }
}

/// Text read from stdin.
///
/// Stdin can be consumed only once, so it is read on construction.
#[derive(Clone, Debug)]
pub struct StdinSource(TextSource);

impl StdinSource {
    /// Reads stdin till the end.
    pub fn read() -> Result<Self, Error> {
        let mut buf = Vec::new();
        std::io::stdin().lock().read_to_end(&mut buf)?;
        Ok(StdinSource(TextSource(decode_text(buf)?)))
    }
}

impl MarkupSource for StdinSource {
    fn markup(&self) -> Result<Option<String>, Error> {
        let text = self.0 .0.trim_start();
        if text.starts_with("<?xml") || text.starts_with("<svg") {
            return Ok(Some(text.to_string()));
        }

        self.0.markup()
    }

    fn title(&self) -> Result<Option<String>, Error> {
        self.0.title()
    }
}

fn decode_text(mut data: Vec<u8>) -> Result<String, Error> {
    if data.starts_with(&[0x1f, 0x8b]) {
        data = usvg::decompress_svgz(&data)?;
    }

    String::from_utf8(data).map_err(|_| Error::ParsingFailed(usvg::Error::NotAnUtf8Str))
}

/// Searches `text` for SVG markup.
///
/// Code views are checked first, then the whole text is swept.
/// The returned fragment always declares the SVG namespace.
pub fn find_markup(text: &str) -> Option<String> {
    for block in code_blocks(text) {
        if !block.contains("<svg") {
            continue;
        }

        return match svg_fragment(&block) {
            Some(fragment) => Some(with_namespace(fragment)),
            None => {
                log::warn!("A code block mentions <svg> but has no complete element.");
                Some(block.trim().to_string())
            }
        };
    }

    svg_fragment(text).map(with_namespace)
}

fn code_blocks(text: &str) -> Vec<String> {
    let mut blocks: Vec<(usize, String)> = Vec::new();

    for caps in FENCED_BLOCK.captures_iter(text) {
        if let Some(m) = caps.get(1) {
            blocks.push((m.start(), m.as_str().to_string()));
        }
    }

    for re in [&*PRE_ELEMENT, &*CODE_ELEMENT] {
        for caps in re.captures_iter(text) {
            if let Some(m) = caps.get(1) {
                blocks.push((m.start(), unescape_html(&strip_tags(m.as_str()))));
            }
        }
    }

    blocks.sort_by_key(|(pos, _)| *pos);
    blocks.into_iter().map(|(_, block)| block).collect()
}

/// Strips highlighter markup, but not escaped SVG.
fn strip_tags(text: &str) -> String {
    ANY_TAG.replace_all(text, "").into_owned()
}

fn unescape_html(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Returns the first balanced `<svg>...</svg>` element.
fn svg_fragment(text: &str) -> Option<&str> {
    let open = SVG_OPEN.find(text)?;
    if open.as_str().ends_with("/>") {
        return Some(open.as_str());
    }

    let mut depth = 0;
    for tag in SVG_TAG.find_iter(&text[open.start()..]) {
        let tag_str = tag.as_str();
        if tag_str.starts_with("</") {
            depth -= 1;
            if depth == 0 {
                return Some(&text[open.start()..open.start() + tag.end()]);
            }
        } else if !tag_str.ends_with("/>") {
            depth += 1;
        }
    }

    None
}

fn with_namespace(fragment: &str) -> String {
    let open_end = fragment.find('>').unwrap_or(fragment.len());
    let has_ns = fragment[..open_end].contains("xmlns=\"") || fragment[..open_end].contains("xmlns='");
    if has_ns {
        fragment.to_string()
    } else {
        format!("<svg xmlns=\"{}\"{}", SVG_NS, &fragment["<svg".len()..])
    }
}

fn find_heading(text: &str) -> Option<String> {
    // `#` lines inside code blocks are comments, not headings.
    let text = FENCED_BLOCK.replace_all(text, "");
    let caps = HEADING.captures(&text)?;
    let raw = caps.get(1).or_else(|| caps.get(2))?.as_str();
    let title = unescape_html(&strip_tags(raw));
    let title = title.trim();
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}
