// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svg-png-export` finds SVG markup in text and exports it as a scaled PNG.

The output size is the `viewBox` size multiplied by a scale factor.
The image is always composited over opaque white.

```no_run
use svg_png_export::{rasterize, Options, RenderRequest, Scale};

let markup = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 50"/>"#;
let png = rasterize(&RenderRequest::new(markup, Scale::default()), &Options::default()).unwrap();
std::fs::write("out.png", png).unwrap();
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::uninlined_format_args)]

pub use tiny_skia;
pub use usvg;

mod error;
mod export;
mod extract;
mod handle;
mod naming;
mod options;
mod render;
mod sink;
mod view_box;

pub use crate::error::Error;
pub use crate::export::{Export, Exporter};
pub use crate::extract::{find_markup, FileSource, MarkupSource, StdinSource, TextSource};
pub use crate::handle::{HandleRegistry, ResourceHandle, PNG_MIME, SVG_MIME};
pub use crate::naming::{slugify, svg_title, NamingPolicy, DEFAULT_SLUG};
pub use crate::options::{Options, RenderRequest, Scale};
pub use crate::render::{encode_png, Rasterizer, Stage};
pub use crate::sink::{Delivery, DirectorySink, DownloadSink, MemorySink, StdoutSink};
pub use crate::view_box::DeclaredSize;

/// Rasterizes SVG markup into PNG data.
///
/// A shortcut for a one-off [`Rasterizer`] with its own handle registry.
pub fn rasterize(req: &RenderRequest, opt: &Options) -> Result<Vec<u8>, Error> {
    let handles = HandleRegistry::new();
    Rasterizer::new(opt, &handles).rasterize(req)
}
