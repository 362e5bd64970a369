// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use rgb::{FromSlice, RGBA8};

use crate::handle::{HandleRegistry, SVG_MIME};
use crate::view_box::DeclaredSize;
use crate::{Error, Options, RenderRequest};

/// A rasterization stage.
///
/// `Idle → Decoding → Compositing → Encoded` on success
/// and `Idle → Decoding → Failed` when the markup cannot be decoded.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Stage {
    /// Nothing is happening.
    Idle,
    /// The markup is being parsed.
    Decoding,
    /// The decoded image is drawn onto the output surface.
    Compositing,
    /// PNG data is ready.
    Encoded,
    /// The markup cannot be decoded.
    Failed,
}

/// Converts SVG markup into PNG data.
pub struct Rasterizer<'a> {
    options: &'a Options,
    handles: &'a HandleRegistry,
    stage: Stage,
}

impl<'a> Rasterizer<'a> {
    /// Creates an idle rasterizer.
    pub fn new(options: &'a Options, handles: &'a HandleRegistry) -> Self {
        Rasterizer {
            options,
            handles,
            stage: Stage::Idle,
        }
    }

    /// Returns the current stage.
    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Renders and encodes the request.
    ///
    /// The source handle is released before returning, whatever the outcome.
    pub fn rasterize(&mut self, req: &RenderRequest) -> Result<Vec<u8>, Error> {
        let pixmap = self.render(req)?;
        let data = encode_png(&pixmap).map_err(|e| {
            self.set_stage(Stage::Failed);
            e
        })?;
        self.set_stage(Stage::Encoded);
        Ok(data)
    }

    /// Renders the request onto a white pixmap.
    pub fn render(&mut self, req: &RenderRequest) -> Result<tiny_skia::Pixmap, Error> {
        self.set_stage(Stage::Idle);

        let declared = DeclaredSize::from_markup(req.markup);
        let source = self
            .handles
            .register(SVG_MIME, req.markup.as_bytes().to_vec());

        self.set_stage(Stage::Decoding);
        let tree = match usvg::Tree::from_data(source.data(), &self.options.usvg) {
            Ok(tree) => tree,
            Err(e) => {
                log::warn!("Failed to decode {}: {}.", source.url(), e);
                self.set_stage(Stage::Failed);
                return Err(e.into());
            }
        };

        let natural = tree.size();
        let fallback = req
            .fallback_size
            .or(self.options.fallback_size)
            .unwrap_or(natural);
        let (width, height) = declared.or(fallback);

        self.set_stage(Stage::Compositing);
        let pixmap = match paint(&tree, natural, width, height, req.scale.get()) {
            Ok(pixmap) => pixmap,
            Err(e) => {
                self.set_stage(Stage::Failed);
                return Err(e);
            }
        };

        drop(source);
        Ok(pixmap)
    }

    fn set_stage(&mut self, stage: Stage) {
        if self.stage != stage {
            log::debug!("{:?} -> {:?}", self.stage, stage);
            self.stage = stage;
        }
    }
}

fn paint(
    tree: &usvg::Tree,
    natural: usvg::Size,
    width: f32,
    height: f32,
    scale: f32,
) -> Result<tiny_skia::Pixmap, Error> {
    let dst_width = width * scale;
    let dst_height = height * scale;
    let size = raster_size(dst_width, dst_height).ok_or(Error::InvalidSize)?;
    let mut pixmap =
        tiny_skia::Pixmap::new(size.width(), size.height()).ok_or(Error::InvalidSize)?;

    log::debug!(
        "Compositing {}x{} onto {}x{}.",
        natural.width(),
        natural.height(),
        size.width(),
        size.height()
    );

    // Transparent SVGs must not produce transparent PNGs.
    pixmap.fill(tiny_skia::Color::WHITE);

    // Stretch the natural size into the destination rect.
    let ts = tiny_skia::Transform::from_scale(
        dst_width / natural.width(),
        dst_height / natural.height(),
    );
    resvg::render(tree, ts, &mut pixmap.as_mut());

    Ok(pixmap)
}

fn raster_size(width: f32, height: f32) -> Option<tiny_skia::IntSize> {
    if !(width.is_finite() && height.is_finite()) {
        return None;
    }

    // Fractional pixels are dropped, like a canvas size assignment.
    let width = width.trunc();
    let height = height.trunc();
    if width < 1.0 || height < 1.0 || width > u32::MAX as f32 || height > u32::MAX as f32 {
        return None;
    }

    tiny_skia::IntSize::from_wh(width as u32, height as u32)
}

/// Encodes a pixmap as an 8-bit RGBA PNG.
pub fn encode_png(pixmap: &tiny_skia::Pixmap) -> Result<Vec<u8>, Error> {
    let mut rgba = pixmap.data().to_vec();
    demultiply_alpha(rgba.as_mut_slice().as_rgba_mut());

    let mut data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut data, pixmap.width(), pixmap.height());
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Best);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&rgba)?;
        writer.finish()?;
    }

    Ok(data)
}

fn demultiply_alpha(data: &mut [RGBA8]) {
    for p in data {
        if p.a == 0 || p.a == 255 {
            continue;
        }

        let a = p.a as f64 / 255.0;
        p.b = (p.b as f64 / a + 0.5) as u8;
        p.g = (p.g as f64 / a + 0.5) as u8;
        p.r = (p.r as f64 / a + 0.5) as u8;
    }
}
