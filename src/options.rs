// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;

use crate::Error;

/// A raster scale factor.
///
/// Always a finite number greater or equal to 1.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
pub struct Scale(f32);

impl Scale {
    /// Scales offered to a user.
    pub const PRESETS: [Scale; 6] = [
        Scale(1.0),
        Scale(2.0),
        Scale(3.0),
        Scale(4.0),
        Scale(6.0),
        Scale(8.0),
    ];

    /// Creates a new scale.
    ///
    /// Returns `None` when `n` is not finite or is less than 1.
    pub fn new(n: f32) -> Option<Self> {
        if n.is_finite() && n >= 1.0 {
            Some(Scale(n))
        } else {
            None
        }
    }

    /// Returns the factor.
    pub fn get(self) -> f32 {
        self.0
    }

    /// Returns a label like `2x` or `1.5x`.
    pub fn label(self) -> String {
        format!("{}x", self.0)
    }

    /// Checks that the scale is one of the `PRESETS`.
    pub fn is_preset(self) -> bool {
        Self::PRESETS.contains(&self)
    }
}

impl Default for Scale {
    fn default() -> Self {
        Scale(2.0)
    }
}

impl std::fmt::Display for Scale {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for Scale {
    type Err = Error;

    /// Parses `2x`, `2X` or a bare `2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let s = s
            .strip_suffix('x')
            .or_else(|| s.strip_suffix('X'))
            .unwrap_or(s);
        let n: f32 = s.parse().map_err(|_| Error::InvalidScale)?;
        Scale::new(n).ok_or(Error::InvalidScale)
    }
}

/// Rasterization options.
pub struct Options {
    /// `usvg` parser options.
    ///
    /// The font database lives here as well.
    pub usvg: usvg::Options<'static>,

    /// A size used when the markup has no usable `viewBox`.
    ///
    /// `None` means the natural size of the decoded image.
    pub fallback_size: Option<usvg::Size>,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            usvg: usvg::Options::default(),
            fallback_size: None,
        }
    }
}

/// A single rasterization job.
///
/// Built right before rendering and dropped after.
#[derive(Clone, Copy, Debug)]
pub struct RenderRequest<'a> {
    /// Text expected to contain an `<svg>` element.
    pub markup: &'a str,
    /// Output scale.
    pub scale: Scale,
    /// Overrides the natural size for axes missing from `viewBox`.
    pub fallback_size: Option<usvg::Size>,
}

impl<'a> RenderRequest<'a> {
    /// Creates a request without a fallback size.
    pub fn new(markup: &'a str, scale: Scale) -> Self {
        RenderRequest {
            markup,
            scale,
            fallback_size: None,
        }
    }

    /// Sets a fallback size.
    pub fn with_fallback(mut self, size: Option<usvg::Size>) -> Self {
        self.fallback_size = size;
        self
    }
}
