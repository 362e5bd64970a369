// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// List of all errors.
#[derive(Debug)]
pub enum Error {
    /// No SVG markup could be located in the source.
    NoMarkup,

    /// The markup cannot be decoded as an SVG image.
    ParsingFailed(usvg::Error),

    /// The output raster has a zero, negative or non-finite size.
    ///
    /// Also occurs when the raster is too big to be allocated.
    InvalidSize,

    /// The scale factor is not a finite number greater or equal to 1.
    InvalidScale,

    /// PNG encoding failed.
    EncodingFailed(png::EncodingError),

    /// Another export is still in progress.
    Busy,

    /// Reading a source or writing to a sink failed.
    Io(std::io::Error),
}

impl Error {
    /// Returns the message shown to a user when an export is aborted.
    pub fn user_message(&self) -> String {
        match *self {
            Error::NoMarkup => {
                "No SVG found! Make sure an SVG artifact is visible or open the Code view."
                    .to_string()
            }
            Error::ParsingFailed(_) | Error::InvalidSize => {
                "Error loading SVG. Try switching to Code view first.".to_string()
            }
            Error::Busy => "An export is already running.".to_string(),
            _ => format!("Export failed: {}.", self),
        }
    }

    /// Checks that the error was produced by the rasterizer and not by
    /// the markup lookup or the sink.
    pub fn is_render_error(&self) -> bool {
        matches!(
            self,
            Error::ParsingFailed(_)
                | Error::InvalidSize
                | Error::InvalidScale
                | Error::EncodingFailed(_)
        )
    }
}

impl From<usvg::Error> for Error {
    fn from(e: usvg::Error) -> Self {
        Error::ParsingFailed(e)
    }
}

impl From<png::EncodingError> for Error {
    fn from(e: png::EncodingError) -> Self {
        Error::EncodingFailed(e)
    }
}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match *self {
            Error::NoMarkup => {
                write!(f, "no SVG markup was found")
            }
            Error::ParsingFailed(ref e) => {
                write!(f, "SVG data parsing failed cause {}", e)
            }
            Error::InvalidSize => {
                write!(f, "SVG has an invalid size")
            }
            Error::InvalidScale => {
                write!(f, "scale factor must be a finite number >= 1")
            }
            Error::EncodingFailed(ref e) => {
                write!(f, "PNG encoding failed cause {}", e)
            }
            Error::Busy => {
                write!(f, "another export is in progress")
            }
            Error::Io(ref e) => {
                write!(f, "{}", e)
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::ParsingFailed(ref e) => Some(e),
            Error::EncodingFailed(ref e) => Some(e),
            Error::Io(ref e) => Some(e),
            _ => None,
        }
    }
}
