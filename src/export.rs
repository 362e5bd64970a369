// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::cell::Cell;

use crate::extract::MarkupSource;
use crate::handle::{HandleRegistry, PNG_MIME};
use crate::naming::{svg_title, NamingPolicy};
use crate::render::Rasterizer;
use crate::sink::{Delivery, DownloadSink};
use crate::{Error, Options, RenderRequest, Scale};

/// A result of a successful export.
#[derive(Clone, PartialEq, Debug)]
pub struct Export {
    /// The suggested file name.
    pub file_name: String,
    /// Where the sink put the data.
    pub delivery: Delivery,
}

/// Ties a markup source, the rasterizer, naming and a sink together.
///
/// Holds the state a user can change between exports.
pub struct Exporter {
    options: Options,
    naming: NamingPolicy,
    scale: Scale,
    title: Option<String>,
    handles: HandleRegistry,
    busy: Cell<bool>,
}

impl Exporter {
    /// Creates an exporter with the default `2x` scale.
    pub fn new(options: Options) -> Self {
        Exporter {
            options,
            naming: NamingPolicy::default(),
            scale: Scale::default(),
            title: None,
            handles: HandleRegistry::new(),
            busy: Cell::new(false),
        }
    }

    /// Returns the current scale.
    pub fn scale(&self) -> Scale {
        self.scale
    }

    /// Sets the scale used by the next export.
    pub fn set_scale(&mut self, scale: Scale) {
        self.scale = scale;
    }

    /// Sets the file naming policy.
    pub fn set_naming(&mut self, naming: NamingPolicy) {
        self.naming = naming;
    }

    /// Sets a title that takes priority over any title found in the source.
    pub fn set_title(&mut self, title: Option<String>) {
        self.title = title;
    }

    /// Returns the resource handles registry.
    pub fn handles(&self) -> &HandleRegistry {
        &self.handles
    }

    /// Checks that an export is in progress.
    pub fn is_busy(&self) -> bool {
        self.busy.get()
    }

    /// Looks up markup in `source`, rasterizes it and delivers the PNG to `sink`.
    ///
    /// Nothing is delivered on error.
    pub fn export(
        &self,
        source: &dyn MarkupSource,
        sink: &mut dyn DownloadSink,
    ) -> Result<Export, Error> {
        let _guard = self.begin()?;

        let markup = source.markup()?.ok_or(Error::NoMarkup)?;

        let data = {
            let req = RenderRequest::new(&markup, self.scale);
            let mut rasterizer = Rasterizer::new(&self.options, &self.handles);
            rasterizer.rasterize(&req)?
        };

        let title = match self.title {
            Some(ref title) => Some(title.clone()),
            None => match source.title()? {
                Some(title) => Some(title),
                None => svg_title(&markup),
            },
        };
        let file_name = self.naming.file_name(title.as_deref(), self.scale);

        let output = self.handles.register(PNG_MIME, data);
        let delivery = sink.deliver(output.data(), &file_name)?;
        drop(output);

        log::debug!("Exported '{}' at {}.", file_name, self.scale);
        Ok(Export {
            file_name,
            delivery,
        })
    }

    fn begin(&self) -> Result<BusyGuard<'_>, Error> {
        if self.busy.replace(true) {
            return Err(Error::Busy);
        }

        Ok(BusyGuard(&self.busy))
    }
}

struct BusyGuard<'a>(&'a Cell<bool>);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}
