// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// A MIME type of an SVG source handle.
pub const SVG_MIME: &str = "image/svg+xml;charset=utf-8";

/// A MIME type of an encoded output handle.
pub const PNG_MIME: &str = "image/png";

/// A registry of short-lived resource handles.
///
/// Works like object URLs: every registered blob gets a unique URL
/// and stays alive until its handle is dropped.
#[derive(Default, Debug)]
pub struct HandleRegistry {
    next_id: Cell<u32>,
    live: RefCell<BTreeMap<u32, &'static str>>,
}

impl HandleRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `data` and returns a handle owning it.
    pub fn register(&self, mime: &'static str, data: Vec<u8>) -> ResourceHandle<'_> {
        let id = self.next_id.get();
        self.next_id.set(id.wrapping_add(1));
        self.live.borrow_mut().insert(id, mime);
        log::trace!("Created {} ({}, {} bytes).", url(id), mime, data.len());

        ResourceHandle {
            registry: self,
            id,
            mime,
            data,
        }
    }

    /// Returns the number of handles that were not released yet.
    pub fn live(&self) -> usize {
        self.live.borrow().len()
    }

    fn release(&self, id: u32) {
        if self.live.borrow_mut().remove(&id).is_some() {
            log::trace!("Revoked {}.", url(id));
        }
    }
}

/// A registered resource.
///
/// Released on drop, on every path.
#[derive(Debug)]
pub struct ResourceHandle<'a> {
    registry: &'a HandleRegistry,
    id: u32,
    mime: &'static str,
    data: Vec<u8>,
}

impl ResourceHandle<'_> {
    /// Returns the handle URL.
    pub fn url(&self) -> String {
        url(self.id)
    }

    /// Returns the MIME type the handle was registered with.
    pub fn mime(&self) -> &'static str {
        self.mime
    }

    /// Returns the underlying data.
    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for ResourceHandle<'_> {
    fn drop(&mut self) {
        self.registry.release(self.id);
    }
}

fn url(id: u32) -> String {
    format!("blob:svg-png-export/{}", id)
}
