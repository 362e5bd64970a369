// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;
use std::path::PathBuf;

use crate::Error;

/// Where a delivered PNG ended up.
#[derive(Clone, PartialEq, Debug)]
pub enum Delivery {
    /// Written to a file.
    File(PathBuf),
    /// Streamed to stdout.
    Stdout,
}

/// A consumer of encoded PNG data.
pub trait DownloadSink {
    /// Saves `png` under the suggested `file_name`.
    fn deliver(&mut self, png: &[u8], file_name: &str) -> Result<Delivery, Error>;
}

/// Saves files into a directory.
#[derive(Clone, Debug)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Creates a sink for `dir`.
    ///
    /// The directory is created on the first delivery.
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        DirectorySink { dir: dir.into() }
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&mut self, png: &[u8], file_name: &str) -> Result<Delivery, Error> {
        std::fs::create_dir_all(&self.dir)?;

        // Never let a name escape the directory.
        let name = std::path::Path::new(file_name)
            .file_name()
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty file name"))?;
        let path = self.dir.join(name);

        let file = std::fs::File::create(&path)?;
        let mut w = std::io::BufWriter::new(file);
        w.write_all(png)?;
        w.flush()?;

        log::info!("Saved '{}'.", path.display());
        Ok(Delivery::File(path))
    }
}

/// Streams data to stdout, ignoring the file name.
#[derive(Clone, Copy, Default, Debug)]
pub struct StdoutSink;

impl DownloadSink for StdoutSink {
    fn deliver(&mut self, png: &[u8], _: &str) -> Result<Delivery, Error> {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle.write_all(png)?;
        handle.flush()?;
        Ok(Delivery::Stdout)
    }
}

/// Keeps deliveries in memory.
#[derive(Clone, Default, Debug)]
pub struct MemorySink {
    /// Delivered files in order.
    pub files: Vec<(String, Vec<u8>)>,
}

impl DownloadSink for MemorySink {
    fn deliver(&mut self, png: &[u8], file_name: &str) -> Result<Delivery, Error> {
        self.files.push((file_name.to_string(), png.to_vec()));
        Ok(Delivery::File(PathBuf::from(file_name)))
    }
}
