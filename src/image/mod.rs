// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Somewhere to put images.
//!
//! Gridders never decide where images go; anything that wants grids or
//! kernels written out hands an [`ImageSink`] to the gridder.


use indexmap::IndexMap;
use log::debug;
use ndarray::prelude::*;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImageIoError {
    #[error("An image named '{0}' has already been written")]
    Exists(String),
}

/// A destination for named images. Images are ordered
/// `[channel][polarisation][y][x]`.
pub trait ImageSink {
    fn write_image(&mut self, name: &str, image: ArrayView4<f64>) -> Result<(), ImageIoError>;
}

/// An [`ImageSink`] that keeps images in memory, in the order they were
/// written.
#[derive(Debug, Default)]
pub struct MemoryImageSink {
    images: IndexMap<String, Array4<f64>>,
}

impl MemoryImageSink {
    pub fn new() -> MemoryImageSink {
        MemoryImageSink::default()
    }

    pub fn get(&self, name: &str) -> Option<ArrayView4<f64>> {
        self.images.get(name).map(|i| i.view())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.images.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }
}

impl ImageSink for MemoryImageSink {
    fn write_image(&mut self, name: &str, image: ArrayView4<f64>) -> Result<(), ImageIoError> {
        if self.images.contains_key(name) {
            return Err(ImageIoError::Exists(name.to_string()));
        }
        debug!("Storing image '{name}' with shape {:?}", image.dim());
        self.images.insert(name.to_string(), image.to_owned());
        Ok(())
    }
}
