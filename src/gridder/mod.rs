// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Gridding visibilities onto, and degridding them from, a regular grid.
//!
//! A [`VisGridder`] is used in one of two directions:
//!
//! - gridding: [`VisGridder::initialise_grid`], then [`VisGridder::grid`] for
//!   each chunk of visibilities, then [`VisGridder::finalise_grid`] (and
//!   [`VisGridder::finalise_weights`]) to get an image;
//! - degridding: [`VisGridder::initialise_degrid`] with a model image, then
//!   [`VisGridder::degrid`] for each chunk (model visibilities are added to
//!   the chunk's visibilities), then [`VisGridder::finalise_degrid`].
//!
//! Grids are padded by the padding factor; the origin of the (u, v) plane is
//! at pixel `n / 2` of each padded axis.

mod accumulate;
mod error;
mod pols;
mod stats;

pub use error::GridderError;
pub use stats::GridderStats;

use std::time::Instant;

use itertools::iproduct;
use log::{debug, trace};
use marlu::{c32, c64, RADec};
use ndarray::prelude::*;
use rustfft::FftPlanner;

use crate::{
    axes::Axes,
    chunk::{check_chunk, VisChunk, VisWeighting},
    constants::POINTING_TOLERANCE,
    conv_func::{ConvFuncCache, ConvFuncError, ConvFuncTable, ConvolutionFunction},
    fft::fft2d,
    image::ImageSink,
    uvw::{rotate_uvws, UvwMachineCache},
};
use accumulate::{degrid_kernel, grid_kernel, place_chunk, Placement};
use pols::{image_chan, pol_map};

/// The shape of an (unpadded) image cube.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageShape {
    pub nx: usize,
    pub ny: usize,
    pub num_pols: usize,
    pub num_chans: usize,
}

impl ImageShape {
    pub fn new(nx: usize, ny: usize, num_pols: usize, num_chans: usize) -> ImageShape {
        ImageShape {
            nx,
            ny,
            num_pols,
            num_chans,
        }
    }

    /// The dimensions of arrays with this shape, ordered
    /// `[channel][polarisation][y][x]`.
    pub fn dim(&self) -> (usize, usize, usize, usize) {
        (self.num_chans, self.num_pols, self.ny, self.nx)
    }

    fn is_empty(&self) -> bool {
        self.nx == 0 || self.ny == 0 || self.num_pols == 0 || self.num_chans == 0
    }
}

/// How an image maps onto a padded grid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct GridLayout {
    pub(crate) shape: ImageShape,
    pub(crate) padded_nx: usize,
    pub(crate) padded_ny: usize,
    /// \[wavelengths\]
    pub(crate) uv_cell_sizes: [f64; 2],
}

impl GridLayout {
    /// The (x, y) pixel of the padded grid at which the image starts.
    fn image_offsets(&self) -> (usize, usize) {
        (
            self.padded_nx / 2 - self.shape.nx / 2,
            self.padded_ny / 2 - self.shape.ny / 2,
        )
    }

    fn padded_dim(&self) -> (usize, usize, usize, usize) {
        (
            self.shape.num_chans,
            self.shape.num_pols,
            self.padded_ny,
            self.padded_nx,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Direction {
    Grid,
    Psf,
    Degrid,
}

impl Direction {
    fn describe(self) -> &'static str {
        match self {
            Direction::Grid => "gridding",
            Direction::Psf => "PSF gridding",
            Direction::Degrid => "degridding",
        }
    }
}

/// Everything set up by `initialise_grid` or `initialise_degrid`.
struct Setup {
    direction: Direction,
    layout: GridLayout,
    image_centre: RADec,
    uvw_cache: UvwMachineCache,
}

/// The feed and pointing whose data makes the PSF.
#[derive(Debug, Clone, Copy, PartialEq)]
struct PsfReference {
    feed: usize,
    pointing: RADec,
}

impl PsfReference {
    fn matches(&self, feed: usize, pointing: RADec) -> bool {
        self.feed == feed
            && (self.pointing.ra - pointing.ra).abs() < POINTING_TOLERANCE
            && (self.pointing.dec - pointing.dec).abs() < POINTING_TOLERANCE
    }
}

/// Grids visibilities with a table of precomputed convolution kernels, and
/// degrids them with the same table.
///
/// A gridder is not thread safe; run multiple gridders to spread work over
/// threads and combine their grids and weights afterwards.
pub struct VisGridder {
    conv_func: ConvFuncCache,
    padding: f64,
    /// Should all data be used to make the PSF, rather than only the data of
    /// the first feed and pointing seen?
    all_data_psf: bool,
    square_pixels: bool,
    weighting: Option<Box<dyn VisWeighting>>,

    setup: Option<Setup>,
    /// One cube per grid index, each ordered
    /// `[channel][polarisation][v][u]`.
    grids: Vec<Array4<c64>>,
    /// `[kernel class][image polarisation][image channel]`
    sum_weights: Array3<f64>,
    psf_reference: Option<PsfReference>,
    model_is_empty: bool,

    stats: GridderStats,
}

impl VisGridder {
    /// Create a new gridder using the convolution function `func`. Grids are
    /// `padding` times larger than the images on each axis.
    pub fn new(
        func: Box<dyn ConvolutionFunction>,
        padding: f64,
    ) -> Result<VisGridder, GridderError> {
        if padding.is_nan() || padding < 1.0 {
            return Err(GridderError::InvalidPadding(padding));
        }
        if func.oversample() == 0 {
            return Err(ConvFuncError::ZeroOversample.into());
        }

        Ok(VisGridder {
            conv_func: ConvFuncCache::new(func),
            padding,
            all_data_psf: false,
            square_pixels: false,
            weighting: None,
            setup: None,
            grids: vec![],
            sum_weights: Array3::zeros((0, 0, 0)),
            psf_reference: None,
            model_is_empty: false,
            stats: GridderStats::default(),
        })
    }

    /// Use the data of every feed and pointing when making a PSF.
    pub fn with_all_data_psf(mut self, all_data_psf: bool) -> VisGridder {
        self.all_data_psf = all_data_psf;
        self
    }

    /// Refuse to initialise with axes that don't describe square pixels.
    pub fn with_square_pixels(mut self, square_pixels: bool) -> VisGridder {
        self.square_pixels = square_pixels;
        self
    }

    /// Weight each visibility with `weighting` when gridding and degridding.
    pub fn set_weighting<W: VisWeighting + 'static>(&mut self, weighting: W) {
        self.weighting = Some(Box::new(weighting));
    }

    pub fn clear_weighting(&mut self) {
        self.weighting = None;
    }

    fn new_setup(
        &self,
        axes: &Axes,
        shape: ImageShape,
        direction: Direction,
    ) -> Result<Setup, GridderError> {
        if shape.is_empty() {
            let (c, p, y, x) = shape.dim();
            return Err(GridderError::EmptyShape([c, p, y, x]));
        }
        axes.check_direction_axes()?;
        if self.square_pixels {
            axes.check_square_pixels([shape.nx, shape.ny])?;
        }
        let uv_cell_sizes = axes.uv_cell_sizes(self.padding)?;
        let tangent = axes.tangent_point()?;
        let image_centre = axes.image_centre()?;

        let layout = GridLayout {
            shape,
            padded_nx: (shape.nx as f64 * self.padding).floor() as usize,
            padded_ny: (shape.ny as f64 * self.padding).floor() as usize,
            uv_cell_sizes,
        };
        debug!(
            "Initialising for {}: {}x{} image ({} pols, {} chans) on a {}x{} grid",
            direction.describe(),
            shape.nx,
            shape.ny,
            shape.num_pols,
            shape.num_chans,
            layout.padded_nx,
            layout.padded_ny
        );
        debug!(
            "UV cell sizes: {} x {} wavelengths; tangent point {tangent:?}, image centre {image_centre:?}",
            uv_cell_sizes[0], uv_cell_sizes[1]
        );

        Ok(Setup {
            direction,
            layout,
            image_centre,
            uvw_cache: UvwMachineCache::new(tangent),
        })
    }

    /// Prepare to grid visibilities into an image with `shape` described by
    /// `axes`. Any previous grids and weights are discarded. If `dopsf` is
    /// true, unit-amplitude samples are gridded instead of the visibilities.
    pub fn initialise_grid(
        &mut self,
        axes: &Axes,
        shape: ImageShape,
        dopsf: bool,
    ) -> Result<(), GridderError> {
        let direction = if dopsf {
            Direction::Psf
        } else {
            Direction::Grid
        };
        let setup = self.new_setup(axes, shape, direction)?;

        let func = self.conv_func.func();
        self.grids = vec![Array4::zeros(setup.layout.padded_dim()); func.num_grids()];
        self.sum_weights = Array3::zeros((func.num_classes(), shape.num_pols, shape.num_chans));
        self.psf_reference = None;
        self.model_is_empty = false;
        self.setup = Some(setup);
        Ok(())
    }

    /// Rows of `chunk` that go into the PSF. The first row seen after
    /// initialisation picks the feed and pointing used.
    fn select_psf_rows(&mut self, chunk: &dyn VisChunk) -> Vec<bool> {
        chunk
            .feeds()
            .iter()
            .zip(chunk.pointing_dirs())
            .map(|(&feed, &pointing)| {
                let reference = *self.psf_reference.get_or_insert_with(|| {
                    debug!("Using feed {feed} with pointing {pointing:?} for the PSF");
                    PsfReference { feed, pointing }
                });
                if reference.matches(feed, pointing) {
                    true
                } else {
                    self.stats.num_psf_rows_rejected += 1;
                    false
                }
            })
            .collect()
    }

    /// Grid a chunk of visibilities.
    pub fn grid(&mut self, chunk: &dyn VisChunk) -> Result<(), GridderError> {
        let setup = self
            .setup
            .as_mut()
            .ok_or(GridderError::NotInitialised { operation: "grid" })?;
        let psf = match setup.direction {
            Direction::Grid => false,
            Direction::Psf => true,
            Direction::Degrid => {
                return Err(GridderError::WrongDirection {
                    operation: "grid",
                    initialised_for: Direction::Degrid.describe(),
                })
            }
        };
        check_chunk(chunk)?;
        let layout = setup.layout;

        let pol_map = match pol_map(chunk.num_pols(), layout.shape.num_pols) {
            Some(m) => m,
            None => {
                debug!(
                    "Can't grid {} visibility polarisations into {} image polarisations; skipping chunk",
                    chunk.num_pols(),
                    layout.shape.num_pols
                );
                self.stats.num_unsupported_pols += (chunk.num_rows() * chunk.num_chans()) as u64;
                return Ok(());
            }
        };

        let start = Instant::now();
        let rotated = rotate_uvws(
            chunk.uvws(),
            chunk.pointing_dirs(),
            setup.image_centre,
            &mut setup.uvw_cache,
        );
        self.stats.time_coordinates += start.elapsed();

        let rows = if psf && !self.all_data_psf {
            Some(self.select_psf_rows(chunk))
        } else {
            None
        };

        let start = Instant::now();
        let (func, table) = self.conv_func.prepare(chunk);
        self.stats.time_conv_func += start.elapsed();

        let start = Instant::now();
        let support = table.support();
        let placements = place_chunk(
            chunk,
            &rotated,
            rows.as_deref(),
            &layout,
            support,
            table.oversample(),
            false,
            &mut self.stats,
        )?;
        let num_placements = placements.len();
        let points_per_sample = (table.width() * table.width()) as u64;
        let vis = chunk.vis();

        for Placement {
            row,
            chan,
            freq,
            point,
            phasor,
        } in placements
        {
            let image_chan = image_chan(chan, chunk.num_chans(), layout.shape.num_chans);
            for (pol, image_pol) in pol_map
                .iter()
                .enumerate()
                .filter_map(|(pol, &image_pol)| image_pol.map(|ip| (pol, ip)))
            {
                let weight = self
                    .weighting
                    .as_ref()
                    .map_or(1.0, |w| w.weight(row, freq, pol));
                let value = if psf {
                    c64::new(weight, 0.0)
                } else {
                    let v = vis[(row, chan, pol)];
                    c64::new(v.re as f64, -v.im as f64) * phasor * weight
                };

                let class = func.classify(row, pol, chan);
                let i_grid = func.grid_index(row, pol, chan);
                assert!(
                    i_grid < self.grids.len(),
                    "Grid index {i_grid} is out of range (only {} grids)",
                    self.grids.len()
                );
                let kernel = table.kernel(table.index(point.frac_u, point.frac_v, class));
                grid_kernel(
                    self.grids[i_grid].slice_mut(s![image_chan, image_pol, .., ..]),
                    kernel,
                    &point,
                    support,
                    value,
                );
                self.sum_weights[(class, image_pol, image_chan)] += 1.0;
                self.stats.samples_gridded += 1;
                self.stats.points_gridded += points_per_sample;
            }
        }
        self.stats.time_gridding += start.elapsed();
        self.stats.num_conv_func_builds = self.conv_func.num_builds() as u64;
        trace!(
            "Gridded {num_placements} of {} (row, channel) pairs",
            chunk.num_rows() * chunk.num_chans()
        );

        Ok(())
    }

    /// Transform the grids into an image cube (ordered
    /// `[channel][polarisation][y][x]`), corrected for the convolution
    /// function. Multiple grids are summed.
    pub fn finalise_grid(&self) -> Result<Array4<f64>, GridderError> {
        let setup = self.setup.as_ref().ok_or(GridderError::NotInitialised {
            operation: "finalise the grid",
        })?;
        let layout = setup.layout;
        let shape = layout.shape;
        let mut image = Array4::zeros(shape.dim());
        if self.grids.is_empty() {
            debug!("No grids to finalise; the image is empty");
            return Ok(image);
        }

        let (x0, y0) = layout.image_offsets();
        let norm = (layout.padded_nx * layout.padded_ny) as f64;
        let func = self.conv_func.func();
        let mut planner = FftPlanner::new();
        for (chan, pol) in iproduct!(0..shape.num_chans, 0..shape.num_pols) {
            let mut plane = Array2::<c64>::zeros((layout.padded_ny, layout.padded_nx));
            for grid in &self.grids {
                plane += &grid.slice(s![chan, pol, .., ..]);
            }
            fft2d(&mut planner, plane.view_mut(), false);
            let mut real = plane.mapv(|p| p.re * norm);
            func.correct_image(real.view_mut());
            image
                .slice_mut(s![chan, pol, .., ..])
                .assign(&real.slice(s![y0..y0 + shape.ny, x0..x0 + shape.nx]));
        }
        debug!("Finalised {} grid(s) into a {:?} image", self.grids.len(), image.dim());

        Ok(image)
    }

    /// The weights image: for each image plane, the sum of weights over all
    /// kernel classes, broadcast over the plane.
    pub fn finalise_weights(&self) -> Result<Array4<f64>, GridderError> {
        let setup = self.setup.as_ref().ok_or(GridderError::NotInitialised {
            operation: "finalise the weights",
        })?;
        if setup.direction == Direction::Degrid {
            return Err(GridderError::WrongDirection {
                operation: "finalise the weights",
                initialised_for: Direction::Degrid.describe(),
            });
        }
        let shape = setup.layout.shape;
        let expected = [
            self.conv_func.func().num_classes(),
            shape.num_pols,
            shape.num_chans,
        ];
        let (d0, d1, d2) = self.sum_weights.dim();
        if [d0, d1, d2] != expected {
            return Err(GridderError::SumWeightsShape {
                expected,
                got: [d0, d1, d2],
            });
        }

        let per_plane = self.sum_weights.sum_axis(Axis(0));
        let mut weights = Array4::zeros(shape.dim());
        for (chan, pol) in iproduct!(0..shape.num_chans, 0..shape.num_pols) {
            weights
                .slice_mut(s![chan, pol, .., ..])
                .fill(per_plane[(pol, chan)]);
        }
        Ok(weights)
    }

    /// Prepare to degrid the model `image` (ordered
    /// `[channel][polarisation][y][x]`) described by `axes`. The image is
    /// corrected for the convolution function, padded and transformed onto
    /// the grids. An all-zero image is noted as empty and not transformed;
    /// degridding it does nothing.
    pub fn initialise_degrid(
        &mut self,
        axes: &Axes,
        image: ArrayView4<f64>,
    ) -> Result<(), GridderError> {
        let (num_chans, num_pols, ny, nx) = image.dim();
        let shape = ImageShape::new(nx, ny, num_pols, num_chans);
        let setup = self.new_setup(axes, shape, Direction::Degrid)?;
        let layout = setup.layout;

        let func = self.conv_func.func();
        self.sum_weights = Array3::zeros((func.num_classes(), num_pols, num_chans));
        self.psf_reference = None;
        self.grids.clear();
        self.model_is_empty = image.iter().all(|&p| p == 0.0);

        if self.model_is_empty {
            debug!("The model is empty; degridding will be skipped");
        } else {
            let (x0, y0) = layout.image_offsets();
            let mut grid = Array4::zeros(layout.padded_dim());
            let mut planner = FftPlanner::new();
            for (chan, pol) in iproduct!(0..num_chans, 0..num_pols) {
                let mut padded = Array2::<f64>::zeros((layout.padded_ny, layout.padded_nx));
                padded
                    .slice_mut(s![y0..y0 + ny, x0..x0 + nx])
                    .assign(&image.slice(s![chan, pol, .., ..]));
                func.correct_image(padded.view_mut());
                let mut plane = padded.mapv(|p| c64::new(p, 0.0));
                fft2d(&mut planner, plane.view_mut(), true);
                grid.slice_mut(s![chan, pol, .., ..]).assign(&plane);
            }
            self.grids = vec![grid; func.num_grids()];
        }

        self.setup = Some(setup);
        Ok(())
    }

    /// Degrid the model onto a chunk of visibilities. Model visibilities are
    /// added to the existing visibilities.
    pub fn degrid(&mut self, chunk: &mut dyn VisChunk) -> Result<(), GridderError> {
        let setup = self
            .setup
            .as_mut()
            .ok_or(GridderError::NotInitialised {
                operation: "degrid",
            })?;
        match setup.direction {
            Direction::Degrid => (),
            Direction::Psf => return Err(GridderError::PsfDegrid),
            Direction::Grid => {
                return Err(GridderError::WrongDirection {
                    operation: "degrid",
                    initialised_for: Direction::Grid.describe(),
                })
            }
        }
        check_chunk(&*chunk)?;
        if self.model_is_empty {
            trace!("Not degridding an empty model");
            return Ok(());
        }
        let layout = setup.layout;

        let pol_map = match pol_map(chunk.num_pols(), layout.shape.num_pols) {
            Some(m) => m,
            None => {
                debug!(
                    "Can't degrid {} image polarisations into {} visibility polarisations; skipping chunk",
                    layout.shape.num_pols,
                    chunk.num_pols()
                );
                self.stats.num_unsupported_pols += (chunk.num_rows() * chunk.num_chans()) as u64;
                return Ok(());
            }
        };

        let start = Instant::now();
        let rotated = rotate_uvws(
            chunk.uvws(),
            chunk.pointing_dirs(),
            setup.image_centre,
            &mut setup.uvw_cache,
        );
        self.stats.time_coordinates += start.elapsed();

        let start = Instant::now();
        let (func, table) = self.conv_func.prepare(&*chunk);
        self.stats.time_conv_func += start.elapsed();

        let start = Instant::now();
        let support = table.support();
        let placements = place_chunk(
            &*chunk,
            &rotated,
            None,
            &layout,
            support,
            table.oversample(),
            true,
            &mut self.stats,
        )?;
        let num_placements = placements.len();
        let points_per_sample = (table.width() * table.width()) as u64;
        let num_chans = chunk.num_chans();
        let mut vis = chunk.vis_mut();

        for Placement {
            row,
            chan,
            freq,
            point,
            phasor,
        } in placements
        {
            let image_chan = image_chan(chan, num_chans, layout.shape.num_chans);
            for (pol, image_pol) in pol_map
                .iter()
                .enumerate()
                .filter_map(|(pol, &image_pol)| image_pol.map(|ip| (pol, ip)))
            {
                let class = func.classify(row, pol, chan);
                let i_grid = func.grid_index(row, pol, chan);
                assert!(
                    i_grid < self.grids.len(),
                    "Grid index {i_grid} is out of range (only {} grids)",
                    self.grids.len()
                );
                let kernel = table.kernel(table.index(point.frac_u, point.frac_v, class));
                let sample = degrid_kernel(
                    self.grids[i_grid].slice(s![image_chan, image_pol, .., ..]),
                    kernel,
                    &point,
                    support,
                );

                let weight = self
                    .weighting
                    .as_ref()
                    .map_or(1.0, |w| w.weight(row, freq, pol));
                let v = sample.conj() * phasor * weight;
                vis[(row, chan, pol)] += c32::new(v.re as f32, v.im as f32);
                self.stats.samples_degridded += 1;
                self.stats.points_degridded += points_per_sample;
            }
        }
        self.stats.time_degridding += start.elapsed();
        self.stats.num_conv_func_builds = self.conv_func.num_builds() as u64;
        trace!(
            "Degridded {num_placements} of {} (row, channel) pairs",
            vis.len_of(Axis(0)) * num_chans
        );

        Ok(())
    }

    /// Finish degridding, releasing the grids.
    pub fn finalise_degrid(&mut self) -> Result<(), GridderError> {
        match self.setup.as_ref().map(|s| s.direction) {
            None => {
                return Err(GridderError::NotInitialised {
                    operation: "finalise degridding",
                })
            }
            Some(Direction::Degrid) => (),
            Some(d) => {
                return Err(GridderError::WrongDirection {
                    operation: "finalise degridding",
                    initialised_for: d.describe(),
                })
            }
        }

        debug!("Finished degridding; releasing {} grid(s)", self.grids.len());
        self.grids = vec![];
        self.setup = None;
        self.model_is_empty = false;
        Ok(())
    }

    /// Write the real part of each grid, and the amplitudes of the
    /// convolution kernels (if they've been made), to `sink`. Grids are named
    /// `<name>.grid<index>`, kernels `<name>.kernels`.
    pub fn save_grids(&self, sink: &mut dyn ImageSink, name: &str) -> Result<(), GridderError> {
        if self.setup.is_none() {
            return Err(GridderError::NotInitialised {
                operation: "save grids",
            });
        }

        for (i, grid) in self.grids.iter().enumerate() {
            let real = grid.mapv(|g| g.re);
            sink.write_image(&format!("{name}.grid{i}"), real.view())?;
        }
        if let Some(table) = self.conv_func.table() {
            let amps = table.kernels().mapv(|k| k.norm()).insert_axis(Axis(0));
            sink.write_image(&format!("{name}.kernels"), amps.view())?;
        }
        Ok(())
    }

    pub fn stats(&self) -> &GridderStats {
        &self.stats
    }

    /// `[kernel class][image polarisation][image channel]`
    pub fn sum_weights(&self) -> ArrayView3<f64> {
        self.sum_weights.view()
    }

    pub fn grids(&self) -> &[Array4<c64>] {
        &self.grids
    }

    pub fn padding(&self) -> f64 {
        self.padding
    }

    /// The (x, y) size of the padded grid, if initialised.
    pub fn padded_shape(&self) -> Option<[usize; 2]> {
        self.setup
            .as_ref()
            .map(|s| [s.layout.padded_nx, s.layout.padded_ny])
    }

    /// The (u, v) cell sizes \[wavelengths\], if initialised.
    pub fn uv_cell_sizes(&self) -> Option<[f64; 2]> {
        self.setup.as_ref().map(|s| s.layout.uv_cell_sizes)
    }

    pub fn model_is_empty(&self) -> bool {
        self.model_is_empty
    }

    pub fn is_psf_gridder(&self) -> bool {
        matches!(
            self.setup.as_ref().map(|s| s.direction),
            Some(Direction::Psf)
        )
    }

    /// The feed and pointing used to make the PSF, once chosen.
    pub fn psf_reference(&self) -> Option<(usize, RADec)> {
        self.psf_reference.map(|r| (r.feed, r.pointing))
    }

    pub fn conv_func(&self) -> &dyn ConvolutionFunction {
        self.conv_func.func()
    }

    /// The kernel table, once it's been made.
    pub fn conv_func_table(&self) -> Option<&ConvFuncTable> {
        self.conv_func.table()
    }
}

impl Drop for VisGridder {
    fn drop(&mut self) {
        let name = format!("{} gridder", self.conv_func.func().kind());
        self.stats.report(&name);
    }
}
