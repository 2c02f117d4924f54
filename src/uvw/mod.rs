// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Re-referencing [`UVW`] coordinates to a common tangent point.
//!
//! Each row of a visibility chunk was phased to its own pointing direction.
//! Before gridding, the baselines are rotated into the frame of the image's
//! tangent point, and the extra path length between the two directions is
//! returned as a per-row delay \[metres\]. If the image centre is not the
//! tangent point (faceting), a first-order (l, m) correction is added to the
//! delay.

#[cfg(test)]
mod tests;

use log::trace;
use marlu::{RADec, LMN, UVW};

use crate::constants::POINTING_TOLERANCE;

/// Rotates baselines phased to one direction into the frame of another.
///
/// The frames used internally have their u and v axes reversed (u points
/// west, v points south). Callers that use conventional (u, v, w) must negate
/// u and v before [`UvwMachine::convert`], negate them again afterwards and
/// negate the returned phase; [`rotate_uvws`] does exactly this.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvwMachine {
    rot: [[f64; 3]; 3],
    phase_rot: [f64; 3],
}

/// The (u, v, w) basis of the frame tangent at `dir`, as rows in equatorial
/// Cartesian coordinates. u and v are reversed.
fn frame(dir: RADec) -> [[f64; 3]; 3] {
    let (s_ra, c_ra) = dir.ra.sin_cos();
    let (s_dec, c_dec) = dir.dec.sin_cos();
    [
        [s_ra, -c_ra, 0.0],
        [s_dec * c_ra, s_dec * s_ra, -c_dec],
        [c_dec * c_ra, c_dec * s_ra, s_dec],
    ]
}

impl UvwMachine {
    /// Make a machine converting coordinates phased to `input` into
    /// coordinates phased to `output`.
    pub fn new(output: RADec, input: RADec) -> UvwMachine {
        let f_out = frame(output);
        let f_in = frame(input);
        let mut rot = [[0.0; 3]; 3];
        for (i, rot_row) in rot.iter_mut().enumerate() {
            for (j, r) in rot_row.iter_mut().enumerate() {
                *r = (0..3).map(|k| f_out[i][k] * f_in[j][k]).sum();
            }
        }
        let phase_rot = [rot[2][0], rot[2][1], rot[2][2] - 1.0];
        UvwMachine { rot, phase_rot }
    }

    /// Rotate `uvw`, also returning the change in w (the phase, expressed as
    /// a path length in the same units as `uvw`).
    pub fn convert(&self, uvw: [f64; 3]) -> (f64, [f64; 3]) {
        let dot = |a: &[f64; 3]| a[0] * uvw[0] + a[1] * uvw[1] + a[2] * uvw[2];
        let phase = dot(&self.phase_rot);
        (phase, [dot(&self.rot[0]), dot(&self.rot[1]), dot(&self.rot[2])])
    }
}

/// [`UvwMachine`]s keyed by pointing direction, all converting to the same
/// tangent point. Visibility chunks typically contain very few distinct
/// pointings, so a linear search is fine.
#[derive(Debug, Clone)]
pub struct UvwMachineCache {
    tangent: RADec,
    machines: Vec<(RADec, UvwMachine)>,
}

impl UvwMachineCache {
    pub fn new(tangent: RADec) -> UvwMachineCache {
        UvwMachineCache {
            tangent,
            machines: vec![],
        }
    }

    pub fn tangent(&self) -> RADec {
        self.tangent
    }

    /// The number of machines currently cached.
    pub fn len(&self) -> usize {
        self.machines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.machines.is_empty()
    }

    /// Get the machine for `pointing`, creating it if necessary.
    pub fn get(&mut self, pointing: RADec) -> UvwMachine {
        let found = self.machines.iter().find(|(p, _)| {
            (p.ra - pointing.ra).abs() < POINTING_TOLERANCE
                && (p.dec - pointing.dec).abs() < POINTING_TOLERANCE
        });
        match found {
            Some((_, machine)) => *machine,
            None => {
                trace!("New UVW machine for pointing {pointing:?}");
                let machine = UvwMachine::new(self.tangent, pointing);
                self.machines.push((pointing, machine));
                machine
            }
        }
    }
}

/// Rotated [`UVW`]s and delays for every row of a chunk.
#[derive(Debug, Clone, Default)]
pub struct RotatedUvws {
    pub uvws: Vec<UVW>,
    /// \[metres\]
    pub delays: Vec<f64>,
}

/// Rotate each row's [`UVW`] from its pointing direction into the frame of the
/// cache's tangent point, and calculate the associated delay. `image_centre`
/// may differ from the tangent point, in which case the delay also shifts the
/// phase centre to the image centre.
///
/// `uvws` and `pointings` must have the same length.
pub fn rotate_uvws(
    uvws: &[UVW],
    pointings: &[RADec],
    image_centre: RADec,
    cache: &mut UvwMachineCache,
) -> RotatedUvws {
    assert_eq!(
        uvws.len(),
        pointings.len(),
        "uvws.len() != pointings.len()"
    );

    let LMN { l: dl, m: dm, .. } = image_centre.to_lmn(cache.tangent());

    let mut rotated = RotatedUvws {
        uvws: Vec::with_capacity(uvws.len()),
        delays: Vec::with_capacity(uvws.len()),
    };
    for (uvw, &pointing) in uvws.iter().zip(pointings) {
        let machine = cache.get(pointing);
        let (phase, [u, v, w]) = machine.convert([-uvw.u, -uvw.v, uvw.w]);
        let rotated_uvw = UVW { u: -u, v: -v, w };
        rotated
            .delays
            .push(-phase + rotated_uvw.u * dl + rotated_uvw.v * dm);
        rotated.uvws.push(rotated_uvw);
    }

    rotated
}
