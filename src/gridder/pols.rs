// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Mapping visibility polarisations and channels to image planes.

/// For each visibility correlation, the image polarisation it is gridded into
/// (or degridded from). `None` means the correlation doesn't take part. The
/// whole map is `None` if the combination isn't supported.
///
/// With 4 correlations (XX, XY, YX, YY) and fewer than 4 image planes, the
/// cross correlations are always skipped.
pub(crate) fn pol_map(num_vis_pols: usize, num_image_pols: usize) -> Option<Vec<Option<usize>>> {
    let map = match (num_image_pols, num_vis_pols) {
        (0, _) | (_, 0) => return None,
        (i, v) if i == v => (0..v).map(Some).collect(),
        (1, 2) => vec![Some(0), Some(0)],
        (1, 4) => vec![Some(0), None, None, Some(0)],
        (2, 4) => vec![Some(0), None, None, Some(1)],
        (4, 2) => vec![Some(0), Some(3)],
        (_, 1) => vec![Some(0)],
        _ => return None,
    };
    Some(map)
}

/// The image channel that visibility channel `chan` (of `num_chans`) belongs
/// to.
#[inline]
pub(crate) fn image_chan(chan: usize, num_chans: usize, num_image_chans: usize) -> usize {
    chan * num_image_chans / num_chans
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pol_map() {
        assert_eq!(pol_map(1, 1), Some(vec![Some(0)]));
        assert_eq!(
            pol_map(4, 4),
            Some(vec![Some(0), Some(1), Some(2), Some(3)])
        );
        assert_eq!(pol_map(4, 1), Some(vec![Some(0), None, None, Some(0)]));
        assert_eq!(pol_map(4, 2), Some(vec![Some(0), None, None, Some(1)]));
        assert_eq!(pol_map(2, 1), Some(vec![Some(0), Some(0)]));
        assert_eq!(pol_map(2, 4), Some(vec![Some(0), Some(3)]));
        assert_eq!(pol_map(1, 2), Some(vec![Some(0)]));
        assert_eq!(pol_map(1, 4), Some(vec![Some(0)]));

        assert_eq!(pol_map(3, 1), None);
        assert_eq!(pol_map(2, 3), None);
        assert_eq!(pol_map(4, 3), None);
        assert_eq!(pol_map(0, 1), None);
    }

    #[test]
    fn test_image_chan() {
        // MFS.
        assert!((0..16).all(|c| image_chan(c, 16, 1) == 0));
        // One-to-one.
        assert!((0..16).all(|c| image_chan(c, 16, 16) == c));
        // Averaging 4 channels into 1.
        assert_eq!(
            (0..8).map(|c| image_chan(c, 8, 2)).collect::<Vec<_>>(),
            [0, 0, 0, 0, 1, 1, 1, 1]
        );
    }
}
