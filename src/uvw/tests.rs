// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use approx::assert_abs_diff_eq;

use super::*;

fn test_uvws() -> Vec<UVW> {
    vec![
        UVW {
            u: 102.0,
            v: -35.5,
            w: 12.25,
        },
        UVW {
            u: -750.0,
            v: 565.0,
            w: -66.5,
        },
        UVW {
            u: 0.0,
            v: 0.0,
            w: 0.0,
        },
    ]
}

fn norm(uvw: &UVW) -> f64 {
    (uvw.u * uvw.u + uvw.v * uvw.v + uvw.w * uvw.w).sqrt()
}

#[test]
fn test_same_direction_is_identity() {
    let dir = RADec::from_degrees(60.0, -27.0);
    let uvws = test_uvws();
    let mut cache = UvwMachineCache::new(dir);
    let rotated = rotate_uvws(&uvws, &[dir; 3], dir, &mut cache);

    for ((r, uvw), delay) in rotated.uvws.iter().zip(&uvws).zip(&rotated.delays) {
        assert_abs_diff_eq!(r.u, uvw.u, epsilon = 1e-10);
        assert_abs_diff_eq!(r.v, uvw.v, epsilon = 1e-10);
        assert_abs_diff_eq!(r.w, uvw.w, epsilon = 1e-10);
        assert_abs_diff_eq!(*delay, 0.0, epsilon = 1e-10);
    }
}

#[test]
fn test_rotation_preserves_length_and_delay_is_w_change() {
    let tangent = RADec::from_degrees(60.0, -27.0);
    let pointing = RADec::from_degrees(62.5, -25.0);
    let uvws = test_uvws();
    let mut cache = UvwMachineCache::new(tangent);
    let rotated = rotate_uvws(&uvws, &[pointing; 3], tangent, &mut cache);

    for ((r, uvw), delay) in rotated.uvws.iter().zip(&uvws).zip(&rotated.delays) {
        assert_abs_diff_eq!(norm(r), norm(uvw), epsilon = 1e-9);
        // With the image centre at the tangent point, the delay is just the
        // change in w.
        assert_abs_diff_eq!(*delay, uvw.w - r.w, epsilon = 1e-9);
    }
    // The rotation isn't trivial.
    assert!((rotated.uvws[0].u - uvws[0].u).abs() > 1e-3);
}

#[test]
fn test_pure_ra_offset_at_equator() {
    // At the equator, moving the phase centre in RA by `d` rotates u and w
    // about the v axis.
    let d = 0.01_f64;
    let tangent = RADec { ra: 0.0, dec: 0.0 };
    let pointing = RADec { ra: d, dec: 0.0 };
    let uvw = UVW {
        u: 100.0,
        v: 50.0,
        w: 0.0,
    };
    let mut cache = UvwMachineCache::new(tangent);
    let rotated = rotate_uvws(&[uvw], &[pointing], tangent, &mut cache);
    let r = rotated.uvws[0];
    assert_abs_diff_eq!(r.u, 100.0 * d.cos(), epsilon = 1e-9);
    assert_abs_diff_eq!(r.v, 50.0, epsilon = 1e-9);
    assert_abs_diff_eq!(r.w.abs(), 100.0 * d.sin(), epsilon = 1e-9);
}

#[test]
fn test_image_centre_offset_adds_lm_delay() {
    let tangent = RADec::from_degrees(60.0, -27.0);
    let centre = RADec::from_degrees(60.5, -26.5);
    let uvws = test_uvws();
    let mut cache = UvwMachineCache::new(tangent);
    let rotated = rotate_uvws(&uvws, &[tangent; 3], centre, &mut cache);

    let lmn = centre.to_lmn(tangent);
    for ((r, uvw), delay) in rotated.uvws.iter().zip(&uvws).zip(&rotated.delays) {
        // No rotation; the pointing is the tangent point.
        assert_abs_diff_eq!(r.u, uvw.u, epsilon = 1e-10);
        assert_abs_diff_eq!(*delay, uvw.u * lmn.l + uvw.v * lmn.m, epsilon = 1e-9);
    }
    assert!(rotated.delays[0].abs() > 1e-3);
}

#[test]
fn test_cache_reuses_machines() {
    let tangent = RADec::from_degrees(60.0, -27.0);
    let p1 = RADec::from_degrees(61.0, -27.0);
    let p2 = RADec::from_degrees(59.0, -28.0);
    let mut cache = UvwMachineCache::new(tangent);
    assert!(cache.is_empty());

    let uvws = test_uvws();
    rotate_uvws(&uvws, &[p1, p2, p1], tangent, &mut cache);
    assert_eq!(cache.len(), 2);
    rotate_uvws(&uvws, &[p2, p2, p2], tangent, &mut cache);
    assert_eq!(cache.len(), 2);

    assert_eq!(cache.get(p1), UvwMachine::new(tangent, p1));
}

#[test]
#[should_panic]
fn test_mismatched_lengths_panic() {
    let dir = RADec::from_degrees(60.0, -27.0);
    let mut cache = UvwMachineCache::new(dir);
    rotate_uvws(&test_uvws(), &[dir], dir, &mut cache);
}
