// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Some helper mathematics.


use marlu::c64;

/// Round to the nearest integer, with halves rounded away from zero.
///
/// This is *not* the same as [`f64::round`] followed by a cast for values
/// that can't be represented by an `i64`, but gridding never produces those.
/// The truncating cast is deliberate; pixel positions calculated by this
/// function must agree exactly with those of other imagers.
///
/// # Examples
///
/// `assert_eq!(nint(-0.5), -1);`
#[inline]
pub(crate) fn nint(x: f64) -> i64 {
    if x > 0.0 {
        (x + 0.5) as i64
    } else {
        (x - 0.5) as i64
    }
}

/// Complex exponential. The argument is assumed to be purely imaginary.
///
/// This function doesn't actually use complex numbers; it just returns the real
/// and imag components from Euler's formula (i.e. e^{ix} = cos{x} + i sin{x}).
///
/// # Examples
///
/// `assert_abs_diff_eq!(cexp(PI), c64::new(-1.0, 0.0));`
#[inline]
pub(crate) fn cexp(x: f64) -> c64 {
    let (im, re) = x.sin_cos();
    c64::new(re, im)
}

// Coefficients of Schwab's rational approximation to the prolate spheroidal
// wave function (m = 6, alpha = 1). The first row is valid for 0 <= nu < 0.75,
// the second for 0.75 <= nu <= 1.
const SPHEROIDAL_P: [[f64; 5]; 2] = [
    [8.203343e-2, -3.644705e-1, 6.278660e-1, -5.335581e-1, 2.312756e-1],
    [4.028559e-3, -3.697768e-2, 1.021332e-1, -1.201436e-1, 6.412774e-2],
];
const SPHEROIDAL_Q: [[f64; 3]; 2] = [
    [1.0000000e0, 8.212018e-1, 2.078043e-1],
    [1.0000000e0, 9.599102e-1, 2.918724e-1],
];

/// The prolate spheroidal wave function used for gridding, evaluated at `nu`,
/// the offset from the kernel centre as a fraction of the kernel half-width.
/// Zero outside of [0, 1].
pub(crate) fn spheroidal(nu: f64) -> f64 {
    let (part, nu_end) = if (0.0..0.75).contains(&nu) {
        (0, 0.75)
    } else if (0.75..=1.0).contains(&nu) {
        (1, 1.0)
    } else {
        return 0.0;
    };

    let del_nu_sq = nu * nu - nu_end * nu_end;
    let mut top = SPHEROIDAL_P[part][0];
    let mut del_nu_sq_pow = del_nu_sq;
    for p in &SPHEROIDAL_P[part][1..] {
        top += p * del_nu_sq_pow;
        del_nu_sq_pow *= del_nu_sq;
    }
    let mut bot = SPHEROIDAL_Q[part][0];
    let mut del_nu_sq_pow = del_nu_sq;
    for q in &SPHEROIDAL_Q[part][1..] {
        bot += q * del_nu_sq_pow;
        del_nu_sq_pow *= del_nu_sq;
    }

    if bot == 0.0 {
        0.0
    } else {
        top / bot
    }
}
