// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use criterion::*;
use ndarray::prelude::*;

use mwa_hypergrid::{c32, Axes, GridderParams, ImageShape, RADec, VisBuffer, VisChunk, UVW};

const NUM_PIXELS: usize = 256;
const NUM_ROWS: usize = 2000;
const NUM_CHANS: usize = 16;

fn axes() -> Axes {
    // 1 arcminute pixels.
    Axes::from_image_centre(
        RADec::from_degrees(0.0, -27.0),
        (1.0_f64 / 60.0).to_radians(),
        [NUM_PIXELS, NUM_PIXELS],
    )
}

fn chunk() -> VisBuffer {
    // Baselines on a spiral out to ~800 m.
    let uvws = (0..NUM_ROWS)
        .map(|i| {
            let r = 800.0 * i as f64 / NUM_ROWS as f64;
            let theta = 0.1 * i as f64;
            UVW {
                u: r * theta.cos(),
                v: r * theta.sin(),
                w: 0.0,
            }
        })
        .collect();
    let freqs: Vec<f64> = (0..NUM_CHANS)
        .map(|i| 150e6 + 40e3 * i as f64)
        .collect();
    let mut chunk = VisBuffer::zeros(uvws, RADec::from_degrees(0.0, -27.0), &freqs, 4).unwrap();
    chunk
        .vis_mut()
        .indexed_iter_mut()
        .for_each(|((row, chan, pol), v)| {
            *v = c32::new(1.0 + pol as f32, (row % 7) as f32 - 0.1 * chan as f32)
        });
    chunk
}

fn gridding(c: &mut Criterion) {
    let axes = axes();
    let shape = ImageShape::new(NUM_PIXELS, NUM_PIXELS, 1, 1);
    let params = GridderParams {
        padding: 1.2,
        ..Default::default()
    };
    let chunk = chunk();

    c.bench_function("grid 2000 rows x 16 chans", |b| {
        let mut gridder = params.build().unwrap();
        gridder.initialise_grid(&axes, shape, false).unwrap();
        b.iter(|| gridder.grid(&chunk).unwrap())
    });

    c.bench_function("degrid 2000 rows x 16 chans", |b| {
        let mut model = Array4::<f64>::zeros((1, 1, NUM_PIXELS, NUM_PIXELS));
        model[(0, 0, NUM_PIXELS / 2, NUM_PIXELS / 2 + 10)] = 1.0;
        let mut gridder = params.build().unwrap();
        gridder.initialise_degrid(&axes, model.view()).unwrap();
        let mut chunk = chunk.clone();
        b.iter(|| gridder.degrid(&mut chunk).unwrap())
    });

    c.bench_function("finalise 256x256 grid", |b| {
        let mut gridder = params.build().unwrap();
        gridder.initialise_grid(&axes, shape, false).unwrap();
        gridder.grid(&chunk).unwrap();
        b.iter(|| gridder.finalise_grid().unwrap())
    });
}

criterion_group!(
    name = benches;
    config = Criterion::default().sample_size(10);
    targets = gridding
);
criterion_main!(benches);
