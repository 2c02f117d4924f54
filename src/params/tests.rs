// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::io::Write;

use indoc::indoc;
use tempfile::Builder;

use super::*;

#[test]
fn test_defaults() {
    let params = GridderParams::from_toml_str("").unwrap();
    assert_eq!(params, GridderParams::default());
    assert_eq!(params.kernel, ConvFuncKind::Spheroidal);
    assert_eq!(params.support, DEFAULT_SUPPORT);
    assert_eq!(params.oversample, DEFAULT_OVERSAMPLE);
    assert!(params.validate().is_ok());
}

#[test]
fn test_parse_toml() {
    let params = GridderParams::from_toml_str(indoc! {r#"
        kernel = "box"
        support = 5
        oversample = 16
        padding = 1.5
        all_data_psf = true
    "#})
    .unwrap();
    assert_eq!(
        params,
        GridderParams {
            kernel: ConvFuncKind::Box,
            support: 5,
            oversample: 16,
            padding: 1.5,
            all_data_psf: true,
            square_pixels: false,
        }
    );
}

#[test]
fn test_parse_rejects_nonsense() {
    assert!(matches!(
        GridderParams::from_toml_str(r#"kernel = "gaussian""#),
        Err(ParamsError::Toml(_))
    ));
    assert!(matches!(
        GridderParams::from_toml_str("supprt = 3"),
        Err(ParamsError::Toml(_))
    ));
    assert!(matches!(
        GridderParams::from_toml_str("support = -3"),
        Err(ParamsError::Toml(_))
    ));
}

#[test]
fn test_validate() {
    let params = GridderParams {
        oversample: 0,
        ..Default::default()
    };
    assert!(matches!(
        params.validate(),
        Err(ParamsError::Invalid {
            param: "oversample",
            ..
        })
    ));

    let params = GridderParams {
        padding: 0.9,
        ..Default::default()
    };
    assert!(matches!(
        params.validate(),
        Err(ParamsError::Invalid {
            param: "padding",
            ..
        })
    ));

    let params = GridderParams {
        support: 0,
        ..Default::default()
    };
    let err = params.validate().unwrap_err();
    assert!(err.to_string().contains("spheroidal"));
    assert!(matches!(params.build(), Err(ParamsError::Invalid { .. })));

    // The box kernel doesn't care about support.
    let params = GridderParams {
        kernel: ConvFuncKind::Box,
        support: 0,
        ..Default::default()
    };
    assert!(params.validate().is_ok());
}

#[test]
fn test_build() {
    let gridder = GridderParams::default().build().unwrap();
    assert_eq!(gridder.conv_func().kind(), ConvFuncKind::Spheroidal);
    assert_eq!(gridder.conv_func().support(), DEFAULT_SUPPORT);
    assert_eq!(gridder.conv_func().oversample(), DEFAULT_OVERSAMPLE);

    let params = GridderParams {
        kernel: ConvFuncKind::Box,
        padding: 2.0,
        ..Default::default()
    };
    let gridder = params.build().unwrap();
    assert_eq!(gridder.conv_func().kind(), ConvFuncKind::Box);
    assert_eq!(gridder.conv_func().oversample(), 1);
    assert_eq!(gridder.padding(), 2.0);
}

#[test]
fn test_read_file() {
    let mut file = Builder::new().suffix(".toml").tempfile().unwrap();
    writeln!(file, "kernel = \"box\"").unwrap();
    writeln!(file, "padding = 1.25").unwrap();
    file.flush().unwrap();

    let params = GridderParams::read_file(file.path()).unwrap();
    assert_eq!(params.kernel, ConvFuncKind::Box);
    assert_eq!(params.padding, 1.25);
    assert_eq!(params.support, DEFAULT_SUPPORT);
}

#[test]
fn test_read_file_errors() {
    let file = Builder::new().suffix(".yaml").tempfile().unwrap();
    let result = GridderParams::read_file(file.path());
    match result {
        Err(ParamsError::UnknownFileType { valid, .. }) => assert_eq!(valid, "toml"),
        _ => panic!("Expected an unknown file type error"),
    }

    let mut file = Builder::new().suffix(".TOML").tempfile().unwrap();
    writeln!(file, "padding = [1.0]").unwrap();
    file.flush().unwrap();
    assert!(matches!(
        GridderParams::read_file(file.path()),
        Err(ParamsError::BadFile { .. })
    ));

    assert!(matches!(
        GridderParams::read_file("/does/not/exist.toml"),
        Err(ParamsError::IO(_))
    ));
}
