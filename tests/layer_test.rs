use microconv::{convolution, Blob, ConvError, ConvLayer, ConvParams, LoadFailure, MemorySource};

fn ones_source(weights: usize) -> MemorySource {
    MemorySource::new().with_floats("w", &vec![1.0; weights])
}

#[test]
fn all_ones_3x3_sums_to_nine() {
    let params = ConvParams::new(1, 3, 3, "w");
    let out = convolution(Blob::filled(1, 3, 3, 1.0), &params, &ones_source(9)).unwrap();
    assert_eq!(out.shape(), (1, 1, 1));
    assert_eq!(out.data(), &[9.0]);
}

#[test]
fn bias_then_relu_clamps() {
    let source = ones_source(9).with_floats("b", &[-10.0]);
    let params = ConvParams::new(1, 3, 3, "w").with_bias("b").with_relu();
    let out = convolution(Blob::filled(1, 3, 3, 1.0), &params, &source).unwrap();
    assert_eq!(out.data(), &[0.0]);
}

#[test]
fn bias_initializes_every_position() {
    let source = MemorySource::new()
        .with_floats("w", &[0.0; 2 * 4])
        .with_floats("b", &[1.5, -2.0]);
    let params = ConvParams::new(2, 2, 2, "w").with_bias("b");
    let out = convolution(Blob::filled(1, 4, 4, 3.0), &params, &source).unwrap();
    assert_eq!(out.shape(), (2, 3, 3));
    assert!(out.channel(0).iter().all(|&v| v == 1.5));
    assert!(out.channel(1).iter().all(|&v| v == -2.0));
}

#[test]
fn shape_law_with_padding_and_stride() {
    for &(h, w, ky, kx, sy, sx, pad) in &[
        (7usize, 9usize, 3usize, 3usize, 1usize, 1usize, 1usize),
        (8, 8, 5, 3, 2, 2, 0),
        (5, 6, 2, 4, 3, 1, 2),
        (10, 4, 4, 1, 3, 2, 1),
    ] {
        let params = ConvParams::new(3, ky, kx, "w").with_stride(sy, sx).with_pad(pad);
        let source = ones_source(3 * 2 * ky * kx);
        let out = convolution(Blob::filled(2, h, w, 1.0), &params, &source).unwrap();
        assert_eq!(
            out.shape(),
            (3, (h + 2 * pad - ky) / sy + 1, (w + 2 * pad - kx) / sx + 1),
            "h={} w={} k={}x{} s={}x{} pad={}",
            h, w, ky, kx, sy, sx, pad
        );
    }
}

#[test]
fn fully_connected_output_is_single_cell() {
    let source = MemorySource::new().with_floats("w", &[1.0; 4 * 3 * 5 * 6]);
    // configured kernel is ignored
    let params = ConvParams::new(4, 2, 2, "w").fully_connected();
    let out = convolution(Blob::filled(3, 5, 6, 0.5), &params, &source).unwrap();
    assert_eq!(out.shape(), (4, 1, 1));
    for &v in out.data() {
        assert!((v - 45.0).abs() < 1e-4);
    }
}

#[test]
fn fully_connected_with_pad_covers_border() {
    let source = ones_source(16);
    let params = ConvParams::new(1, 1, 1, "w").fully_connected().with_pad(1);
    let out = convolution(Blob::filled(1, 2, 2, 2.0), &params, &source).unwrap();
    assert_eq!(out.shape(), (1, 1, 1));
    assert_eq!(out.data(), &[8.0]);
}

#[test]
fn missing_weights_is_parameter_load_error() {
    let params = ConvParams::new(1, 3, 3, "w");
    let err = convolution(Blob::filled(1, 3, 3, 1.0), &params, &MemorySource::new()).unwrap_err();
    assert!(matches!(err, ConvError::ParameterLoad { .. }));
}

#[test]
fn short_weights_is_parameter_load_error() {
    let params = ConvParams::new(2, 3, 3, "w");
    let err = convolution(Blob::filled(1, 3, 3, 1.0), &params, &ones_source(9)).unwrap_err();
    assert!(matches!(
        err,
        ConvError::ParameterLoad { reason: LoadFailure::ShortRead { expected: 18, found: 9 }, .. }
    ));
}

#[test]
fn missing_bias_source_fails() {
    let params = ConvParams::new(1, 3, 3, "w").with_bias("b");
    let err = convolution(Blob::filled(1, 3, 3, 1.0), &params, &ones_source(9)).unwrap_err();
    assert!(matches!(err, ConvError::ParameterLoad { ref source_id, .. } if source_id == "b"));
}

#[test]
fn shape_errors_precede_loading() {
    // no sources at all: a shape problem must still be reported as such
    let empty = MemorySource::new();
    let cases = [
        ConvParams::new(1, 4, 4, "w"),
        ConvParams::new(3, 1, 1, "w").with_group(2),
        ConvParams::new(2, 1, 1, "w").with_stride(0, 1),
        ConvParams::new(2, 1, 1, "w").with_group(0),
    ];
    for params in cases {
        let err = convolution(Blob::filled(2, 3, 3, 1.0), &params, &empty).unwrap_err();
        assert!(matches!(err, ConvError::InvalidShape(_)), "{:?} -> {:?}", params, err);
    }
}

#[test]
fn oversized_padding_is_invalid_shape() {
    let empty = MemorySource::new();
    let doubled_pad_overflows =
        ConvParams::from_json(r#"{"num_out": 1, "pad": 9223372036854775808, "weights": "w"}"#).unwrap();
    let padded_blob_too_large = ConvParams::new(1, 1, 1, "w").with_pad(1 << 31);
    for params in [doubled_pad_overflows, padded_blob_too_large] {
        assert!(matches!(params.validate((1, 2, 2)), Err(ConvError::InvalidShape(_))));
        let err = convolution(Blob::filled(1, 2, 2, 1.0), &params, &empty).unwrap_err();
        assert!(matches!(err, ConvError::InvalidShape(_)), "pad {} -> {:?}", params.pad, err);
    }
}

#[test]
fn negative_variance_is_numeric_error() {
    let source = ones_source(9)
        .with_floats("m", &[0.0])
        .with_floats("v", &[-1.0]);
    let params = ConvParams::new(1, 3, 3, "w").with_batch_norm("m", "v", 0.5);
    let err = convolution(Blob::filled(1, 3, 3, 1.0), &params, &source).unwrap_err();
    assert!(matches!(err, ConvError::Numeric { channel: 0, .. }));
}

#[test]
fn json_configured_layer() {
    let source = ones_source(9).with_floats("b", &[1.0]);
    let params = ConvParams::from_json(r#"{"ky": 3, "kx": 3, "num_out": 1, "weights": "w", "bias": "b"}"#).unwrap();
    let out = ConvLayer::new(params).forward(Blob::filled(1, 3, 3, 1.0), &source).unwrap();
    assert_eq!(out.data(), &[10.0]);
}
