//! One convolution layer with bias, batch-norm, scale and ReLU, read from
//! parameter files on disk.
//!
//! Run with: `cargo run --example conv_layer`

use std::fs::File;
use std::io::Write;
use std::path::Path;

use microconv::metrics::benchmark::{print_report, run_benchmark};
use microconv::{Blob, ConvLayer, ConvParams, FileSource};

fn write_floats(dir: &Path, name: &str, values: &[f32]) -> std::io::Result<()> {
    let mut file = File::create(dir.join(name))?;
    for v in values {
        file.write_all(&v.to_le_bytes())?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;

    // 4 input channels in 2 groups, 6 output channels, 3x3 kernel
    let weights: Vec<f32> = (0..6 * 2 * 9).map(|i| ((i as f32) * 0.21).cos() * 0.3).collect();
    write_floats(dir.path(), "conv_w.bin", &weights)?;
    write_floats(dir.path(), "conv_b.bin", &[0.1, -0.1, 0.2, -0.2, 0.0, 0.05])?;
    write_floats(dir.path(), "bn_mean.bin", &[0.0, 0.1, -0.1, 0.2, 0.0, 0.0])?;
    write_floats(dir.path(), "bn_var.bin", &[1.0, 0.5, 2.0, 1.5, 1.0, 0.8])?;
    write_floats(dir.path(), "scale.bin", &[1.0, 1.2, 0.8, 1.0, 0.9, 1.1])?;
    write_floats(dir.path(), "scale_bias.bin", &[0.0; 6])?;

    let params = ConvParams::new(6, 3, 3, "conv_w.bin")
        .with_pad(1)
        .with_group(2)
        .with_bias("conv_b.bin")
        .with_batch_norm("bn_mean.bin", "bn_var.bin", 1e-5)
        .with_scale("scale.bin", "scale_bias.bin")
        .with_relu();
    let source = FileSource::new(dir.path());

    let data: Vec<f32> = (0..4 * 8 * 8).map(|i| ((i as f32) * 0.05).sin()).collect();
    let input = Blob::from_vec(4, 8, 8, data)?;

    println!("Running layer on input {}...", input);
    let out = ConvLayer::new(params.clone()).forward(input.clone(), &source)?;
    println!("Output {}", out);
    for c in 0..out.d {
        let ch = out.channel(c);
        let mean = ch.iter().sum::<f32>() / ch.len() as f32;
        println!("  channel {}: mean {:.4}, max {:.4}", c, mean, ch.iter().cloned().fold(0.0f32, f32::max));
    }

    let result = run_benchmark(&params, &input, &source, 20)?;
    print_report(&result);
    Ok(())
}
