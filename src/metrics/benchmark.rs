use std::time::{Duration, Instant};

use crate::config::ConvParams;
use crate::conv::{ConvAlgorithm, KernelPath};
use crate::error::Result;
use crate::layer::ConvLayer;
use crate::loader::ParamSource;
use crate::tensor::Blob;

/// Timing and agreement of the direct loop against automatic selection.
pub struct BenchmarkResult {
    pub iterations: usize,
    pub direct_time: Duration,
    pub auto_time: Duration,
    /// Loop that `ConvAlgorithm::Auto` picked for this shape.
    pub auto_path: KernelPath,
    /// Largest elementwise difference between the two outputs.
    pub max_abs_diff: f32,
    pub output_shape: (usize, usize, usize),
}

fn max_abs_diff(a: &Blob, b: &Blob) -> f32 {
    a.data()
        .iter()
        .zip(b.data())
        .map(|(x, y)| (x - y).abs())
        .fold(0.0f32, f32::max)
}

fn time_layer(layer: &ConvLayer, input: &Blob, source: &dyn ParamSource, iterations: usize) -> Result<(Blob, KernelPath, Duration)> {
    let start = Instant::now();
    let (mut out, mut path) = layer.forward_with_path(input.clone(), source)?;
    if iterations == 1 {
        return Ok((out, path, start.elapsed()));
    }

    let mut total = Duration::ZERO;
    for _ in 1..iterations {
        let start = Instant::now();
        let (o, p) = layer.forward_with_path(input.clone(), source)?;
        total += start.elapsed();
        out = o;
        path = p;
    }
    Ok((out, path, total / (iterations - 1) as u32))
}

/// Runs `params` on `input` with both kernel selections, `iterations` times
/// each (at least once). With more than one iteration the first run is a
/// warm-up and is not timed; a single run is timed as is.
pub fn run_benchmark(
    params: &ConvParams,
    input: &Blob,
    source: &dyn ParamSource,
    iterations: usize,
) -> Result<BenchmarkResult> {
    let iterations = iterations.max(1);
    let direct = ConvLayer::with_algorithm(params.clone(), ConvAlgorithm::Direct);
    let auto = ConvLayer::with_algorithm(params.clone(), ConvAlgorithm::Auto);

    let (direct_out, _, direct_time) = time_layer(&direct, input, source, iterations)?;
    let (auto_out, auto_path, auto_time) = time_layer(&auto, input, source, iterations)?;

    Ok(BenchmarkResult {
        iterations,
        direct_time,
        auto_time,
        auto_path,
        max_abs_diff: max_abs_diff(&direct_out, &auto_out),
        output_shape: direct_out.shape(),
    })
}

/// Print a formatted benchmark report to stdout.
pub fn print_report(result: &BenchmarkResult) {
    let direct_ms = result.direct_time.as_micros() as f64 / 1000.0;
    let auto_ms = result.auto_time.as_micros() as f64 / 1000.0;
    let speedup = if auto_ms > 0.001 { direct_ms / auto_ms } else { 0.0 };
    let (d, h, w) = result.output_shape;

    println!("\n=== Kernel Benchmark ({} iterations, output {}x{}x{}) ===", result.iterations, d, h, w);
    println!("{:<10} {:>10}", "Path", "Mean Time");
    println!("{:<10} {:>8.3}ms", "Direct", direct_ms);
    println!("{:<10} {:>8.3}ms    ({:?}, speedup {:.2}x)", "Auto", auto_ms, result.auto_path, speedup);
    println!("Max abs diff: {:.3e}", result.max_abs_diff);
}
