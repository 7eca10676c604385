/// Convolution kernels and the helpers they share.
///
/// Provides the general grouped/strided kernel, a fast path for kernels that
/// cover the whole input, zero padding, and the group-relative channel layout.

mod collapsed;
mod direct;
mod group;
mod pad;
pub mod simd;

pub use collapsed::{collapsible, conv2d_collapsed};
pub use direct::conv2d_direct;
pub use group::GroupLayout;
pub use pad::pad;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::tensor::Blob;

/// Selects which accumulation loop a layer runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConvAlgorithm {
    /// Collapsed fast path when the shapes allow it, direct otherwise.
    #[default]
    Auto,
    /// Always the general grouped/strided loop.
    Direct,
}

/// The loop that actually ran.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelPath {
    Direct,
    Collapsed,
}

/// Dispatch convolution to the selected algorithm.
///
/// `input` must already be padded; `output` holds its initial values.
pub fn conv2d(
    algorithm: ConvAlgorithm,
    input: &Blob,
    weights: &Blob,
    layout: GroupLayout,
    ky: usize,
    kx: usize,
    sy: usize,
    sx: usize,
    output: &mut Blob,
) -> KernelPath {
    match algorithm {
        ConvAlgorithm::Auto if collapsible(input, ky, kx, output) => {
            conv2d_collapsed(input, weights, layout, output);
            KernelPath::Collapsed
        }
        _ => {
            conv2d_direct(input, weights, layout, ky, kx, sy, sx, output);
            KernelPath::Direct
        }
    }
}

/// Runs `f(channel, plane)` over every depth slice of `output`, one task per
/// slice when the `parallel` feature is on.
pub(crate) fn for_each_plane<F>(output: &mut Blob, f: F)
where
    F: Fn(usize, &mut [f32]) + Send + Sync,
{
    let plane = output.plane();
    if plane == 0 {
        return;
    }

    #[cfg(feature = "parallel")]
    output
        .data_mut()
        .par_chunks_mut(plane)
        .enumerate()
        .for_each(|(oc, p)| f(oc, p));

    #[cfg(not(feature = "parallel"))]
    output
        .data_mut()
        .chunks_mut(plane)
        .enumerate()
        .for_each(|(oc, p)| f(oc, p));
}
