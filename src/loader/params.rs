use std::io::{ErrorKind, Read};

use crate::config::ConvParams;
use crate::conv::GroupLayout;
use crate::error::{ConvError, LoadFailure, Result};
use crate::tensor::Blob;

use super::source::ParamSource;

/// Fills `dst` with little-endian `f32`s from `reader`, stopping early at end
/// of stream. Returns how many floats were read completely. `scratch` is
/// resized to fit and can be reused across calls.
fn read_floats(reader: &mut dyn Read, dst: &mut [f32], scratch: &mut Vec<u8>) -> std::io::Result<usize> {
    scratch.resize(dst.len() * 4, 0);
    let buf = scratch.as_mut_slice();
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    let count = filled / 4;
    for (val, bytes) in dst.iter_mut().zip(buf[..count * 4].chunks_exact(4)) {
        *val = f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }
    Ok(count)
}

/// Reads exactly `count` floats from the source `id`.
pub fn load_vector(source: &dyn ParamSource, id: &str, count: usize) -> Result<Vec<f32>> {
    let mut reader = source.open(id)?;
    let mut values = vec![0.0f32; count];
    let found = read_floats(&mut reader, &mut values, &mut Vec::new()).map_err(|e| ConvError::io(id, e))?;
    if found != count {
        return Err(ConvError::load(id, LoadFailure::ShortRead { expected: count, found }));
    }
    Ok(values)
}

/// Loads the weights for a layer applied to `input` (already padded).
///
/// Returns a `(num_out, in_channels / group, ky * kx)` blob. The source is
/// read group-major, then output channel, then input channel within the
/// group, then the kernel window row by row; each window lands at the
/// group-relative depth of its input channel.
pub fn load_weights(source: &dyn ParamSource, input: &Blob, params: &ConvParams) -> Result<Blob> {
    if params.group == 0 || input.d % params.group != 0 || params.num_out % params.group != 0 {
        return Err(ConvError::InvalidShape(format!(
            "{} input / {} output channels not divisible into {} groups",
            input.d, params.num_out, params.group
        )));
    }

    let (ky, kx) = params.kernel_size(input.h, input.w);
    let window = ky * kx;
    let layout = GroupLayout::new(input.d, params.num_out, params.group);
    let expected = params.num_out * layout.in_per_group * window;

    let mut reader = source.open(&params.weights)?;
    let mut weights = Blob::alloc(params.num_out, layout.in_per_group, window);
    let mut loaded = 0usize;
    let mut scratch = Vec::with_capacity(window * 4);

    for g in 0..layout.group {
        for oc in layout.out_range(g) {
            for ic in layout.in_range(g) {
                let (_, rel) = layout.locate(ic);
                let start = weights.row_start(oc, rel);
                let dst = &mut weights.data_mut()[start..start + window];
                let found = read_floats(&mut reader, dst, &mut scratch)
                    .map_err(|e| ConvError::io(&params.weights, e))?;
                loaded += found;
                if found != window {
                    return Err(ConvError::load(
                        &params.weights,
                        LoadFailure::ShortRead { expected, found: loaded },
                    ));
                }
            }
        }
    }

    log::trace!("loaded {} weights from `{}` into {}", loaded, params.weights, weights);
    Ok(weights)
}
