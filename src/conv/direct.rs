use crate::tensor::Blob;

use super::group::GroupLayout;
use super::{for_each_plane, simd};

/// General grouped, strided cross-correlation.
///
/// `weights` is `(num_out, in_per_group, ky * kx)` with group-relative input
/// channels. `output` must already hold its initial values (zeros or bias);
/// products are accumulated into it. Each output cell sums over
/// `(ic, ky, kx)` in that order, so results do not depend on how planes are
/// scheduled.
pub fn conv2d_direct(
    input: &Blob,
    weights: &Blob,
    layout: GroupLayout,
    ky: usize,
    kx: usize,
    sy: usize,
    sx: usize,
    output: &mut Blob,
) {
    let out_h = output.h;
    let out_w = output.w;

    for_each_plane(output, |oc, plane| {
        let g = layout.group_of_output(oc);
        for ic in layout.in_range(g) {
            let (_, rel) = layout.locate(ic);
            let kernel = weights.row(oc, rel);
            for oy in 0..out_h {
                let out_row = &mut plane[oy * out_w..(oy + 1) * out_w];
                for ky_i in 0..ky {
                    let in_row = input.row(ic, oy * sy + ky_i);
                    for kx_i in 0..kx {
                        let wv = kernel[ky_i * kx + kx_i];
                        if sx == 1 {
                            simd::axpy_f32(out_row, &in_row[kx_i..kx_i + out_w], wv);
                        } else {
                            for (ox, cell) in out_row.iter_mut().enumerate() {
                                *cell += in_row[ox * sx + kx_i] * wv;
                            }
                        }
                    }
                }
            }
        }
    });
}
