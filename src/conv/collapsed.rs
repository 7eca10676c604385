use crate::tensor::Blob;

use super::group::GroupLayout;
use super::{for_each_plane, simd};

/// Whether the kernel window covers the whole input so every output channel
/// collapses to a single cell.
///
/// In that case each group's input channels are one contiguous run of
/// `in_per_group * ky * kx` floats, laid out exactly like the matching row of
/// the weight blob, and the accumulation reduces to one dot product per
/// output channel.
pub fn collapsible(input: &Blob, ky: usize, kx: usize, output: &Blob) -> bool {
    output.h == 1 && output.w == 1 && ky == input.h && kx == input.w
}

/// Fast path for [`collapsible`] shapes. Same sum as the direct kernel, in the
/// same `(ic, ky, kx)` order, up to rounding of the final add.
pub fn conv2d_collapsed(input: &Blob, weights: &Blob, layout: GroupLayout, output: &mut Blob) {
    let span = layout.in_per_group * input.plane();
    debug_assert_eq!(weights.plane(), span);

    for_each_plane(output, |oc, plane| {
        let g = layout.group_of_output(oc);
        let start = layout.in_range(g).start * input.plane();
        plane[0] += simd::dot_f32(&input.data()[start..start + span], weights.channel(oc));
    });
}
