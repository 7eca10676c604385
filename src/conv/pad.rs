use crate::tensor::Blob;

/// Returns a zero-bordered copy of `input`, `amount` cells wide on every
/// spatial side. Depth is unchanged.
pub fn pad(input: &Blob, amount: usize) -> Blob {
    let mut padded = Blob::zeros(input.d, input.h + 2 * amount, input.w + 2 * amount);
    for z in 0..input.d {
        for y in 0..input.h {
            let dst = padded.row_start(z, y + amount) + amount;
            padded.data_mut()[dst..dst + input.w].copy_from_slice(input.row(z, y));
        }
    }
    padded
}
