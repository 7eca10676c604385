//! Fused per-channel and elementwise transforms applied after accumulation.

use crate::error::{ConvError, Result};
use crate::tensor::Blob;

/// Inference-time batch normalization: `(x - mean[c]) / sqrt(var[c] + eps)`.
///
/// Every channel is checked before any value is touched, so a failure leaves
/// `out` unchanged.
pub fn batch_norm(out: &mut Blob, mean: &[f32], var: &[f32], eps: f32) -> Result<()> {
    debug_assert!(mean.len() >= out.d && var.len() >= out.d);
    for (c, v) in var.iter().take(out.d).enumerate() {
        let radicand = v + eps;
        if radicand < 0.0 {
            return Err(ConvError::Numeric { channel: c, value: radicand });
        }
    }
    for c in 0..out.d {
        let m = mean[c];
        let inv_std = 1.0 / (var[c] + eps).sqrt();
        for x in out.channel_mut(c) {
            *x = (*x - m) * inv_std;
        }
    }
    Ok(())
}

/// Per-channel affine transform: `x * scale[c] + bias[c]`.
pub fn scale(out: &mut Blob, scale: &[f32], bias: &[f32]) {
    debug_assert!(scale.len() >= out.d && bias.len() >= out.d);
    for c in 0..out.d {
        let (s, b) = (scale[c], bias[c]);
        for x in out.channel_mut(c) {
            *x = *x * s + b;
        }
    }
}

/// Clamps negatives to zero across the whole blob.
pub fn relu(out: &mut Blob) {
    for x in out.data_mut() {
        *x = x.max(0.0);
    }
}
