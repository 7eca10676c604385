/// SIMD micro-kernels with NEON acceleration and scalar fallbacks.

// ── FP32 AXPY: c[..len] += a_val * b[..len] ──

#[cfg(all(target_arch = "aarch64", feature = "simd"))]
pub fn axpy_f32(c: &mut [f32], b: &[f32], a_val: f32) {
    use core::arch::aarch64::*;
    let len = c.len().min(b.len());
    let mut j = 0usize;
    unsafe {
        let a_vec = vdupq_n_f32(a_val);
        while j + 4 <= len {
            let b_vec = vld1q_f32(b.as_ptr().add(j));
            let c_vec = vld1q_f32(c.as_ptr().add(j));
            let r = vfmaq_f32(c_vec, a_vec, b_vec);
            vst1q_f32(c.as_mut_ptr().add(j), r);
            j += 4;
        }
    }
    // scalar tail
    while j < len {
        c[j] += a_val * b[j];
        j += 1;
    }
}

#[cfg(not(all(target_arch = "aarch64", feature = "simd")))]
pub fn axpy_f32(c: &mut [f32], b: &[f32], a_val: f32) {
    for (cv, bv) in c.iter_mut().zip(b) {
        *cv += a_val * bv;
    }
}

// ── FP32 dot product: sum(a[..len] * b[..len]) ──
//
// The NEON path sums four lanes independently, so results can differ from the
// scalar path in the last bits.

#[cfg(all(target_arch = "aarch64", feature = "simd"))]
pub fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    use core::arch::aarch64::*;
    let len = a.len().min(b.len());
    let mut j = 0usize;
    let mut sum;
    unsafe {
        let mut acc = vdupq_n_f32(0.0);
        while j + 4 <= len {
            let va = vld1q_f32(a.as_ptr().add(j));
            let vb = vld1q_f32(b.as_ptr().add(j));
            acc = vfmaq_f32(acc, va, vb);
            j += 4;
        }
        sum = vaddvq_f32(acc);
    }
    while j < len {
        sum += a[j] * b[j];
        j += 1;
    }
    sum
}

#[cfg(not(all(target_arch = "aarch64", feature = "simd")))]
pub fn dot_f32(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}
