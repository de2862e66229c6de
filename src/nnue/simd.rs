//! SIMD-optimized kernels for NNUE evaluation.
//!
//! Provides vectorized implementations for:
//! - Accumulator updates (add/subtract i16 vectors)
//! - `SCReLU` activation with dot product
//!
//! Accumulator arithmetic wraps on overflow in every implementation, so an
//! accumulator built move by move matches one rebuilt from scratch bit for bit.
//!
//! Supports:
//! - `x86_64`: `AVX2` (256-bit vectors, 16 i16 at a time)
//! - aarch64: NEON (128-bit vectors, 8 i16 at a time)
//! - Fallback: Scalar operations

use super::network::HIDDEN_SIZE;
use super::QA;

// ============================================================================
// Public API - dispatches to platform-specific implementations
// ============================================================================

/// Add weights to accumulator using SIMD when available.
#[inline]
pub fn add_weights(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    #[cfg(target_arch = "aarch64")]
    {
        // NEON is always available on aarch64
        unsafe { add_weights_neon(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    {
        unsafe { add_weights_avx2(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", not(target_feature = "avx2")))]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { add_weights_avx2(acc, weights) }
        } else {
            add_weights_scalar(acc, weights)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        add_weights_scalar(acc, weights)
    }
}

/// Subtract weights from accumulator using SIMD when available.
#[inline]
pub fn sub_weights(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    #[cfg(target_arch = "aarch64")]
    {
        unsafe { sub_weights_neon(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    {
        unsafe { sub_weights_avx2(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", not(target_feature = "avx2")))]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { sub_weights_avx2(acc, weights) }
        } else {
            sub_weights_scalar(acc, weights)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        sub_weights_scalar(acc, weights)
    }
}

/// Compute `SCReLU` activation and dot product using SIMD when available.
///
/// Returns sum of: `clamp(acc[i], 0, QA)^2 * weights[i]` for i in `0..HIDDEN_SIZE`
#[inline]
#[must_use]
pub fn screlu_dot(acc: &[i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) -> i64 {
    #[cfg(target_arch = "aarch64")]
    {
        unsafe { screlu_dot_neon(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", target_feature = "avx2"))]
    {
        unsafe { screlu_dot_avx2(acc, weights) }
    }

    #[cfg(all(target_arch = "x86_64", not(target_feature = "avx2")))]
    {
        if is_x86_feature_detected!("avx2") {
            unsafe { screlu_dot_avx2(acc, weights) }
        } else {
            screlu_dot_scalar(acc, weights)
        }
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    {
        screlu_dot_scalar(acc, weights)
    }
}

// ============================================================================
// Scalar implementations
// Used on x86_64 without AVX2 and non-SIMD platforms, and as the reference
// the vector kernels are tested against.
// ============================================================================

#[cfg(any(
    test,
    not(any(target_arch = "x86_64", target_arch = "aarch64")),
    all(target_arch = "x86_64", not(target_feature = "avx2"))
))]
#[inline]
fn add_weights_scalar(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    for (a, &w) in acc.iter_mut().zip(weights) {
        *a = a.wrapping_add(w);
    }
}

#[cfg(any(
    test,
    not(any(target_arch = "x86_64", target_arch = "aarch64")),
    all(target_arch = "x86_64", not(target_feature = "avx2"))
))]
#[inline]
fn sub_weights_scalar(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    for (a, &w) in acc.iter_mut().zip(weights) {
        *a = a.wrapping_sub(w);
    }
}

#[cfg(any(
    test,
    not(any(target_arch = "x86_64", target_arch = "aarch64")),
    all(target_arch = "x86_64", not(target_feature = "avx2"))
))]
#[inline]
fn screlu_dot_scalar(acc: &[i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) -> i64 {
    let mut sum = 0i64;
    for (&a, &w) in acc.iter().zip(weights) {
        let clamped = i32::from(a).clamp(0, QA);
        sum += i64::from(clamped * clamped * i32::from(w));
    }
    sum
}

// ============================================================================
// NEON implementations (aarch64 - Apple Silicon, ARM servers)
// ============================================================================

#[cfg(target_arch = "aarch64")]
unsafe fn add_weights_neon(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    use std::arch::aarch64::{vaddq_s16, vld1q_s16, vst1q_s16};

    let acc_ptr = acc.as_mut_ptr();
    let weights_ptr = weights.as_ptr();

    // Process 8 i16 values at a time (128 bits)
    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(weights_ptr.add(i));
        vst1q_s16(acc_ptr.add(i), vaddq_s16(a, w));
    }
}

#[cfg(target_arch = "aarch64")]
unsafe fn sub_weights_neon(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    use std::arch::aarch64::{vld1q_s16, vst1q_s16, vsubq_s16};

    let acc_ptr = acc.as_mut_ptr();
    let weights_ptr = weights.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(weights_ptr.add(i));
        vst1q_s16(acc_ptr.add(i), vsubq_s16(a, w));
    }
}

#[cfg(target_arch = "aarch64")]
unsafe fn screlu_dot_neon(acc: &[i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) -> i64 {
    use std::arch::aarch64::{
        vaddq_s64, vdupq_n_s16, vdupq_n_s64, vget_high_s16, vget_high_s32, vget_low_s16,
        vget_low_s32, vgetq_lane_s64, vld1q_s16, vmaxq_s16, vminq_s16, vmovl_s16, vmovl_s32,
        vmulq_s32,
    };

    let acc_ptr = acc.as_ptr();
    let weights_ptr = weights.as_ptr();

    let zero = vdupq_n_s16(0);
    let qa = vdupq_n_s16(QA as i16);

    // Accumulate in i64 lanes; a single product already needs 31 bits
    let mut sum0 = vdupq_n_s64(0);
    let mut sum1 = vdupq_n_s64(0);

    for i in (0..HIDDEN_SIZE).step_by(8) {
        let a = vld1q_s16(acc_ptr.add(i));
        let w = vld1q_s16(weights_ptr.add(i));

        // Clamp to [0, QA]
        let clamped = vminq_s16(vmaxq_s16(a, zero), qa);

        let clamped_lo = vmovl_s16(vget_low_s16(clamped));
        let clamped_hi = vmovl_s16(vget_high_s16(clamped));

        let sq_lo = vmulq_s32(clamped_lo, clamped_lo);
        let sq_hi = vmulq_s32(clamped_hi, clamped_hi);

        let w_lo = vmovl_s16(vget_low_s16(w));
        let w_hi = vmovl_s16(vget_high_s16(w));

        let prod_lo = vmulq_s32(sq_lo, w_lo);
        let prod_hi = vmulq_s32(sq_hi, w_hi);

        sum0 = vaddq_s64(sum0, vmovl_s32(vget_low_s32(prod_lo)));
        sum0 = vaddq_s64(sum0, vmovl_s32(vget_high_s32(prod_lo)));
        sum1 = vaddq_s64(sum1, vmovl_s32(vget_low_s32(prod_hi)));
        sum1 = vaddq_s64(sum1, vmovl_s32(vget_high_s32(prod_hi)));
    }

    let total = vaddq_s64(sum0, sum1);
    vgetq_lane_s64(total, 0) + vgetq_lane_s64(total, 1)
}

// ============================================================================
// AVX2 implementations (x86_64 only)
// ============================================================================

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn add_weights_avx2(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let weights_ptr = weights.as_ptr();

    // Process 16 i16 values at a time (256 bits)
    for i in (0..HIDDEN_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(weights_ptr.add(i) as *const __m256i);
        _mm256_storeu_si256(acc_ptr.add(i) as *mut __m256i, _mm256_add_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn sub_weights_avx2(acc: &mut [i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_mut_ptr();
    let weights_ptr = weights.as_ptr();

    for i in (0..HIDDEN_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(weights_ptr.add(i) as *const __m256i);
        _mm256_storeu_si256(acc_ptr.add(i) as *mut __m256i, _mm256_sub_epi16(a, w));
    }
}

#[cfg(target_arch = "x86_64")]
#[target_feature(enable = "avx2")]
unsafe fn screlu_dot_avx2(acc: &[i16; HIDDEN_SIZE], weights: &[i16; HIDDEN_SIZE]) -> i64 {
    use std::arch::x86_64::*;

    let acc_ptr = acc.as_ptr();
    let weights_ptr = weights.as_ptr();

    let zero = _mm256_setzero_si256();
    let qa = _mm256_set1_epi16(QA as i16);

    let mut sum_lo = _mm256_setzero_si256();
    let mut sum_hi = _mm256_setzero_si256();

    for i in (0..HIDDEN_SIZE).step_by(16) {
        let a = _mm256_loadu_si256(acc_ptr.add(i) as *const __m256i);
        let w = _mm256_loadu_si256(weights_ptr.add(i) as *const __m256i);

        // Clamp to [0, QA]
        let clamped = _mm256_min_epi16(_mm256_max_epi16(a, zero), qa);

        // Unpack to i32 and square
        let lo = _mm256_unpacklo_epi16(clamped, zero);
        let hi = _mm256_unpackhi_epi16(clamped, zero);
        let sq_lo = _mm256_mullo_epi32(lo, lo);
        let sq_hi = _mm256_mullo_epi32(hi, hi);

        // Sign extend weights to i32
        let sign = _mm256_cmpgt_epi16(zero, w);
        let w_lo = _mm256_unpacklo_epi16(w, sign);
        let w_hi = _mm256_unpackhi_epi16(w, sign);

        let prod_lo = _mm256_mullo_epi32(sq_lo, w_lo);
        let prod_hi = _mm256_mullo_epi32(sq_hi, w_hi);

        // Widen to i64 before accumulating
        let prod_lo_lo = _mm256_cvtepi32_epi64(_mm256_extracti128_si256(prod_lo, 0));
        let prod_lo_hi = _mm256_cvtepi32_epi64(_mm256_extracti128_si256(prod_lo, 1));
        let prod_hi_lo = _mm256_cvtepi32_epi64(_mm256_extracti128_si256(prod_hi, 0));
        let prod_hi_hi = _mm256_cvtepi32_epi64(_mm256_extracti128_si256(prod_hi, 1));

        sum_lo = _mm256_add_epi64(sum_lo, prod_lo_lo);
        sum_lo = _mm256_add_epi64(sum_lo, prod_lo_hi);
        sum_hi = _mm256_add_epi64(sum_hi, prod_hi_lo);
        sum_hi = _mm256_add_epi64(sum_hi, prod_hi_hi);
    }

    let total = _mm256_add_epi64(sum_lo, sum_hi);
    let mut result: [i64; 4] = [0; 4];
    _mm256_storeu_si256(result.as_mut_ptr() as *mut __m256i, total);

    result.iter().sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterned(seed: i32, modulo: i32, shift: i32) -> [i16; HIDDEN_SIZE] {
        std::array::from_fn(|i| ((i as i32 * seed) % modulo - shift) as i16)
    }

    #[test]
    fn test_add_weights() {
        let mut acc = [100i16; HIDDEN_SIZE];
        let weights = [50i16; HIDDEN_SIZE];

        add_weights(&mut acc, &weights);

        assert!(acc.iter().all(|&v| v == 150));
    }

    #[test]
    fn test_sub_weights() {
        let mut acc = [100i16; HIDDEN_SIZE];
        let weights = [30i16; HIDDEN_SIZE];

        sub_weights(&mut acc, &weights);

        assert!(acc.iter().all(|&v| v == 70));
    }

    #[test]
    fn test_add_weights_wraps() {
        let mut acc = [i16::MAX - 10; HIDDEN_SIZE];
        let weights = [20i16; HIDDEN_SIZE];

        add_weights(&mut acc, &weights);
        assert!(acc.iter().all(|&v| v == i16::MIN + 9));

        // Wrapping is undone exactly by the matching subtraction
        sub_weights(&mut acc, &weights);
        assert!(acc.iter().all(|&v| v == i16::MAX - 10));
    }

    #[test]
    fn test_updates_match_scalar() {
        let weights = patterned(7919, 4001, 2000);
        let mut simd_acc = patterned(31, 600, 300);
        let mut scalar_acc = simd_acc;

        add_weights(&mut simd_acc, &weights);
        add_weights_scalar(&mut scalar_acc, &weights);
        assert_eq!(simd_acc, scalar_acc);

        sub_weights(&mut simd_acc, &weights);
        sub_weights_scalar(&mut scalar_acc, &weights);
        assert_eq!(simd_acc, scalar_acc);
    }

    #[test]
    fn test_screlu_dot_matches_scalar() {
        let acc = patterned(1, 300, 50);
        let weights = patterned(1, 200, 100);

        let scalar_result = screlu_dot_scalar(&acc, &weights);
        let simd_result = screlu_dot(&acc, &weights);

        assert_eq!(
            scalar_result, simd_result,
            "SIMD result {simd_result} doesn't match scalar {scalar_result}"
        );
    }

    #[test]
    fn test_screlu_dot_extremes_do_not_overflow() {
        let acc = [i16::MAX; HIDDEN_SIZE];
        let weights = [i16::MAX; HIDDEN_SIZE];
        let expected = i64::from(QA * QA) * i64::from(i16::MAX) * HIDDEN_SIZE as i64;

        assert_eq!(screlu_dot(&acc, &weights), expected);
        assert_eq!(screlu_dot(&[i16::MIN; HIDDEN_SIZE], &weights), 0);
    }
}
