//! NNUE network parameters and the forward pass.
//!
//! Implements a 768 -> 768 -> 1 architecture with:
//! - Dual perspective accumulators (white/black view)
//! - `SCReLU` activation
//! - Separate output weight segments for the side to move and its opponent
//!
//! The parameter blob is a headerless little-endian record:
//! `[feature_weights: 768 x 768][hidden_bias: 768][output_weights: 2 x 768][output_bias: 1]`,
//! all `i16`.

use std::fs;
use std::path::Path;

use log::info;

use super::accumulator::Accumulator;
use super::simd;
use super::{QA, QB, SCALE};
use crate::error::LoadError;

/// Input feature size: 64 squares × 6 piece types × 2 colors
pub const INPUT_SIZE: usize = 768;

/// Hidden layer size (must match trained network)
pub const HIDDEN_SIZE: usize = 768;

/// Number of `i16` values in a parameter blob
const PARAMS_LEN: usize = INPUT_SIZE * HIDDEN_SIZE + HIDDEN_SIZE + 2 * HIDDEN_SIZE + 1;

/// Size in bytes of a parameter blob
pub const PARAMS_BYTES: usize = PARAMS_LEN * 2;

/// One hidden-layer-wide vector of `i16`, aligned for vector loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(C, align(64))]
pub struct HiddenVector(pub [i16; HIDDEN_SIZE]);

impl HiddenVector {
    pub const ZERO: HiddenVector = HiddenVector([0; HIDDEN_SIZE]);
}

/// Quantized weights of one network.
#[derive(Clone)]
pub struct NetworkParams {
    /// Feature transformer weights, one row per input feature
    pub feature_weights: Box<[HiddenVector]>,
    /// Feature transformer biases
    pub hidden_bias: HiddenVector,
    /// Output weights: `[0]` for the side to move, `[1]` for the opponent
    pub output_weights: [HiddenVector; 2],
    /// Output bias
    pub output_bias: i16,
}

impl NetworkParams {
    /// All-zero parameters.
    #[must_use]
    pub fn zeroed() -> Self {
        NetworkParams {
            feature_weights: vec![HiddenVector::ZERO; INPUT_SIZE].into_boxed_slice(),
            hidden_bias: HiddenVector::ZERO,
            output_weights: [HiddenVector::ZERO; 2],
            output_bias: 0,
        }
    }

    /// Decode a parameter blob.
    ///
    /// Bytes past the end of the record are ignored, which tolerates blobs
    /// padded to the alignment of the structure they were dumped from.
    pub fn from_bytes(data: &[u8]) -> Result<Self, LoadError> {
        if data.len() < PARAMS_BYTES {
            return Err(LoadError::Truncated {
                expected: PARAMS_BYTES,
                found: data.len(),
            });
        }

        let mut values = data[..PARAMS_BYTES]
            .chunks_exact(2)
            .map(|b| i16::from_le_bytes([b[0], b[1]]));
        let mut fill = |dst: &mut [i16]| {
            for (slot, value) in dst.iter_mut().zip(&mut values) {
                *slot = value;
            }
        };

        let mut params = Self::zeroed();
        for row in params.feature_weights.iter_mut() {
            fill(&mut row.0);
        }
        fill(&mut params.hidden_bias.0);
        for segment in &mut params.output_weights {
            fill(&mut segment.0);
        }
        let mut bias = [0i16; 1];
        fill(&mut bias);
        params.output_bias = bias[0];

        Ok(params)
    }

    /// Encode into the blob layout accepted by [`NetworkParams::from_bytes`].
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(PARAMS_BYTES);
        let vectors = self
            .feature_weights
            .iter()
            .chain(std::iter::once(&self.hidden_bias))
            .chain(&self.output_weights);
        for vector in vectors {
            for value in vector.0 {
                out.extend_from_slice(&value.to_le_bytes());
            }
        }
        out.extend_from_slice(&self.output_bias.to_le_bytes());
        out
    }
}

/// A loaded network: immutable parameters plus the forward pass.
#[derive(Clone)]
pub struct Network {
    params: NetworkParams,
}

impl Network {
    #[must_use]
    pub fn new(params: NetworkParams) -> Self {
        Network { params }
    }

    /// A network whose parameters are all zero.
    #[must_use]
    pub fn zeroed() -> Self {
        Self::new(NetworkParams::zeroed())
    }

    /// Load a network from a parameter file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let network = Self::from_bytes(&data)?;
        info!("loaded network parameters from {}", path.display());
        Ok(network)
    }

    /// Load a network from an in-memory parameter blob
    pub fn from_bytes(data: &[u8]) -> Result<Self, LoadError> {
        NetworkParams::from_bytes(data).map(Self::new)
    }

    #[inline]
    #[must_use]
    pub fn params(&self) -> &NetworkParams {
        &self.params
    }

    /// Weight row of one input feature
    #[inline]
    #[must_use]
    pub fn feature_row(&self, feature: usize) -> &HiddenVector {
        &self.params.feature_weights[feature]
    }

    /// Reset an accumulator to the hidden bias
    #[inline]
    pub fn init_accumulator(&self, acc: &mut Accumulator) {
        acc.init(&self.params.hidden_bias);
    }

    /// Evaluate an accumulator from the side to move's point of view.
    ///
    /// `output = (own + other) / QA`, then
    /// `(output + output_bias) * SCALE / (QA * QB)`; both divisions truncate
    /// toward zero.
    #[inline]
    #[must_use]
    pub fn evaluate(&self, acc: &Accumulator, white_to_move: bool) -> i32 {
        let (us, them) = if white_to_move {
            (&acc.white, &acc.black)
        } else {
            (&acc.black, &acc.white)
        };

        let [own_weights, other_weights] = &self.params.output_weights;
        let sum = simd::screlu_dot(&us.0, &own_weights.0) + simd::screlu_dot(&them.0, &other_weights.0);

        let output = sum / i64::from(QA);
        let scaled = (output + i64::from(self.params.output_bias)) * i64::from(SCALE)
            / i64::from(QA * QB);
        scaled as i32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blob_with(fill: impl Fn(usize) -> i16) -> Vec<u8> {
        (0..PARAMS_LEN).flat_map(|i| fill(i).to_le_bytes()).collect()
    }

    #[test]
    fn blob_layout_is_weights_bias_outputs_bias() {
        let data = blob_with(|i| (i % 1000) as i16 - 500);
        let params = NetworkParams::from_bytes(&data).unwrap();

        let value_at = |i: usize| (i % 1000) as i16 - 500;
        assert_eq!(params.feature_weights[0].0[0], value_at(0));
        assert_eq!(params.feature_weights[3].0[5], value_at(3 * HIDDEN_SIZE + 5));

        let bias_start = INPUT_SIZE * HIDDEN_SIZE;
        assert_eq!(params.hidden_bias.0[7], value_at(bias_start + 7));
        assert_eq!(params.output_weights[0].0[0], value_at(bias_start + HIDDEN_SIZE));
        assert_eq!(params.output_weights[1].0[1], value_at(bias_start + 2 * HIDDEN_SIZE + 1));
        assert_eq!(params.output_bias, value_at(PARAMS_LEN - 1));

        assert_eq!(params.to_bytes(), data);
    }

    #[test]
    fn trailing_padding_is_ignored() {
        let mut data = blob_with(|i| (i % 7) as i16);
        data.extend_from_slice(&[0xAB; 62]);
        let network = Network::from_bytes(&data).unwrap();
        assert_eq!(network.params().output_bias, ((PARAMS_LEN - 1) % 7) as i16);
    }

    #[test]
    fn short_blob_is_rejected() {
        let data = vec![0u8; PARAMS_BYTES - 1];
        match Network::from_bytes(&data) {
            Err(LoadError::Truncated { expected, found }) => {
                assert_eq!(expected, PARAMS_BYTES);
                assert_eq!(found, PARAMS_BYTES - 1);
            }
            other => panic!("expected truncation error, got {:?}", other.err()),
        }
    }

    #[test]
    fn missing_file_reports_path() {
        let err = Network::load("/nonexistent/dir/net.nnue").err().unwrap();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/dir/net.nnue"));
    }

    #[test]
    fn zero_weights_leave_only_the_quantized_bias() {
        for bias in [1000i16, -1000, 41, -41, i16::MAX, i16::MIN] {
            let mut params = NetworkParams::zeroed();
            params.output_bias = bias;
            let network = Network::new(params);

            let mut acc = Accumulator::zeroed();
            acc.white.0.iter_mut().enumerate().for_each(|(i, v)| *v = i as i16);
            let expected = i32::from(bias) * SCALE / (QA * QB);

            assert_eq!(network.evaluate(&acc, true), expected);
            assert_eq!(network.evaluate(&acc, false), expected);
        }
        // Truncation toward zero, not rounding or flooring
        assert_eq!(1000 * SCALE / (QA * QB), 24);
        assert_eq!(-1000 * SCALE / (QA * QB), -24);
    }

    #[test]
    fn own_and_other_segments_follow_side_to_move() {
        let mut params = NetworkParams::zeroed();
        params.output_weights[0] = HiddenVector([2; HIDDEN_SIZE]);
        params.output_weights[1] = HiddenVector([-1; HIDDEN_SIZE]);
        let network = Network::new(params);

        let mut acc = Accumulator::zeroed();
        acc.white = HiddenVector([255; HIDDEN_SIZE]);

        let per_element = i64::from(QA * QA);
        let white_sum = 2 * per_element * HIDDEN_SIZE as i64;
        let black_sum = -per_element * HIDDEN_SIZE as i64;
        let expected = |sum: i64| ((sum / i64::from(QA)) * i64::from(SCALE) / i64::from(QA * QB)) as i32;

        assert_eq!(network.evaluate(&acc, true), expected(white_sum));
        assert_eq!(network.evaluate(&acc, false), expected(black_sum));
    }

    #[test]
    fn activation_clips_at_qa() {
        let mut params = NetworkParams::zeroed();
        params.output_weights[0] = HiddenVector([1; HIDDEN_SIZE]);
        let network = Network::new(params);

        let mut clipped = Accumulator::zeroed();
        clipped.white = HiddenVector([1000; HIDDEN_SIZE]);
        let mut at_ceiling = Accumulator::zeroed();
        at_ceiling.white = HiddenVector([255; HIDDEN_SIZE]);
        let mut negative = Accumulator::zeroed();
        negative.white = HiddenVector([-5; HIDDEN_SIZE]);

        assert_eq!(network.evaluate(&clipped, true), network.evaluate(&at_ceiling, true));
        assert_eq!(network.evaluate(&negative, true), 0);
    }
}
