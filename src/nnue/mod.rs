//! NNUE (Efficiently Updatable Neural Network) evaluation.
//!
//! Provides the quantized network machinery behind the phased evaluator:
//! - Feature indexing for both perspectives
//! - Incremental accumulator updates mirrored on a per-line stack
//! - SIMD-optimized inference (AVX2/NEON) with `SCReLU` activation
//! - A set of three networks selected by game phase
//!
//! Architecture: (768 -> 768) x 2 perspectives -> 1

pub mod accumulator;
pub mod features;
pub mod network;
pub mod network_set;
pub mod simd;

pub use accumulator::{Accumulator, AccumulatorStack};
pub use features::{feature_indices, feature_indices_packed, FeatureDelta, PieceSquare};
pub use network::{HiddenVector, Network, NetworkParams, HIDDEN_SIZE, INPUT_SIZE, PARAMS_BYTES};
pub use network_set::{global, global_or_try_init, install_global, NetworkSet, Phase};

/// Activation quantization factor (also the `SCReLU` clipping ceiling)
pub const QA: i32 = 255;

/// Output weight quantization factor
pub const QB: i32 = 64;

/// Evaluation scale factor
pub const SCALE: i32 = 400;
