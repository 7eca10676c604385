//! Forward pass of a single convolutional layer in Rust.
//!
//! This crate computes one grouped, strided convolution (or a fully-connected
//! layer expressed as a convolution whose kernel spans the whole input) over a
//! 3D blob, with weights and optional bias, batch-norm and scale parameters
//! read from flat `f32` sources, followed by an optional ReLU.
//!
//! # Example
//!
//! ```no_run
//! use microconv::{convolution, Blob, ConvParams, FileSource};
//!
//! let params = ConvParams::new(20, 5, 5, "conv1_w.bin").with_bias("conv1_b.bin").with_relu();
//! let input = Blob::zeros(1, 28, 28);
//! let out = convolution(input, &params, &FileSource::new("data")).unwrap();
//! assert_eq!(out.shape(), (20, 24, 24));
//! ```

/// Layer configuration and shape validation.
pub mod config;
/// Convolution kernels, padding and group layout.
pub mod conv;
/// Error type shared by every operation.
pub mod error;
/// Layer driver composing padding, loading, convolution and post-processing.
pub mod layer;
/// Parameter sources and loaders.
pub mod loader;
/// Benchmarking utilities.
pub mod metrics;
/// FP32 3D blob.
pub mod tensor;

pub use config::{BatchNormSources, ConvParams, LayerGeometry, ScaleSources};
pub use conv::{ConvAlgorithm, KernelPath};
pub use error::{ConvError, LoadFailure, Result};
pub use layer::{convolution, ConvLayer};
pub use loader::{load_vector, load_weights, FileSource, MemorySource, ParamSource};
pub use tensor::Blob;
