/// Post-processing stages (batch-norm, scale, ReLU).
pub mod post;

use crate::config::ConvParams;
use crate::conv::{self, ConvAlgorithm, GroupLayout, KernelPath};
use crate::error::Result;
use crate::loader::{load_vector, load_weights, ParamSource};
use crate::tensor::Blob;

/// One convolution (or fully-connected) layer: its configuration plus the
/// accumulation loop it runs.
#[derive(Debug, Clone)]
pub struct ConvLayer {
    params: ConvParams,
    algorithm: ConvAlgorithm,
}

impl ConvLayer {
    pub fn new(params: ConvParams) -> Self {
        ConvLayer {
            params,
            algorithm: ConvAlgorithm::Auto,
        }
    }

    pub fn with_algorithm(params: ConvParams, algorithm: ConvAlgorithm) -> Self {
        ConvLayer { params, algorithm }
    }

    pub fn params(&self) -> &ConvParams {
        &self.params
    }

    pub fn algorithm(&self) -> ConvAlgorithm {
        self.algorithm
    }

    /// Runs the layer on `input`, which is consumed.
    pub fn forward(&self, input: Blob, source: &dyn ParamSource) -> Result<Blob> {
        self.forward_with_path(input, source).map(|(out, _)| out)
    }

    /// Like [`forward`](Self::forward), also reporting which kernel loop ran.
    pub fn forward_with_path(&self, input: Blob, source: &dyn ParamSource) -> Result<(Blob, KernelPath)> {
        let p = &self.params;
        let geom = p.validate(input.shape())?;

        if p.fully_connected && p.pad > 0 {
            log::warn!("fully-connected layer with pad {}: kernel includes the zero border", p.pad);
        }

        let input = if p.pad > 0 {
            let padded = conv::pad(&input, p.pad);
            log::debug!("padded input {} -> {}", input, padded);
            drop(input);
            padded
        } else {
            input
        };

        let mut out = match &p.bias {
            Some(id) => {
                let bias = load_vector(source, id, p.num_out)?;
                let mut out = Blob::alloc(geom.out_d, geom.out_h, geom.out_w);
                for (c, b) in bias.iter().enumerate() {
                    out.channel_mut(c).fill(*b);
                }
                out
            }
            None => Blob::zeros(geom.out_d, geom.out_h, geom.out_w),
        };

        let weights = load_weights(source, &input, p)?;
        let layout = GroupLayout::new(geom.in_d, p.num_out, p.group);
        let path = conv::conv2d(
            self.algorithm,
            &input,
            &weights,
            layout,
            geom.ky,
            geom.kx,
            p.sy,
            p.sx,
            &mut out,
        );
        log::debug!(
            "conv {} * {} -> {} ({:?}, group {}, stride {}x{})",
            input,
            weights,
            out,
            path,
            p.group,
            p.sy,
            p.sx
        );
        drop(weights);
        drop(input);

        if let Some(bn) = &p.batch_norm {
            let mean = load_vector(source, &bn.mean, out.d)?;
            let var = load_vector(source, &bn.var, out.d)?;
            post::batch_norm(&mut out, &mean, &var, bn.eps)?;
            log::debug!("batch-norm applied (eps {})", bn.eps);
        }

        if let Some(sc) = &p.scale {
            let scale = load_vector(source, &sc.scale, out.d)?;
            let bias = load_vector(source, &sc.bias, out.d)?;
            post::scale(&mut out, &scale, &bias);
            log::debug!("scale applied");
        }

        if p.relu {
            post::relu(&mut out);
        }

        Ok((out, path))
    }
}

/// Runs one layer with the default kernel selection. `input` is consumed.
pub fn convolution(input: Blob, params: &ConvParams, source: &dyn ParamSource) -> Result<Blob> {
    ConvLayer::new(params.clone()).forward(input, source)
}
