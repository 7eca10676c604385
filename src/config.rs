//! Layer configuration: what a single convolution invocation computes and
//! where its parameters come from.

use serde::{Deserialize, Serialize};

use crate::error::{ConvError, Result};

fn one() -> usize {
    1
}

/// Sources for inference-time batch normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchNormSources {
    pub mean: String,
    pub var: String,
    #[serde(default)]
    pub eps: f32,
}

/// Sources for the per-channel affine stage `x * scale + bias`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScaleSources {
    pub scale: String,
    pub bias: String,
}

/// Configuration of one convolution (or fully-connected) layer.
///
/// Optional stages are skipped entirely when their sources are absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvParams {
    #[serde(default = "one")]
    pub ky: usize,
    #[serde(default = "one")]
    pub kx: usize,
    #[serde(default = "one")]
    pub sy: usize,
    #[serde(default = "one")]
    pub sx: usize,
    #[serde(default)]
    pub pad: usize,
    pub num_out: usize,
    #[serde(default = "one")]
    pub group: usize,
    /// Kernel spans the whole (padded) input; `ky`/`kx` are ignored.
    #[serde(default)]
    pub fully_connected: bool,
    pub weights: String,
    #[serde(default)]
    pub bias: Option<String>,
    #[serde(default)]
    pub batch_norm: Option<BatchNormSources>,
    #[serde(default)]
    pub scale: Option<ScaleSources>,
    #[serde(default)]
    pub relu: bool,
}

/// Shapes derived from a configuration and a concrete input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerGeometry {
    /// Input extent after padding.
    pub in_d: usize,
    pub in_h: usize,
    pub in_w: usize,
    /// Effective kernel extent.
    pub ky: usize,
    pub kx: usize,
    pub out_d: usize,
    pub out_h: usize,
    pub out_w: usize,
}

/// Largest blob, in floats, that a `Vec<f32>` can hold.
const MAX_ELEMENTS: usize = isize::MAX as usize / std::mem::size_of::<f32>();

fn element_count(what: &str, d: usize, h: usize, w: usize) -> Result<usize> {
    d.checked_mul(h)
        .and_then(|n| n.checked_mul(w))
        .filter(|&n| n <= MAX_ELEMENTS)
        .ok_or_else(|| ConvError::InvalidShape(format!("{} blob {}x{}x{} is too large", what, d, h, w)))
}

impl ConvParams {
    pub fn new(num_out: usize, ky: usize, kx: usize, weights: impl Into<String>) -> Self {
        ConvParams {
            ky,
            kx,
            sy: 1,
            sx: 1,
            pad: 0,
            num_out,
            group: 1,
            fully_connected: false,
            weights: weights.into(),
            bias: None,
            batch_norm: None,
            scale: None,
            relu: false,
        }
    }

    /// Parses a JSON layer description.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| ConvError::Config(e.to_string()))
    }

    pub fn with_stride(mut self, sy: usize, sx: usize) -> Self {
        self.sy = sy;
        self.sx = sx;
        self
    }

    pub fn with_pad(mut self, pad: usize) -> Self {
        self.pad = pad;
        self
    }

    pub fn with_group(mut self, group: usize) -> Self {
        self.group = group;
        self
    }

    pub fn fully_connected(mut self) -> Self {
        self.fully_connected = true;
        self
    }

    pub fn with_bias(mut self, bias: impl Into<String>) -> Self {
        self.bias = Some(bias.into());
        self
    }

    pub fn with_batch_norm(mut self, mean: impl Into<String>, var: impl Into<String>, eps: f32) -> Self {
        self.batch_norm = Some(BatchNormSources {
            mean: mean.into(),
            var: var.into(),
            eps,
        });
        self
    }

    pub fn with_scale(mut self, scale: impl Into<String>, bias: impl Into<String>) -> Self {
        self.scale = Some(ScaleSources {
            scale: scale.into(),
            bias: bias.into(),
        });
        self
    }

    pub fn with_relu(mut self) -> Self {
        self.relu = true;
        self
    }

    /// Effective kernel extent for an input of the given (padded) size.
    pub fn kernel_size(&self, in_h: usize, in_w: usize) -> (usize, usize) {
        if self.fully_connected {
            (in_h, in_w)
        } else {
            (self.ky, self.kx)
        }
    }

    /// Checks the configuration against an unpadded input shape and returns
    /// the geometry of the invocation. Runs before anything is allocated or
    /// loaded.
    pub fn validate(&self, input: (usize, usize, usize)) -> Result<LayerGeometry> {
        let (in_d, h, w) = input;
        if self.group == 0 {
            return Err(ConvError::InvalidShape("group count must be positive".into()));
        }
        if self.sy == 0 || self.sx == 0 {
            return Err(ConvError::InvalidShape(format!(
                "stride {}x{} must be positive",
                self.sy, self.sx
            )));
        }
        if self.num_out == 0 {
            return Err(ConvError::InvalidShape("layer has no output channels".into()));
        }
        if self.num_out % self.group != 0 {
            return Err(ConvError::InvalidShape(format!(
                "{} output channels not divisible into {} groups",
                self.num_out, self.group
            )));
        }
        if in_d == 0 || in_d % self.group != 0 {
            return Err(ConvError::InvalidShape(format!(
                "{} input channels not divisible into {} groups",
                in_d, self.group
            )));
        }

        let padded = |extent: usize| {
            self.pad
                .checked_mul(2)
                .and_then(|border| extent.checked_add(border))
                .ok_or_else(|| {
                    ConvError::InvalidShape(format!("pad {} overflows input extent {}", self.pad, extent))
                })
        };
        let in_h = padded(h)?;
        let in_w = padded(w)?;
        let (ky, kx) = self.kernel_size(in_h, in_w);
        if ky == 0 || kx == 0 || ky > in_h || kx > in_w {
            return Err(ConvError::InvalidShape(format!(
                "kernel {}x{} does not fit input {}x{} (pad {})",
                ky, kx, h, w, self.pad
            )));
        }

        let geom = LayerGeometry {
            in_d,
            in_h,
            in_w,
            ky,
            kx,
            out_d: self.num_out,
            out_h: (in_h - ky) / self.sy + 1,
            out_w: (in_w - kx) / self.sx + 1,
        };

        // every blob the invocation allocates must be addressable
        element_count("padded input", in_d, in_h, in_w)?;
        element_count("weights", self.num_out, in_d / self.group, ky.saturating_mul(kx))?;
        element_count("output", geom.out_d, geom.out_h, geom.out_w)?;
        Ok(geom)
    }
}
