//! ONNX classification models (YOLO-cls exports and similar), run on tract.
//!
//! The model takes one `[N, 3, H, W]` float input and yields `[N, classes]` scores.
//! H and W are read from the model; N may be symbolic and is always run as 1.

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tract_onnx::tract_hir::internal::DimLike;
use tract_onnx::prelude::{
    Framework, InferenceModelExt, TDim, TValue, TVec, Tensor, TypedModel, TypedRunnableModel,
};

type Plan = TypedRunnableModel<TypedModel>;

/// Optimized, immutable execution plan. Cloning shares the plan.
#[derive(Clone)]
pub struct OnnxModel {
    plan: Arc<Plan>,
    input_width: u32,
    input_height: u32,
    num_classes: Option<usize>,
}

impl fmt::Debug for OnnxModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnnxModel")
            .field("input_width", &self.input_width)
            .field("input_height", &self.input_height)
            .field("num_classes", &self.num_classes)
            .finish_non_exhaustive()
    }
}

impl OnnxModel {
    pub fn load(path: &Path) -> Result<Self> {
        let model = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|m| m.into_typed())
            .with_context(|| format!("could not load ONNX model {}", path.display()))?;
        Self::from_typed(model).with_context(|| format!("invalid model file {}", path.display()))
    }

    fn from_typed(model: TypedModel) -> Result<Self> {
        if model.inputs.is_empty() {
            anyhow::bail!("model has no input nodes");
        }
        if model.outputs.is_empty() {
            anyhow::bail!("model has no output nodes");
        }
        let shape = model.input_fact(0)?.shape.to_tvec();
        if shape.len() != 4 {
            anyhow::bail!(
                "expected a [batch, 3, height, width] input, got rank {}",
                shape.len()
            );
        }
        let channels = shape[1].to_usize().context("input channel count is not fixed")?;
        if channels != 3 {
            anyhow::bail!("expected 3 input channels, got {}", channels);
        }
        let input_height = fixed_side(&shape[2], "height")?;
        let input_width = fixed_side(&shape[3], "width")?;
        let num_classes = model
            .output_fact(0)?
            .shape
            .to_tvec()
            .last()
            .and_then(|d| d.to_usize().ok());

        let plan = model
            .into_optimized()
            .context("optimize model")?
            .into_runnable()
            .context("prepare model")?;
        Ok(Self {
            plan: Arc::new(plan),
            input_width,
            input_height,
            num_classes,
        })
    }

    pub fn input_width(&self) -> u32 {
        self.input_width
    }

    pub fn input_height(&self) -> u32 {
        self.input_height
    }

    /// Size of the last output dimension, when the model fixes it.
    pub fn num_classes(&self) -> Option<usize> {
        self.num_classes
    }

    /// Raw scores for one preprocessed `[1, 3, H, W]` input.
    pub fn scores(&self, input: &[f32]) -> Result<Vec<f32>> {
        let shape = [1, 3, self.input_height as usize, self.input_width as usize];
        let tensor = Tensor::from_shape(&shape, input)?;
        let inputs: TVec<TValue> = std::iter::once(tensor.into()).collect();
        let outputs = self.plan.run(inputs)?;
        let first = outputs.first().context("model produced no output")?;
        Ok(first.as_slice::<f32>()?.to_vec())
    }
}

fn fixed_side(dim: &TDim, what: &str) -> Result<u32> {
    let side = dim
        .to_usize()
        .with_context(|| format!("input {} is not fixed in the model", what))?;
    u32::try_from(side)
        .ok()
        .filter(|&s| s > 0)
        .with_context(|| format!("unusable input {}: {}", what, side))
}
