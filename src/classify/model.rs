//! Linear scoring model over a fixed-size planar RGB input.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// On-disk model (JSON). `weights` has one row per class, each `3 * input_height * input_width`
/// long in channel-major (NCHW) order. `bias` is either empty (zeros) or one value per class.
#[derive(Debug, Clone, Deserialize)]
pub struct LinearModel {
    pub input_width: u32,
    pub input_height: u32,
    pub weights: Vec<Vec<f32>>,
    #[serde(default)]
    pub bias: Vec<f32>,
}

impl LinearModel {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("could not open model file {}", path.display()))?;
        let model: LinearModel = serde_json::from_str(&text)
            .with_context(|| format!("could not parse model file {}", path.display()))?;
        model
            .validate()
            .with_context(|| format!("invalid model file {}", path.display()))?;
        Ok(model)
    }

    /// Shape checks; a model that fails these never reaches the pipeline.
    pub fn validate(&self) -> Result<()> {
        if self.input_width == 0 || self.input_height == 0 {
            anyhow::bail!(
                "input size must be non-zero, got {}x{}",
                self.input_width,
                self.input_height
            );
        }
        if self.weights.is_empty() {
            anyhow::bail!("model has no output classes");
        }
        let Some(expected) = self.input_len() else {
            anyhow::bail!(
                "input size too large: {}x{}",
                self.input_width,
                self.input_height
            );
        };
        if let Some((i, row)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != expected)
        {
            anyhow::bail!(
                "weight row {} has {} values, expected {} (3 x {} x {})",
                i,
                row.len(),
                expected,
                self.input_height,
                self.input_width
            );
        }
        if !self.bias.is_empty() && self.bias.len() != self.weights.len() {
            anyhow::bail!(
                "bias has {} values for {} classes",
                self.bias.len(),
                self.weights.len()
            );
        }
        Ok(())
    }

    /// Length of the flattened input tensor, `None` if it does not fit in `usize`.
    pub fn input_len(&self) -> Option<usize> {
        (self.input_width as usize)
            .checked_mul(self.input_height as usize)?
            .checked_mul(3)
    }

    pub fn num_classes(&self) -> usize {
        self.weights.len()
    }

    /// Raw score per class for a preprocessed input of length [`input_len`](Self::input_len).
    pub fn scores(&self, input: &[f32]) -> Vec<f32> {
        self.weights
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let dot: f32 = row.iter().zip(input).map(|(w, x)| w * x).sum();
                dot + self.bias.get(i).copied().unwrap_or(0.0)
            })
            .collect()
    }
}
