//! Image classifier used by the CLI: file checks, decode, model scores, top-k labels.

pub mod labels;
pub mod model;
pub mod onnx;
pub mod tensor;

pub use labels::ClassNames;
pub use model::LinearModel;
pub use onnx::OnnxModel;
pub use tensor::{preprocess, softmax, top_k};

use anyhow::Result;
use log::debug;
use std::path::Path;

use crate::engine::tools::check_image_file;
use crate::pipeline::Classify;
use crate::{ItemError, Prediction};

/// On-disk model format, picked from the file extension: `.onnx` or JSON for anything else.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelFormat {
    Onnx,
    LinearJson,
}

impl ModelFormat {
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("onnx") => ModelFormat::Onnx,
            _ => ModelFormat::LinearJson,
        }
    }
}

/// Scoring backend behind [`ImageClassifier`].
#[derive(Debug, Clone)]
pub enum ModelBackend {
    Linear(LinearModel),
    Onnx(OnnxModel),
}

impl ModelBackend {
    pub fn load(path: &Path) -> Result<Self> {
        match ModelFormat::from_path(path) {
            ModelFormat::Onnx => Ok(ModelBackend::Onnx(OnnxModel::load(path)?)),
            ModelFormat::LinearJson => Ok(ModelBackend::Linear(LinearModel::load(path)?)),
        }
    }

    /// Model input as `(width, height)`.
    pub fn input_size(&self) -> (u32, u32) {
        match self {
            ModelBackend::Linear(m) => (m.input_width, m.input_height),
            ModelBackend::Onnx(m) => (m.input_width(), m.input_height()),
        }
    }

    /// Number of output classes, when the model states it.
    pub fn num_classes(&self) -> Option<usize> {
        match self {
            ModelBackend::Linear(m) => Some(m.num_classes()),
            ModelBackend::Onnx(m) => m.num_classes(),
        }
    }

    pub fn scores(&self, input: &[f32]) -> Result<Vec<f32>, ItemError> {
        match self {
            ModelBackend::Linear(m) => Ok(m.scores(input)),
            ModelBackend::Onnx(m) => m
                .scores(input)
                .map_err(|e| ItemError::Inference(format!("{e:#}"))),
        }
    }
}

impl From<LinearModel> for ModelBackend {
    fn from(model: LinearModel) -> Self {
        ModelBackend::Linear(model)
    }
}

impl From<OnnxModel> for ModelBackend {
    fn from(model: OnnxModel) -> Self {
        ModelBackend::Onnx(model)
    }
}

/// Immutable after construction; shared by all workers behind an `Arc`.
#[derive(Debug, Clone)]
pub struct ImageClassifier {
    model: ModelBackend,
    names: ClassNames,
    use_softmax: bool,
    max_filesize: u64,
}

impl ImageClassifier {
    pub fn new(
        model: impl Into<ModelBackend>,
        names: ClassNames,
        use_softmax: bool,
        max_filesize: u64,
    ) -> Self {
        let model = model.into();
        if let Some(classes) = model.num_classes()
            && classes != names.len()
        {
            log::warn!(
                "model has {} classes but {} names were loaded",
                classes,
                names.len()
            );
        }
        Self {
            model,
            names,
            use_softmax,
            max_filesize,
        }
    }

    /// Load model (format by extension, see [`ModelFormat`]) and class names.
    /// Any failure here is fatal for the run.
    pub fn load(
        model_path: &Path,
        classes_path: &Path,
        use_softmax: bool,
        max_filesize: u64,
    ) -> Result<Self> {
        let model = ModelBackend::load(model_path)?;
        let names = ClassNames::load(classes_path)?;
        let (width, height) = model.input_size();
        debug!(
            "model: {}x{} input, {:?} classes",
            width,
            height,
            model.num_classes()
        );
        Ok(Self::new(model, names, use_softmax, max_filesize))
    }

    /// Classify an already decoded image.
    pub fn predict(
        &self,
        image: &image::DynamicImage,
        k: usize,
    ) -> Result<Vec<Prediction>, ItemError> {
        let (width, height) = self.model.input_size();
        let input = preprocess(image, width, height);
        let mut scores = self.model.scores(&input)?;
        if self.use_softmax {
            softmax(&mut scores);
        }
        Ok(top_k(&scores, k)
            .into_iter()
            .map(|(index, confidence)| Prediction::new(self.names.name_for(index), confidence))
            .collect())
    }
}

impl Classify for ImageClassifier {
    fn classify(&self, item: &str, top_k: usize) -> Result<Vec<Prediction>, ItemError> {
        let path = Path::new(item);
        check_image_file(path, self.max_filesize)?;
        let image = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?;
        self.predict(&image, top_k)
    }
}
