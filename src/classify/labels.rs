use anyhow::{Context, Result};
use std::path::Path;

/// Class labels, indexed by model output position.
#[derive(Clone, Debug, Default)]
pub struct ClassNames {
    names: Vec<String>,
}

impl ClassNames {
    /// Read one label per line. Line order defines the class index; blank lines count.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.is_file() {
            anyhow::bail!(
                "class names path is not a regular file or does not exist: {}",
                path.display()
            );
        }
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read class names file {}", path.display()))?;
        Ok(Self::from_lines(&text))
    }

    pub fn from_lines(text: &str) -> Self {
        Self {
            names: text
                .lines()
                .map(|l| l.strip_suffix('\r').unwrap_or(l).to_string())
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Label for `index`, or `class_<index>` when the names file is shorter than the model output.
    pub fn name_for(&self, index: usize) -> String {
        match self.names.get(index) {
            Some(name) => name.clone(),
            None => format!("class_{index}"),
        }
    }
}
