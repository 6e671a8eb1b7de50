//! Size parsing, extension filter and per-file checks

use anyhow::Result;
use std::path::Path;

use crate::ItemError;

/// Parse a size with an optional binary unit: `512`, `64k`, `100mb`, `2G`, ` 1tb `.
/// Units: b, k/kb, m/mb, g/gb, t/tb (case-insensitive, powers of 1024).
pub fn parse_size(input: &str) -> Result<u64> {
    let s = input.trim().to_ascii_lowercase();
    if s.is_empty() {
        anyhow::bail!("size cannot be empty");
    }
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (number, unit) = s.split_at(split);
    if number.is_empty() {
        anyhow::bail!("size '{}' does not start with a number", input);
    }
    let number: u64 = number
        .parse()
        .map_err(|_| anyhow::anyhow!("size '{}' is too large", input))?;
    let multiplier: u64 = match unit {
        "" | "b" => 1,
        "k" | "kb" => 1 << 10,
        "m" | "mb" => 1 << 20,
        "g" | "gb" => 1 << 30,
        "t" | "tb" => 1 << 40,
        other => anyhow::bail!("unknown storage unit '{}' in '{}'", other, input),
    };
    number
        .checked_mul(multiplier)
        .ok_or_else(|| anyhow::anyhow!("size '{}' is too large", input))
}

/// Image extensions the decoder side is expected to handle (OpenCV and GDAL raster formats).
const SUPPORTED_EXTENSIONS: &[&str] = &[
    // OpenCV
    "bmp", "dib", "jpeg", "jpg", "jpe", "jp2", "png", "webp", "pbm", "pgm", "ppm", "pxm", "pnm",
    "sr", "ras", "tiff", "tif", "exr", "hdr", "pic",
    // GDAL
    "dt0", "dt1", "dt2", "img", "j2k", "ecw",
];

/// True if `extension` (leading dot optional, any case) is a supported image extension.
pub fn is_supported_image(extension: &str) -> bool {
    let ext = extension.strip_prefix('.').unwrap_or(extension);
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|known| known.eq_ignore_ascii_case(ext))
}

/// Filter predicate for streamed items: accept by extension, or everything when disabled.
#[derive(Clone, Copy, Debug)]
pub struct ExtensionFilter {
    pub enabled: bool,
}

impl ExtensionFilter {
    pub fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    pub fn accepts(&self, path: &str) -> bool {
        if !self.enabled {
            return true;
        }
        Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(is_supported_image)
    }
}

/// Preconditions before decoding: a regular file, not empty, not larger than `max_filesize`.
pub fn check_image_file(path: &Path, max_filesize: u64) -> Result<u64, ItemError> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(ItemError::NotAFile),
        Err(e) => return Err(ItemError::Io(e)),
    };
    if !meta.is_file() {
        return Err(ItemError::NotAFile);
    }
    let size = meta.len();
    if size == 0 {
        return Err(ItemError::Empty);
    }
    if size > max_filesize {
        return Err(ItemError::TooLarge {
            size,
            max: max_filesize,
        });
    }
    Ok(size)
}
