// Sprite descriptors derived from backend file paths

use serde::{Deserialize, Serialize};

const IMAGES_SEGMENT: &str = "images";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteDescriptor {
    pub name: String,
    pub image_path: String,
}

impl SpriteDescriptor {
    pub fn from_path(raw: &str) -> Self {
        let normalized = raw.replace('\\', "/");
        Self {
            name: display_name(&normalized),
            image_path: relative_image_path(&normalized).to_string(),
        }
    }
}

/// Turns the raw path list returned by the image service into descriptors,
/// one per input and in the same order. Never fails; odd inputs degrade to
/// empty names or whole-path image paths.
pub fn resolve<S: AsRef<str>>(paths: &[S]) -> Vec<SpriteDescriptor> {
    paths
        .iter()
        .map(|p| SpriteDescriptor::from_path(p.as_ref()))
        .collect()
}

fn display_name(normalized: &str) -> String {
    let file = normalized.rsplit('/').next().unwrap_or_default();
    match file.split_once('.') {
        Some((stem, _)) => stem.to_string(),
        None => String::new(),
    }
}

// Everything after the first whole `images` segment, keeping the leading slash.
fn relative_image_path(normalized: &str) -> &str {
    for (ix, _) in normalized.match_indices(IMAGES_SEGMENT) {
        let end = ix + IMAGES_SEGMENT.len();
        let starts_segment = ix == 0 || normalized.as_bytes()[ix - 1] == b'/';
        let ends_segment = end == normalized.len() || normalized.as_bytes()[end] == b'/';
        if starts_segment && ends_segment {
            return &normalized[end..];
        }
    }
    normalized
}
