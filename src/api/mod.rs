// Client side of the monster image service

pub mod client;
pub mod error;

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;

pub use client::HttpSpriteClient;
pub use error::FetchError;

/// Which folder of a monster to list.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageMode {
    Base,
    Animations,
}

impl ImageMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMode::Base => "base",
            ImageMode::Animations => "animations",
        }
    }
}

impl fmt::Display for ImageMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Anything that can list a monster's image paths and serve sprite sheets.
pub trait SpriteSource {
    fn fetch_paths(
        &self,
        monster_id: u32,
        mode: ImageMode,
    ) -> impl Future<Output = Result<Vec<String>, FetchError>>;

    fn fetch_sheet(
        &self,
        image_path: &str,
    ) -> impl Future<Output = Result<DynamicImage, FetchError>>;
}
