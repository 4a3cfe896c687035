use crossterm::event::KeyEvent;
use image::DynamicImage;
use std::sync::Arc;

use crate::api::ImageMode;
use crate::model::sprite::SpriteDescriptor;
use crate::model::state::ActiveView;

/// Which view a fetch was made for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViewTarget {
    Viewer,
    Gallery,
    /// The base image card inside the Viewer.
    Portrait,
}

impl ViewTarget {
    /// Views that only ever show the sheet they asked for last.
    pub fn shows_one_sheet(&self) -> bool {
        matches!(self, ViewTarget::Viewer | ViewTarget::Portrait)
    }
}

#[derive(Clone, Debug)]
pub enum AppMsg {
    Tick,
    Key(KeyEvent),
    Quit,
    ViewChanged(ActiveView),

    // Requests routed to the sprite worker
    FetchPaths {
        target: ViewTarget,
        monster_id: u32,
        mode: ImageMode,
    },
    FetchSheets {
        target: ViewTarget,
        image_paths: Vec<String>,
    },

    // Worker results
    PathsLoaded {
        target: ViewTarget,
        descriptors: Vec<SpriteDescriptor>,
    },
    PathsFailed {
        target: ViewTarget,
        reason: String,
    },
    SheetLoaded {
        target: ViewTarget,
        image_path: String,
        sheet: Arc<DynamicImage>,
    },
    SheetFailed {
        target: ViewTarget,
        image_path: String,
        reason: String,
    },
    /// A newer sheet request for the same view made this one pointless.
    SheetSkipped {
        target: ViewTarget,
        image_path: String,
    },

    // General
    ErrorOccurred(String),
    LogMessage(String),
}

impl AppMsg {
    pub fn target(&self) -> Option<ViewTarget> {
        match self {
            AppMsg::FetchPaths { target, .. }
            | AppMsg::FetchSheets { target, .. }
            | AppMsg::PathsLoaded { target, .. }
            | AppMsg::PathsFailed { target, .. }
            | AppMsg::SheetLoaded { target, .. }
            | AppMsg::SheetFailed { target, .. }
            | AppMsg::SheetSkipped { target, .. } => Some(*target),
            _ => None,
        }
    }
}
