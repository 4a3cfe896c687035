// Library exports for monster-sprites

pub mod api;
pub mod app;
pub mod components;
pub mod config;
pub mod event;
pub mod logging;
pub mod model;
pub mod sprite_worker;
pub mod widgets;

pub use model::frames::{FrameCursor, FrameGridSpec, FrameStepper};
pub use model::sprite::{SpriteDescriptor, resolve};
