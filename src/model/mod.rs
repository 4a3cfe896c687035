pub mod frames;
pub mod monster;
pub mod sprite;
pub mod state;
