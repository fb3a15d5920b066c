pub mod app;
pub mod artwork;
pub mod camera3d;
pub mod catalog;
pub mod cli;
pub mod config;
pub mod events;
pub mod input;
pub mod interaction;
pub mod material_registry;
pub mod mesh;
pub mod mesh_registry;
pub mod overlay;
pub mod picking;
pub mod renderer;
pub mod room;
pub mod scene;
pub mod selection;

pub use app::{run, run_with_overrides, App};
