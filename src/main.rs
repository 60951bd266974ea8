//! Orbviz - interactive preview of a single lit, slowly rotating sphere.
//!
//! The control panel edits colour, glow, light and an optional surface
//! texture; every displayed frame reads the latest values.

mod app;
mod assets;
mod config;
mod params;
mod render;
mod scene;
mod ui;

fn main() {
    app::run();
}
