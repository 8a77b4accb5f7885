use anyhow::Result;

mod animation;
mod camera;
mod config;
mod experience;
mod lighting;
mod loader;
mod model;
mod params;
mod rendering;
mod scene_graph;
mod sections;
mod window;

fn main() -> Result<()> {
    pretty_env_logger::init();

    pollster::block_on(window::run())?;

    Ok(())
}
