use anyhow::Context;

use stagehand::{DemoConfig, StagehandApp};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("stagehand=info,warn"),
    )
    .init();

    let config = DemoConfig::from_env();
    log::info!(
        "Starting {:?} scene, assets from {}",
        config.variant,
        config.asset_root.display()
    );

    StagehandApp::new(config)
        .context("failed to create the event loop")?
        .run()
        .context("stagehand exited with an error")
}
