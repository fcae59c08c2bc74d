use anyhow::Result;
use meeples_core::{BoardConfig, GameBoard};
use meeples_render::render_png_offscreen;
use tracing::info;

const RUN_TICKS: u64 = 600;
const OBSTACLE_COUNT: usize = 6;
const MEEPLE_COUNT: usize = 8;
const SUMMARY_INTERVAL: u64 = 60;
const FRAME_PATH: &str = "meeples.png";

fn main() -> Result<()> {
    init_tracing();
    let mut world = bootstrap_world()?;
    info!("Starting Meeples demo run");

    for _ in 0..RUN_TICKS {
        let summary = world.step();
        if summary.tick.0 % SUMMARY_INTERVAL == 0 {
            info!(
                tick = summary.tick.0,
                meeples = summary.meeple_count,
                detections = summary.detections,
                "tick summary"
            );
        }
    }

    let png = render_png_offscreen(&world)?;
    std::fs::write(FRAME_PATH, &png)?;
    info!(path = FRAME_PATH, bytes = png.len(), "wrote final frame");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn bootstrap_world() -> Result<GameBoard> {
    let config = BoardConfig {
        rng_seed: Some(424_242),
        ..BoardConfig::default()
    };
    let mut world = GameBoard::new(config)?;
    for _ in 0..OBSTACLE_COUNT {
        let obstacle = world.add_obstacle(None, None);
        info!(
            x = obstacle.center.x,
            y = obstacle.center.y,
            radius = obstacle.radius,
            "baked obstacle"
        );
    }
    for _ in 0..MEEPLE_COUNT {
        world.spawn_random();
    }
    Ok(world)
}
