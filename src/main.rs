//! Headless driver: runs the engine without a window and reports what happens.
//!
//! Usage: cryptic-descent [config.json] [--frames N] [--mask-out mask.png] [--scene-out scene.png]

use cryptic_descent::events::GameEvent;
use cryptic_descent::{EngineError, GameConfig, GameEngine};
use env_logger::Env;
use std::path::PathBuf;
use thiserror::Error;

const PUFFIN_ADDR: &str = "127.0.0.1:8585";

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("bad arguments: {0}")]
    Usage(String),
    #[error("failed to write {path}: {source}")]
    Image {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error("failed to start the profiler server: {0}")]
    Profiler(String),
}

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    frames: Option<u32>,
    mask_out: Option<PathBuf>,
    scene_out: Option<PathBuf>,
}

impl Args {
    fn parse(mut args: impl Iterator<Item = String>) -> Result<Self, CliError> {
        let mut parsed = Args::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--frames" => {
                    let value = args.next().ok_or_else(|| CliError::Usage("--frames needs a value".into()))?;
                    let frames = value
                        .parse()
                        .map_err(|_| CliError::Usage(format!("invalid frame count '{}'", value)))?;
                    parsed.frames = Some(frames);
                }
                "--mask-out" => {
                    let value = args.next().ok_or_else(|| CliError::Usage("--mask-out needs a path".into()))?;
                    parsed.mask_out = Some(PathBuf::from(value));
                }
                "--scene-out" => {
                    let value = args.next().ok_or_else(|| CliError::Usage("--scene-out needs a path".into()))?;
                    parsed.scene_out = Some(PathBuf::from(value));
                }
                flag if flag.starts_with("--") => {
                    return Err(CliError::Usage(format!("unknown flag {}", flag)));
                }
                path => {
                    if parsed.config.is_some() {
                        return Err(CliError::Usage("only one config file may be given".into()));
                    }
                    parsed.config = Some(PathBuf::from(path));
                }
            }
        }
        Ok(parsed)
    }
}

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    if let Err(err) = run() {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run() -> Result<(), CliError> {
    let args = Args::parse(std::env::args().skip(1))?;

    let config = match &args.config {
        Some(path) => {
            log::info!("loading config from {}", path.display());
            GameConfig::load(path).map_err(EngineError::from)?
        }
        None => GameConfig::default(),
    };

    let _profiler = if config.profiling {
        puffin::set_scopes_on(true);
        let server = puffin_http::Server::new(PUFFIN_ADDR).map_err(|e| CliError::Profiler(e.to_string()))?;
        log::info!("serving profiler data on {}", PUFFIN_ADDR);
        Some(server)
    } else {
        None
    };

    let frames = args.frames.unwrap_or(config.simulation.frames);
    let dt = config.simulation.fixed_timestep;
    let mut engine = GameEngine::new(config)?;

    for frame in 0..frames {
        puffin::GlobalProfiler::lock().new_frame();
        engine.tick(dt);

        for event in engine.drain_events() {
            match event {
                GameEvent::PathLost(err) => log::warn!("frame {}: guide lost ({})", frame, err),
                other => log::info!("frame {}: {:?}", frame, other),
            }
        }
        if let Some(text) = engine.shift().text() {
            log::debug!("frame {}: {}", frame, text);
        }

        if frame % 60 == 0 {
            let pos = engine.player_position();
            log::debug!(
                "frame {}: player at ({:.1}, {:.1}) room {:?}, guide marker {:?}",
                frame,
                pos.x,
                pos.y,
                engine.current_room(),
                engine.marker().map(|m| m.position)
            );
        }
    }

    log::info!(
        "ran {} frames ({} fixed steps), {} level(s) generated, exit reached: {}",
        frames,
        engine.step_count(),
        engine.levels_generated(),
        engine.exit_reached()
    );

    if let Some(path) = &args.mask_out {
        save_image(engine.level().lighting.mask().image(), path)?;
        log::info!("light mask written to {}", path.display());
    }
    if let Some(path) = &args.scene_out {
        save_image(&engine.lit_scene(), path)?;
        log::info!("lit scene written to {}", path.display());
    }

    Ok(())
}

fn save_image(image: &image::RgbaImage, path: &std::path::Path) -> Result<(), CliError> {
    image.save(path).map_err(|source| CliError::Image {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, CliError> {
        Args::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_parse_all_flags() {
        let args = parse(&["cfg.json", "--frames", "120", "--mask-out", "m.png", "--scene-out", "s.png"]).unwrap();
        assert_eq!(args.config, Some(PathBuf::from("cfg.json")));
        assert_eq!(args.frames, Some(120));
        assert_eq!(args.mask_out, Some(PathBuf::from("m.png")));
        assert_eq!(args.scene_out, Some(PathBuf::from("s.png")));
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(parse(&["--frames"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["--frames", "many"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["--verbose"]), Err(CliError::Usage(_))));
        assert!(matches!(parse(&["a.json", "b.json"]), Err(CliError::Usage(_))));
    }
}
