#![deny(unsafe_code)]
//! CLI binary for the gradient-field background.
//!
//! Subcommands:
//! - `render` runs the simulator N ticks and writes the last frame as PNG
//! - `settings` prints the effective settings (or one key) as JSON
//! - `list` prints blend modes and setting keys with their regeneration policy

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use gradient_field_core::{
    BlendMode, ManualScheduler, Setting, SettingKey, Settings, Simulator, Viewport,
};
use gradient_field_raster::Raster;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gradient-field", about = "Animated gradient-field background CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Settings sources shared by `render` and `settings`.
#[derive(clap::Args)]
struct SettingsArgs {
    /// Settings document (JSON, camelCase keys); missing keys use defaults.
    #[arg(long = "settings")]
    file: Option<PathBuf>,

    /// Override one key, e.g. `--set blendMode=screen`. Values parse as JSON,
    /// falling back to plain text. Repeatable; applied after the file.
    #[arg(long = "set", value_name = "KEY=VALUE")]
    overrides: Vec<String>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the simulator for N ticks and write the last frame as PNG.
    Render {
        /// Logical width in CSS pixels.
        #[arg(short = 'W', long, default_value_t = 1280.0)]
        width: f64,

        /// Logical height in CSS pixels.
        #[arg(short = 'H', long, default_value_t = 720.0)]
        height: f64,

        /// Device pixel ratio.
        #[arg(long, default_value_t = 1.0)]
        dpr: f64,

        /// Number of ticks to advance before rendering.
        #[arg(short, long, default_value_t = 120)]
        frames: u64,

        /// PRNG seed for deterministic output.
        #[arg(long, default_value_t = 42)]
        seed: u64,

        #[command(flatten)]
        settings: SettingsArgs,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// Print the effective settings as JSON.
    Settings {
        /// Print only this key.
        #[arg(long)]
        key: Option<String>,

        #[command(flatten)]
        settings: SettingsArgs,
    },
    /// List blend modes and setting keys.
    List,
}

/// Splits `key=value`; the value is JSON when it parses, else a string.
fn parse_override(text: &str) -> Result<(String, Value), CliError> {
    let (key, raw) = text
        .split_once('=')
        .ok_or_else(|| CliError::Input(format!("invalid --set '{text}': expected KEY=VALUE")))?;
    let value =
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_owned()));
    Ok((key.trim().to_owned(), value))
}

fn load_settings(args: &SettingsArgs) -> Result<Settings, CliError> {
    let mut settings = match &args.file {
        Some(path) => read_settings_file(path)?,
        None => Settings::default(),
    };
    for text in &args.overrides {
        let (key, value) = parse_override(text)?;
        settings.apply(Setting::from_json(&key, &value).map_err(CliError::setting)?);
    }
    Ok(settings)
}

fn read_settings_file(path: &Path) -> Result<Settings, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("reading {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid settings in {}: {e}", path.display())))
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let modes: Vec<&str> = BlendMode::ALL.iter().map(|m| m.name()).collect();
            let keys: Vec<(&str, &str)> = SettingKey::all()
                .map(|k| (k.name(), k.policy().name()))
                .collect();
            if cli.json {
                let keys: Vec<Value> = keys
                    .iter()
                    .map(|(name, policy)| serde_json::json!({"name": name, "policy": policy}))
                    .collect();
                let info = serde_json::json!({
                    "blendModes": modes,
                    "settings": keys,
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Blend modes:");
                println!("  {}", modes.join(", "));
                println!("Settings:");
                for (name, policy) in keys {
                    println!("  {name:<24} {policy}");
                }
            }
        }
        Command::Settings { key, settings } => {
            let settings = load_settings(&settings)?;
            let value = match key {
                Some(name) => settings.get(&name).map_err(CliError::setting)?,
                None => serde_json::to_value(&settings)?,
            };
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Command::Render {
            width,
            height,
            dpr,
            frames,
            seed,
            settings,
            output,
        } => {
            let settings = load_settings(&settings)?;
            let scheduler = ManualScheduler::new();
            let mut sim = Simulator::new(
                Viewport::new(width, height, dpr),
                settings,
                seed,
                Box::new(scheduler),
            )?;

            // Every frame opens with an opaque clear, so only the last one
            // needs rasterizing.
            let mut frame = sim.frame();
            for _ in 0..frames {
                if let Some(next) = sim.tick() {
                    frame = next;
                }
            }
            let mut raster = Raster::new(frame.layout)?;
            raster.draw(&frame)?;
            gradient_field_raster::snapshot::write_png(&raster, &frame.filter, &output)?;
            sim.destroy();
            tracing::info!(
                width = raster.width(),
                height = raster.height(),
                frames,
                seed,
                output = %output.display(),
                "frame written"
            );

            if cli.json {
                let info = serde_json::json!({
                    "width": raster.width(),
                    "height": raster.height(),
                    "frames": frames,
                    "seed": seed,
                    "time": sim.time(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {}x{} ({frames} frames, seed {seed}) -> {}",
                    raster.width(),
                    raster.height(),
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradient_field_core::FadeoutMode;
    use serde_json::json;

    fn args(file: Option<PathBuf>, overrides: &[&str]) -> SettingsArgs {
        SettingsArgs {
            file,
            overrides: overrides.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn override_value_parses_as_json() {
        let (key, value) = parse_override("gradientCount=8").unwrap();
        assert_eq!(key, "gradientCount");
        assert_eq!(value, json!(8));
        assert_eq!(parse_override("radialGradientsEnabled=false").unwrap().1, json!(false));
    }

    #[test]
    fn override_value_falls_back_to_text() {
        assert_eq!(parse_override("blendMode=screen").unwrap().1, json!("screen"));
        assert_eq!(parse_override("backgroundColor=#112233").unwrap().1, json!("#112233"));
    }

    #[test]
    fn override_without_equals_is_input_error() {
        let err = parse_override("blendMode").unwrap_err();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn overrides_apply_in_order() {
        let s = load_settings(&args(None, &["gradientCount=3", "gradientCount=9"])).unwrap();
        assert_eq!(s.gradient_count, 9);
    }

    #[test]
    fn unknown_override_key_is_input_error() {
        let err = load_settings(&args(None, &["glow=1"])).err().unwrap();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn settings_file_fills_defaults_then_overrides_apply() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"fadeoutMode": "auto", "gradientCount": 2}"#).unwrap();
        let s = load_settings(&args(Some(path), &["gradientCount=4"])).unwrap();
        assert_eq!(s.fadeout_mode, FadeoutMode::Auto);
        assert_eq!(s.gradient_count, 4);
        assert_eq!(s.hue_start, Settings::default().hue_start);
    }

    #[test]
    fn missing_settings_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_settings(&args(Some(dir.path().join("nope.json")), &[]))
            .err()
            .unwrap();
        assert_eq!(err.exit_code(), 11);
    }

    #[test]
    fn malformed_settings_file_is_input_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = load_settings(&args(Some(path), &[])).err().unwrap();
        assert_eq!(err.exit_code(), 12);
    }

    #[test]
    fn render_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.png");
        let cli = Cli {
            json: true,
            command: Command::Render {
                width: 64.0,
                height: 32.0,
                dpr: 2.0,
                frames: 3,
                seed: 1,
                settings: args(None, &["blendMode=screen"]),
                output: output.clone(),
            },
        };
        run(cli).ok().unwrap();
        assert!(output.exists());
    }

    #[test]
    fn render_rejects_empty_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            json: false,
            command: Command::Render {
                width: 0.0,
                height: 32.0,
                dpr: 1.0,
                frames: 1,
                seed: 1,
                settings: args(None, &[]),
                output: dir.path().join("out.png"),
            },
        };
        assert_eq!(run(cli).err().unwrap().exit_code(), 10);
    }

    #[test]
    fn render_rejects_oversized_viewport() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli {
            json: false,
            command: Command::Render {
                width: 1e10,
                height: 32.0,
                dpr: 1.0,
                frames: 1,
                seed: 1,
                settings: args(None, &[]),
                output: dir.path().join("out.png"),
            },
        };
        assert_eq!(run(cli).err().unwrap().exit_code(), 10);
    }
}
