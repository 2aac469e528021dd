mod app;

use std::path::PathBuf;

use anyhow::{anyhow, bail, Context, Result};
use eframe::egui;
use text_layer::LayerConfig;

const USAGE: &str = "Usage: text-layer <image.png|jpg|tif> [--config <file.toml>]";

struct Args {
    image_path: PathBuf,
    config_path: Option<PathBuf>,
}

fn parse_args() -> Result<Args> {
    let mut image_path = None;
    let mut config_path = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let path = args.next().context("--config needs a file")?;
                config_path = Some(PathBuf::from(path));
            }
            "--help" | "-h" => bail!("{USAGE}"),
            _ if image_path.is_none() => image_path = Some(PathBuf::from(arg)),
            other => bail!("unexpected argument `{other}`\n{USAGE}"),
        }
    }
    let image_path = image_path.ok_or_else(|| anyhow!("{USAGE}"))?;
    Ok(Args {
        image_path,
        config_path,
    })
}

fn main() -> Result<()> {
    text_layer::init_logging()?;

    let args = match parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };
    if !args.image_path.exists() {
        eprintln!("File not found: {}", args.image_path.display());
        std::process::exit(1);
    }

    let config = LayerConfig::load(args.config_path.as_deref()).context("loading config")?;

    let title = format!(
        "text-layer - {}",
        args.image_path
            .file_name()
            .unwrap_or_default()
            .to_str()
            .unwrap_or("")
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_title(&title),
        ..Default::default()
    };

    let image_path = args.image_path;
    eframe::run_native(
        &title,
        options,
        Box::new(
            move |_cc| -> Result<Box<dyn eframe::App>, Box<dyn std::error::Error + Send + Sync>> {
                let app = app::TextLayerApp::new(image_path, config)?;
                Ok(Box::new(app))
            },
        ),
    )
    .map_err(|e| anyhow!("viewer exited with an error: {e}"))
}
