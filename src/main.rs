#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")] // Hide console window on Windows in release

use std::path::PathBuf;

use clap::Parser;
use eframe::egui;

use yunji::config::default_settings_path;
use yunji::{AppContext, YunjiApp};

#[derive(Parser, Debug)]
#[command(name = "yunji", version, about = "A small plain-text editor")]
struct Args {
    /// File to open at startup
    file: Option<PathBuf>,

    /// Settings file to use instead of the per-user default
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
}

/// A teal page with a darker fold, drawn so the binary carries no assets.
fn window_icon() -> egui::IconData {
    const SIZE: u32 = 32;
    let mut rgba = Vec::with_capacity((SIZE * SIZE * 4) as usize);
    for y in 0..SIZE {
        for x in 0..SIZE {
            let border = x < 2 || y < 2 || x >= SIZE - 2 || y >= SIZE - 2;
            let fold = x + (SIZE - y) > SIZE + 20;
            let pixel = if border || fold {
                [0x2E, 0x7D, 0x70, 0xFF]
            } else if y % 6 == 0 && (6..SIZE - 6).contains(&x) {
                [0x99, 0x66, 0x00, 0xFF]
            } else {
                [0xA4, 0xDD, 0xD3, 0xFF]
            };
            rgba.extend_from_slice(&pixel);
        }
    }
    egui::IconData {
        rgba,
        width: SIZE,
        height: SIZE,
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let settings_path = args.config.unwrap_or_else(default_settings_path);
    log::info!("Using settings at {}", settings_path.display());
    let context = AppContext::new(settings_path);

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_title("Yunji")
            .with_inner_size([1000.0, 900.0])
            .with_position([200.0, 100.0])
            .with_min_inner_size([300.0, 220.0])
            .with_icon(window_icon()),
        ..Default::default()
    };

    eframe::run_native(
        "Yunji",
        native_options,
        Box::new(move |cc| Ok(Box::new(YunjiApp::new(cc, context, args.file)))),
    )
    .map_err(|e| anyhow::anyhow!("failed to start the editor: {e}"))
}
