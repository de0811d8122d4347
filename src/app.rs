use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::Context as _;
use eframe::egui;

use crate::config::Settings;
use crate::ui::ACCENT;
use crate::view::TextView;
use crate::window::EditorWindow;

/// Process-wide state shared by every window: settings and the fonts
/// loaded from disk.
pub struct AppContext {
    pub settings: Settings,
    settings_path: PathBuf,
    fonts: BTreeMap<String, Vec<u8>>,
}

impl AppContext {
    pub fn new(settings_path: PathBuf) -> Self {
        let settings = Settings::load_or_default(&settings_path);
        let mut app = Self {
            settings,
            settings_path,
            fonts: BTreeMap::new(),
        };

        let files = app.settings.font_files.clone();
        for path in &files {
            if let Err(e) = app.read_font(path) {
                log::warn!("Skipping font {}: {:#}", path.display(), e);
            }
        }
        if !app.families().contains(&app.settings.font_family) {
            log::warn!(
                "Font family {:?} is not available, using Monospace",
                app.settings.font_family
            );
            app.settings.font_family = "Monospace".to_string();
        }
        app
    }

    /// Built-in families followed by the loaded font files.
    pub fn families(&self) -> Vec<String> {
        let mut families = vec!["Monospace".to_string(), "Proportional".to_string()];
        families.extend(self.fonts.keys().cloned());
        families
    }

    fn read_font(&mut self, path: &Path) -> anyhow::Result<String> {
        let bytes = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .filter(|s| !s.is_empty())
            .with_context(|| format!("no file name in {}", path.display()))?;
        anyhow::ensure!(
            has_font_signature(&bytes),
            "{} is not a TrueType or OpenType font",
            path.display()
        );
        self.fonts.insert(name.clone(), bytes);
        Ok(name)
    }

    /// Register the loaded fonts with egui. Each one gets its own family,
    /// falling back to the built-in monospace glyphs.
    pub fn install_fonts(&self, ctx: &egui::Context) {
        let mut fonts = egui::FontDefinitions::default();
        let fallback = fonts
            .families
            .get(&egui::FontFamily::Monospace)
            .cloned()
            .unwrap_or_default();
        for (name, bytes) in &self.fonts {
            fonts
                .font_data
                .insert(name.clone(), egui::FontData::from_owned(bytes.clone()));
            let mut chain = vec![name.clone()];
            chain.extend(fallback.iter().cloned());
            fonts
                .families
                .insert(egui::FontFamily::Name(name.as_str().into()), chain);
        }
        ctx.set_fonts(fonts);
    }

    /// Load a TTF/OTF file, remember it in the settings and return its
    /// family name. The family is usable from the next frame on.
    pub fn load_font_file(&mut self, ctx: &egui::Context, path: &Path) -> anyhow::Result<String> {
        let family = self.read_font(path)?;
        self.install_fonts(ctx);
        if !self.settings.font_files.iter().any(|p| p == path) {
            self.settings.font_files.push(path.to_path_buf());
            self.persist();
        }
        log::info!("Loaded font {:?} from {}", family, path.display());
        Ok(family)
    }

    /// Store the view settings of `view` and write them to disk.
    pub fn remember(&mut self, view: &TextView) {
        view.store(&mut self.settings);
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = self.settings.save(&self.settings_path) {
            log::warn!("Failed to save settings: {:#}", e);
        }
    }
}

pub struct YunjiApp {
    context: AppContext,
    /// `windows[0]` draws into the root viewport.
    windows: Vec<EditorWindow>,
    /// The root window was asked to close while other windows were open;
    /// they are being closed first.
    quitting: bool,
}

impl YunjiApp {
    pub fn new(cc: &eframe::CreationContext<'_>, context: AppContext, file: Option<PathBuf>) -> Self {
        context.install_fonts(&cc.egui_ctx);
        setup_custom_style(&cc.egui_ctx);

        let mut first = EditorWindow::new(&context);
        if let Some(path) = file {
            first.open_path(&path);
        }
        Self {
            context,
            windows: vec![first],
            quitting: false,
        }
    }
}

impl eframe::App for YunjiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let mut new_windows = 0;

        let Some((root, others)) = self.windows.split_first_mut() else {
            return;
        };

        // Closing the root ends the process, so every other window gets to
        // ask about unsaved changes before the root goes.
        let root_close = ctx.input(|i| i.viewport().close_requested());
        if root_close && !others.is_empty() {
            ctx.send_viewport_cmd(egui::ViewportCommand::CancelClose);
            log::info!("Closing {} secondary window(s) before exit", others.len());
            for window in others.iter() {
                ctx.send_viewport_cmd_to(window.viewport_id(), egui::ViewportCommand::Close);
            }
            self.quitting = true;
        }
        root.defer_close = !others.is_empty();

        if root.show(ctx, &mut self.context).new_window {
            new_windows += 1;
        }

        let context = &mut self.context;
        let mut cancelled = false;
        for window in others.iter_mut() {
            let viewport = egui::ViewportBuilder::default()
                .with_title("Yunji")
                .with_inner_size([1000.0, 900.0]);
            ctx.show_viewport_immediate(window.viewport_id(), viewport, |ctx, _class| {
                let requests = window.show(ctx, context);
                new_windows += usize::from(requests.new_window);
                cancelled |= requests.close_cancelled;
            });
        }
        if cancelled && self.quitting {
            log::info!("Exit cancelled");
            self.quitting = false;
        }

        // The root stays in the list; it only goes with the process.
        let mut first = true;
        self.windows.retain(|w| {
            let keep = first || !w.is_closed();
            first = false;
            keep
        });

        if self.quitting && self.windows.len() == 1 && new_windows == 0 {
            self.quitting = false;
            ctx.send_viewport_cmd_to(egui::ViewportId::ROOT, egui::ViewportCommand::Close);
        }

        for _ in 0..new_windows {
            log::info!("Opening a new window");
            self.windows.push(EditorWindow::new(&self.context));
        }
    }
}

/// egui aborts on font data it cannot parse, so reject anything without a
/// TrueType/OpenType header up front.
fn has_font_signature(bytes: &[u8]) -> bool {
    matches!(
        bytes.get(..4),
        Some([0x00, 0x01, 0x00, 0x00]) | Some(b"OTTO") | Some(b"true") | Some(b"ttcf")
    )
}

fn setup_custom_style(ctx: &egui::Context) {
    ctx.set_visuals(egui::Visuals::light());

    let mut style = (*ctx.style()).clone();
    style.visuals.panel_fill = ACCENT;
    style.visuals.window_fill = egui::Color32::WHITE;
    style.visuals.selection.bg_fill = ACCENT;
    style.visuals.selection.stroke = egui::Stroke::new(1.0, egui::Color32::BLACK);
    ctx.set_style(style);
}
