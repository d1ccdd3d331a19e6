// src/main.rs
use eframe::{egui, run_native, App, Frame, NativeOptions};
use egui::{Color32, ComboBox, TextureOptions};
use image::DynamicImage;
use rfd::FileDialog;
use std::path::PathBuf;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::thread;
use tracing::{error, info};

mod enhancer;
mod exporter;
mod image_loader;
mod overlay;
mod pipeline;
mod segmenter;

use exporter::{encode_png, ENHANCED_FILE_NAME, MASK_FILE_NAME};
use image_loader::ImageLoader;
use pipeline::{to_color_image, PipelineResult, ProcessingJob, RestorationOutput, RestorationPipeline};
use segmenter::Label;

const THEME_NAMES: &[&str] = &["Vellum Dark", "Vellum Light"];

pub struct VellumApp {
    image_loader: ImageLoader,

    // Current state
    original: Option<DynamicImage>,
    output: Option<Box<RestorationOutput>>,
    original_texture: Option<egui::TextureHandle>,
    enhanced_texture: Option<egui::TextureHandle>,
    overlay_texture: Option<egui::TextureHandle>,
    show_overlay: bool,
    status: Option<String>,
    processing: bool,
    zoom: f32,
    theme: usize,

    // Processing
    job_sender: Sender<ProcessingJob>,
    result_receiver: Receiver<PipelineResult>,
}

impl Default for VellumApp {
    fn default() -> Self {
        let (tx_job, rx_job) = channel::<ProcessingJob>();
        let (tx_res, rx_res) = channel::<PipelineResult>();

        // Worker thread for the restoration pipeline
        thread::spawn(move || {
            let restoration = RestorationPipeline::new();
            while let Ok(job) = rx_job.recv() {
                let result = restoration.process(job);
                let _ = tx_res.send(result);
            }
        });

        Self {
            image_loader: ImageLoader::new(),
            original: None,
            output: None,
            original_texture: None,
            enhanced_texture: None,
            overlay_texture: None,
            show_overlay: false,
            status: None,
            processing: false,
            zoom: 1.0,
            theme: 0,
            job_sender: tx_job,
            result_receiver: rx_res,
        }
    }
}

impl VellumApp {
    fn load_image(&mut self, ctx: &egui::Context, path: PathBuf) {
        match self.image_loader.load_image(&path) {
            Ok(image) => {
                let original_rgb = image.to_rgb8();
                self.original_texture = Some(ctx.load_texture(
                    "original_image",
                    to_color_image(&original_rgb),
                    TextureOptions::default(),
                ));
                self.original = Some(image.clone());
                self.output = None;
                self.enhanced_texture = None;
                self.overlay_texture = None;
                self.status = None;
                self.processing = true;
                let _ = self.job_sender.send(ProcessingJob { image });
                info!(path = %path.display(), "Queued manuscript for restoration");
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to load image");
                self.status = Some(format!("Failed to load {}: {}", path.display(), e));
            }
        }
    }

    fn receive_results(&mut self, ctx: &egui::Context) {
        if let Ok(result) = self.result_receiver.try_recv() {
            self.processing = false;
            match result {
                PipelineResult::Success(output) => {
                    self.enhanced_texture = Some(ctx.load_texture(
                        "enhanced_image",
                        to_color_image(&output.enhanced),
                        TextureOptions::default(),
                    ));
                    self.overlay_texture = Some(ctx.load_texture(
                        "overlay_image",
                        to_color_image(&output.overlay),
                        TextureOptions::default(),
                    ));
                    self.output = Some(output);
                    self.status = None;
                }
                PipelineResult::Error(e) => {
                    error!(error = %e, "Restoration pipeline failed");
                    self.status = Some(format!("Processing failed: {}", e));
                }
            }
        }
    }

    fn save_artifact(&mut self, image: &image::RgbImage, file_name: &str) {
        let path = match FileDialog::new().set_file_name(file_name).save_file() {
            Some(path) => path,
            None => return,
        };
        let result = encode_png(image)
            .map_err(|e| e.to_string())
            .and_then(|bytes| std::fs::write(&path, bytes).map_err(|e| e.to_string()));
        match result {
            Ok(()) => info!(path = %path.display(), "Artifact saved"),
            Err(e) => {
                error!(path = %path.display(), error = %e, "Failed to save artifact");
                self.status = Some(format!("Failed to save {}: {}", path.display(), e));
            }
        }
    }

    fn handle_zoom_input(&mut self, ctx: &egui::Context) {
        let scroll = ctx.input(|i| i.scroll_delta);
        let mods = ctx.input(|i| i.modifiers);
        if mods.command && scroll.y != 0.0 {
            let factor = 1.0 + scroll.y * 0.01;
            self.zoom = (self.zoom * factor).clamp(0.1, 10.0);
        }
    }

    fn apply_theme(&self, ctx: &egui::Context) {
        match self.theme {
            0 => {
                let mut v = egui::Visuals::dark();
                v.panel_fill = Color32::from_rgb(25, 25, 25);
                ctx.set_visuals(v);
            }
            1 => {
                let mut v = egui::Visuals::light();
                v.panel_fill = Color32::from_rgb(248, 245, 235);
                ctx.set_visuals(v);
            }
            _ => {}
        }
    }

    fn render_top_panel(&mut self, ctx: &egui::Context) {
        let mut pending_download: Option<(image::RgbImage, &'static str)> = None;

        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Open…").clicked() {
                    let supported_extensions = self.image_loader.get_supported_extensions();
                    let extension_refs: Vec<&str> =
                        supported_extensions.iter().map(|s| s.as_str()).collect();
                    if let Some(path) = FileDialog::new()
                        .add_filter("Manuscript images", &extension_refs)
                        .pick_file()
                    {
                        self.load_image(ctx, path);
                    }
                }

                ui.separator();

                let has_output = self.output.is_some();
                if ui
                    .add_enabled(has_output, egui::Button::new("Download Enhanced"))
                    .clicked()
                {
                    if let Some(output) = &self.output {
                        pending_download = Some((output.enhanced.clone(), ENHANCED_FILE_NAME));
                    }
                }
                if ui
                    .add_enabled(has_output, egui::Button::new("Download Mask"))
                    .clicked()
                {
                    if let Some(output) = &self.output {
                        pending_download = Some((output.mask_image.clone(), MASK_FILE_NAME));
                    }
                }

                ui.separator();

                ComboBox::from_label("Theme")
                    .selected_text(THEME_NAMES[self.theme])
                    .show_ui(ui, |ui| {
                        for (i, &name) in THEME_NAMES.iter().enumerate() {
                            ui.selectable_value(&mut self.theme, i, name);
                        }
                    });

                ui.separator();

                if self.original.is_some() {
                    ui.label(format!("Zoom: {:.1}%", self.zoom * 100.0));
                }
                if self.processing {
                    ui.spinner();
                    ui.label("Processing…");
                }
            });
        });

        if let Some((image, file_name)) = pending_download {
            self.save_artifact(&image, file_name);
        }
    }

    fn render_legend(&self, ui: &mut egui::Ui) {
        let output = match &self.output {
            Some(output) => output,
            None => return,
        };
        let counts = output.mask.class_counts();
        let total = counts.total().max(1) as f64;

        ui.horizontal(|ui| {
            ui.label("Legend:");
            for (label, count) in [
                (Label::Text, counts.text),
                (Label::Illustration, counts.illustration),
                (Label::Marginalia, counts.marginalia),
            ] {
                let rgb = label.color().0;
                ui.colored_label(
                    Color32::from_rgb(rgb[0], rgb[1], rgb[2]),
                    format!("■ {} ({:.1}%)", label.name(), count as f64 / total * 100.0),
                );
            }
        });
        ui.label(format!(
            "Thresholds: median {:.1}, p75 {:.1}",
            output.thresholds.median, output.thresholds.p75
        ));
    }

    fn render_main_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            if let Some(status) = &self.status {
                ui.colored_label(Color32::from_rgb(230, 80, 80), status);
                ui.separator();
            }

            if self.original_texture.is_none() {
                self.render_welcome_screen(ui);
                return;
            }

            egui::ScrollArea::both()
                .auto_shrink([false, false])
                .show(ui, |ui| {
                    ui.heading("Original vs. Enhanced");
                    ui.columns(2, |cols| {
                        cols[0].label("Before");
                        if let Some(tex) = &self.original_texture {
                            let size = tex.size_vec2() * self.zoom;
                            cols[0].image((tex.id(), size));
                        }
                        cols[1].label("After");
                        if let Some(tex) = &self.enhanced_texture {
                            let size = tex.size_vec2() * self.zoom;
                            cols[1].image((tex.id(), size));
                        }
                    });

                    ui.separator();

                    ui.checkbox(&mut self.show_overlay, "Show Segmentation Overlay");

                    if self.show_overlay {
                        ui.heading("Enhanced with Segmentation Overlay");
                        self.render_legend(ui);
                        if let Some(tex) = &self.overlay_texture {
                            let size = tex.size_vec2() * self.zoom;
                            ui.image((tex.id(), size));
                        }
                    } else {
                        ui.heading("Enhanced Manuscript");
                        if let Some(tex) = &self.enhanced_texture {
                            let size = tex.size_vec2() * self.zoom;
                            ui.image((tex.id(), size));
                        }
                    }
                });
        });
    }

    fn render_welcome_screen(&self, ui: &mut egui::Ui) {
        ui.centered_and_justified(|ui| {
            ui.vertical_centered(|ui| {
                ui.heading("From Faded to Readable");
                ui.add_space(20.0);
                ui.label("Open a manuscript image to begin");
                ui.add_space(10.0);
                ui.label("Supported formats: JPEG, PNG, TIFF");
            });
        });
    }
}

impl App for VellumApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut Frame) {
        self.handle_zoom_input(ctx);
        self.receive_results(ctx);
        self.apply_theme(ctx);

        self.render_top_panel(ctx);
        self.render_main_panel(ctx);

        // Keep polling while the worker is busy
        if self.processing {
            ctx.request_repaint_after(std::time::Duration::from_millis(50));
        }
    }
}

fn main() {
    tracing_subscriber::fmt::init();

    let native_options = NativeOptions {
        initial_window_size: Some(egui::Vec2::new(1200.0, 800.0)),
        ..Default::default()
    };

    run_native(
        "Vellum Manuscript Restoration",
        native_options,
        Box::new(|_cc| Box::new(VellumApp::default())),
    )
    .unwrap();
}
