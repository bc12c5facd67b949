use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use anyhow::Context as _;
use eframe::egui::{self, Context, Vec2};

use crate::config::SessionConfig;
use crate::explore::Direction;
use crate::network::{LoadOptions, Network, load_network};
use crate::refine::RefineOptions;
use crate::session::Session;

mod graph;
mod render_utils;
mod ui;

pub struct NurvizApp {
    config: SessionConfig,
    startup_focus: Option<String>,
    state: AppState,
}

enum AppState {
    Picking {
        notice: Option<String>,
    },
    Loading {
        path: PathBuf,
        rx: Receiver<Result<Network, String>>,
    },
    Ready(Box<ViewModel>),
    Error {
        path: PathBuf,
        message: String,
    },
}

struct ViewModel {
    session: Session,
    source: PathBuf,
    search: String,
    search_cache: Option<SearchMatchCache>,
    depth: i64,
    direction: Direction,
    refine_options: RefineOptions,
    status: Option<String>,
    pan: Vec2,
    zoom: f32,
    fit_pending: bool,
    drawn_revision: Option<u64>,
    open_requested: bool,
    show_fps_bar: bool,
    fps_current: f32,
    fps_samples: VecDeque<f32>,
}

struct SearchMatchCache {
    query: String,
    matches: Vec<SearchMatch>,
}

#[derive(Clone)]
struct SearchMatch {
    id: String,
    label: String,
    score: i64,
}

fn spawn_load(path: PathBuf, options: LoadOptions) -> Receiver<Result<Network, String>> {
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = load_network(&path, &options)
            .with_context(|| format!("could not open {}", path.display()))
            .map_err(|error| format!("{error:#}"));
        let _ = tx.send(result);
    });

    rx
}

fn pick_network_file(start_dir: Option<&Path>) -> Option<PathBuf> {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Open network")
        .add_filter("Network", &["nur", "json"])
        .add_filter("All files", &["*"]);
    if let Some(dir) = start_dir {
        dialog = dialog.set_directory(dir);
    }
    dialog.pick_file()
}

impl NurvizApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        config: SessionConfig,
        network_path: Option<PathBuf>,
        startup_focus: Option<String>,
    ) -> Self {
        let state = match network_path {
            Some(path) => Self::start_load(path, config.load),
            None => AppState::Picking { notice: None },
        };

        Self {
            config,
            startup_focus,
            state,
        }
    }

    fn start_load(path: PathBuf, options: LoadOptions) -> AppState {
        tracing::info!(path = %path.display(), "loading network");
        AppState::Loading {
            rx: spawn_load(path.clone(), options),
            path,
        }
    }

    fn ready(&mut self, network: Network, path: PathBuf) -> AppState {
        match Session::new(network, &self.config) {
            Ok(session) => {
                let focus = self.startup_focus.take();
                AppState::Ready(Box::new(ViewModel::new(session, path, focus)))
            }
            Err(error) => AppState::Error {
                path,
                message: error.to_string(),
            },
        }
    }
}

impl eframe::App for NurvizApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;
        let mut loaded = None;

        match &mut self.state {
            AppState::Picking { notice } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Choose a network file");
                        ui.add_space(6.0);
                        ui.label("Compressed (.nur) or plain (.json) network documents.");
                        if let Some(notice) = notice.as_deref() {
                            ui.add_space(6.0);
                            ui.colored_label(egui::Color32::LIGHT_RED, notice);
                        }
                        ui.add_space(10.0);
                        if ui.button("Open network…").clicked() {
                            match pick_network_file(None) {
                                Some(path) => {
                                    transition = Some(Self::start_load(path, self.config.load));
                                }
                                None => {
                                    *notice = Some("No file chosen; a network is required.".to_owned());
                                }
                            }
                        }
                    });
                });
            }
            AppState::Loading { path, rx } => {
                match rx.try_recv() {
                    Ok(Ok(network)) => loaded = Some((network, path.clone())),
                    Ok(Err(message)) => {
                        tracing::warn!(path = %path.display(), %message, "network load failed");
                        transition = Some(AppState::Error {
                            path: path.clone(),
                            message,
                        });
                    }
                    Err(TryRecvError::Empty) => ctx.request_repaint(),
                    Err(TryRecvError::Disconnected) => {
                        transition = Some(AppState::Error {
                            path: path.clone(),
                            message: "Background load worker disconnected".to_owned(),
                        });
                    }
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading network...");
                        ui.small(path.display().to_string());
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
            }
            AppState::Error { path, message } => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load network");
                    ui.add_space(6.0);
                    ui.label(message.as_str());
                    ui.add_space(10.0);
                    ui.horizontal(|ui| {
                        if ui.button("Retry").clicked() {
                            transition = Some(Self::start_load(path.clone(), self.config.load));
                        }
                        if ui.button("Pick another file").clicked() {
                            transition = Some(match pick_network_file(path.parent()) {
                                Some(path) => Self::start_load(path, self.config.load),
                                None => AppState::Picking { notice: None },
                            });
                        }
                    });
                });
            }
            AppState::Ready(model) => {
                model.show(ctx);

                if std::mem::take(&mut model.open_requested)
                    && let Some(path) = pick_network_file(model.source.parent())
                {
                    model.session.stop_refinement();
                    transition = Some(Self::start_load(path, self.config.load));
                }
            }
        }

        if let Some((network, path)) = loaded {
            transition = Some(self.ready(network, path));
        }
        if let Some(next_state) = transition {
            self.state = next_state;
        }
    }
}
