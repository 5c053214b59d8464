use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use eframe::egui::{self, Context};
use hop_radar::capture::DirectorySource;
use hop_radar::config::RadarConfig;
use hop_radar::snapshot::Snapshot;
use tracing::{info, warn};

mod canvas;
mod render_utils;
mod view;

pub use view::ViewMode;

use view::ViewModel;

pub struct RadarApp {
    source: DirectorySource,
    config: Arc<RadarConfig>,
    mode: ViewMode,
    state: AppState,
    reload_rx: Option<Receiver<Result<Snapshot, String>>>,
}

enum AppState {
    Loading {
        rx: Receiver<Result<Snapshot, String>>,
    },
    Ready(Box<ViewModel>),
    Error(String),
}

impl RadarApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        source: DirectorySource,
        config: RadarConfig,
        mode: ViewMode,
    ) -> Self {
        let state = Self::start_load(source.clone());
        Self {
            source,
            config: Arc::new(config),
            mode,
            state,
            reload_rx: None,
        }
    }

    fn spawn_load(source: DirectorySource) -> Receiver<Result<Snapshot, String>> {
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let result = Snapshot::collect(&source).map_err(|error| format!("{error:#}"));
            let _ = tx.send(result);
        });

        rx
    }

    fn start_load(source: DirectorySource) -> AppState {
        AppState::Loading {
            rx: Self::spawn_load(source),
        }
    }
}

impl eframe::App for RadarApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        let mut transition = None;

        match &mut self.state {
            AppState::Loading { rx } => {
                if let Ok(result) = rx.try_recv() {
                    transition = Some(match result {
                        Ok(snapshot) => {
                            info!(captures = snapshot.captures.len(), "snapshot ready");
                            AppState::Ready(Box::new(ViewModel::new(
                                Arc::new(snapshot),
                                Arc::clone(&self.config),
                                self.mode,
                            )))
                        }
                        Err(error) => AppState::Error(error),
                    });
                }

                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.vertical_centered(|ui| {
                        ui.add_space(120.0);
                        ui.heading("Loading traceroute captures...");
                        ui.add_space(8.0);
                        ui.spinner();
                    });
                });
                ctx.request_repaint();
            }
            AppState::Error(error) => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.heading("Failed to load traceroute captures");
                    ui.add_space(6.0);
                    ui.label(error.as_str());
                    ui.add_space(10.0);
                    if ui.button("Retry").clicked() {
                        transition = Some(Self::start_load(self.source.clone()));
                    }
                });
            }
            AppState::Ready(model) => {
                let mut reload_requested = false;
                let is_reloading = self.reload_rx.is_some();
                model.show(
                    ctx,
                    self.source.uploads_dir(),
                    &mut reload_requested,
                    is_reloading,
                );

                if reload_requested && self.reload_rx.is_none() {
                    self.reload_rx = Some(Self::spawn_load(self.source.clone()));
                }

                if let Some(rx) = self.reload_rx.take() {
                    match rx.try_recv() {
                        // A reload swaps the snapshot for the next cycle only; the
                        // running cycle keeps the one it started with.
                        Ok(Ok(snapshot)) => model.replace_snapshot(Arc::new(snapshot)),
                        Ok(Err(error)) => warn!("capture reload failed: {error}"),
                        Err(TryRecvError::Empty) => {
                            self.reload_rx = Some(rx);
                        }
                        Err(TryRecvError::Disconnected) => {
                            warn!("background load worker disconnected");
                        }
                    }
                }
            }
        }

        if let Some(next_state) = transition {
            self.reload_rx = None;
            self.state = next_state;
        }
    }
}
