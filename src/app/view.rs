use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use eframe::egui::{self, Align, Context, Layout, RichText, Ui};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;
use hop_radar::config::RadarConfig;
use hop_radar::render::{
    Cue, CueAction, DrawInstruction, RenderSequencer, Surface, plan_capture_cycle,
    plan_tree_cycle, tree_root,
};
use hop_radar::snapshot::Snapshot;
use tracing::{debug, info};

use super::canvas::{CanvasState, draw_radar};

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum ViewMode {
    /// Replay captures one at a time.
    Path,
    /// Show the merged hop tree.
    Tree,
}

/// What the running cycle was built from.
struct CycleInfo {
    generation: u64,
    snapshot: Arc<Snapshot>,
    title: String,
    capture_index: Option<usize>,
}

pub(super) struct ViewModel {
    snapshot: Arc<Snapshot>,
    config: Arc<RadarConfig>,
    mode: ViewMode,
    sequencer: RenderSequencer,
    cycle: Option<CycleInfo>,
    capture_index: usize,
    online: bool,
    next_rotation: Instant,
    canvas: CanvasState,
    search: String,
}

/// Rotation deadline; intervals too large for `Instant` park it a year out.
fn rotation_after(now: Instant, interval: Duration) -> Instant {
    now.checked_add(interval)
        .unwrap_or_else(|| now + Duration::from_secs(365 * 24 * 60 * 60))
}

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| {
            matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase())
        })
}

impl ViewModel {
    const SURFACE: Surface = Surface::SCREEN;

    pub(super) fn new(snapshot: Arc<Snapshot>, config: Arc<RadarConfig>, mode: ViewMode) -> Self {
        let now = Instant::now();
        let mut model = Self {
            snapshot,
            next_rotation: rotation_after(now, config.trace_interval()),
            config,
            mode,
            sequencer: RenderSequencer::new(),
            cycle: None,
            capture_index: 0,
            online: false,
            canvas: CanvasState::default(),
            search: String::new(),
        };
        model.detect_live_capture();
        model.start_cycle(now);
        model
    }

    /// Newer snapshot for the next cycle. The running cycle keeps its own.
    pub(super) fn replace_snapshot(&mut self, snapshot: Arc<Snapshot>) {
        debug!(captures = snapshot.captures.len(), "snapshot replaced");
        self.snapshot = snapshot;
        if self.capture_index >= self.snapshot.captures.len() {
            self.capture_index = 0;
        }
        self.detect_live_capture();
    }

    /// Jumps to the first capture recorded within the live window the first time
    /// one shows up.
    fn detect_live_capture(&mut self) {
        if self.online {
            return;
        }
        if let Some(index) = self
            .snapshot
            .first_live(SystemTime::now(), self.config.live_window())
        {
            info!(capture = %self.snapshot.captures[index].id, "live capture found");
            self.capture_index = index;
            self.online = true;
        }
    }

    fn start_cycle(&mut self, now: Instant) {
        let snapshot = Arc::clone(&self.snapshot);
        let (plan, title, capture_index) = match self.mode {
            ViewMode::Path => {
                let Some(capture) = snapshot.captures.get(self.capture_index) else {
                    self.sequencer.clear();
                    self.cycle = None;
                    return;
                };
                let plan = plan_capture_cycle(
                    capture,
                    &self.config,
                    &Self::SURFACE,
                    Some(&snapshot.geocoder),
                );
                (
                    plan,
                    format!("Trace route ({})", capture.id),
                    Some(self.capture_index),
                )
            }
            ViewMode::Tree => {
                let Some(root) = tree_root(&snapshot.graph, &self.config) else {
                    self.sequencer.clear();
                    self.cycle = None;
                    return;
                };
                let plan = plan_tree_cycle(&snapshot.graph, root, &self.config, &Self::SURFACE);
                (plan, format!("Hop tree from {root}"), None)
            }
        };

        debug!(cues = plan.len(), title = %title, "starting render cycle");
        let generation = self.sequencer.begin(plan, now);
        self.cycle = Some(CycleInfo {
            generation,
            snapshot,
            title,
            capture_index,
        });
    }

    /// Moves on to the next capture, wrapping around to the oldest one and
    /// dropping the live status when the end is reached.
    fn advance(&mut self, now: Instant, reload_requested: &mut bool) {
        self.capture_index += 1;
        if self.capture_index >= self.snapshot.captures.len() {
            self.capture_index = 0;
            self.online = false;
        }
        self.next_rotation = rotation_after(now, self.config.trace_interval());
        *reload_requested = true;
        self.start_cycle(now);
    }

    pub(super) fn show(
        &mut self,
        ctx: &Context,
        captures_dir: &Path,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        let now = Instant::now();
        if now >= self.next_rotation {
            self.advance(now, reload_requested);
        }

        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                self.draw_top_bar(ui, now, captures_dir, reload_requested, is_reloading);
            });

        let cues = self.sequencer.due(now);
        let title = self
            .cycle
            .as_ref()
            .filter(|cycle| self.sequencer.is_current(cycle.generation))
            .map(|cycle| cycle.title.as_str())
            .unwrap_or("No captures");

        egui::SidePanel::left("content")
            .resizable(true)
            .default_width(340.0)
            .show(ctx, |ui| match self.mode {
                ViewMode::Path => draw_hop_table(ui, self.cycle.as_ref()),
                ViewMode::Tree => {
                    draw_tree_details(ui, self.cycle.as_ref(), &self.canvas, &mut self.search)
                }
            });

        egui::SidePanel::right("trace")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| draw_trace_lines(ui, title, cues));

        let highlighted = search_matches(cues, self.search.trim());
        let center = Self::SURFACE.center;
        egui::CentralPanel::default().show(ctx, |ui| {
            draw_radar(ui, &mut self.canvas, cues, center, &highlighted);
        });

        let until_rotation = self.next_rotation.saturating_duration_since(now);
        let wakeup = self
            .sequencer
            .next_wakeup(now)
            .map_or(until_rotation, |next| next.min(until_rotation));
        ctx.request_repaint_after(wakeup);
    }

    fn draw_top_bar(
        &mut self,
        ui: &mut Ui,
        now: Instant,
        captures_dir: &Path,
        reload_requested: &mut bool,
        is_reloading: bool,
    ) {
        ui.horizontal(|ui| {
            ui.heading("hop-radar");
            ui.separator();

            let previous_mode = self.mode;
            ui.selectable_value(&mut self.mode, ViewMode::Path, "Captures");
            ui.selectable_value(&mut self.mode, ViewMode::Tree, "Hop tree");
            if self.mode != previous_mode {
                self.canvas.selected = None;
                self.start_cycle(now);
            }
            ui.separator();

            ui.label(format!("dir: {}", captures_dir.display()));
            ui.label(format!("captures: {}", self.snapshot.captures.len()));
            ui.label(format!("hops: {}", self.snapshot.graph.node_count()));
            ui.label(format!("links: {}", self.snapshot.graph.edge_count()));
            let progress = if self.sequencer.is_finished(now) { "done" } else { "drawing" };
            ui.label(format!("cycle {} ({progress})", self.sequencer.generation()));

            if ui.button("Replay").clicked() {
                self.start_cycle(now);
            }
            if self.mode == ViewMode::Path && ui.button("Next capture").clicked() {
                self.advance(now, reload_requested);
            }
            let reload_button =
                ui.add_enabled(!is_reloading, egui::Button::new("Reload captures"));
            if reload_button.clicked() {
                *reload_requested = true;
            }

            ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                if self.online {
                    ui.label(RichText::new("● live").color(egui::Color32::from_rgb(40, 160, 60)));
                } else {
                    let offline = RichText::new("● Showing offline data")
                        .color(egui::Color32::from_rgb(200, 40, 40));
                    ui.label(offline);
                }
            });
        });
    }
}

fn draw_hop_table(ui: &mut Ui, cycle: Option<&CycleInfo>) {
    ui.heading("Geo IP Data");
    ui.add_space(6.0);

    let playing = cycle.and_then(|cycle| cycle.capture_index.map(|index| (cycle, index)));
    let Some((cycle, index)) = playing else {
        ui.label("No capture is playing.");
        return;
    };
    let Some(capture) = cycle.snapshot.captures.get(index) else {
        return;
    };

    egui::ScrollArea::vertical().show(ui, |ui| {
        for hop in capture.filtered_hops() {
            ui.small(hop.fields().join(", "));
        }
    });
}

fn draw_tree_details(
    ui: &mut Ui,
    cycle: Option<&CycleInfo>,
    canvas: &CanvasState,
    search: &mut String,
) {
    ui.heading("Hop Details");
    ui.add_space(6.0);
    ui.horizontal(|ui| {
        ui.label("Search");
        ui.text_edit_singleline(search);
    });
    ui.separator();

    let (Some(cycle), Some(selected)) = (cycle, canvas.selected.as_ref()) else {
        ui.label("Select a hop on the radar.");
        return;
    };
    let graph = &cycle.snapshot.graph;
    let Some(node) = graph.get(&selected.label) else {
        ui.label("Selected hop is not part of this snapshot.");
        return;
    };

    ui.label(RichText::new(selected.label.as_str()).strong());
    ui.label(format!("Parent: {}", node.parent.label()));
    ui.label(format!("Branches: {}", node.branches.len()));
    for branch in &node.branches {
        ui.small(format!("→ {branch}"));
    }

    ui.separator();
    match graph.path_from_root(&selected.label) {
        Some(path) => {
            ui.label(RichText::new("Path from capture root").strong());
            ui.small(path.join(" → "));
        }
        None => {
            ui.label("No clean path back to a capture root.");
        }
    }
}

fn draw_trace_lines(ui: &mut Ui, title: &str, cues: &[Cue]) {
    ui.heading(title);
    ui.add_space(6.0);
    egui::ScrollArea::vertical().show(ui, |ui| {
        for cue in cues {
            if let CueAction::TraceLine(line) = &cue.action {
                ui.monospace(line.as_str());
            }
        }
    });
}

fn search_matches<'a>(cues: &'a [Cue], query: &str) -> HashSet<&'a str> {
    if query.is_empty() {
        return HashSet::new();
    }

    let matcher = SkimMatcherV2::default();
    cues.iter()
        .filter_map(|cue| match &cue.action {
            CueAction::Draw(DrawInstruction::PlaceNode { id, label, .. })
                if fuzzy_match_score(&matcher, label, query).is_some() =>
            {
                Some(id.as_str())
            }
            _ => None,
        })
        .collect()
}
