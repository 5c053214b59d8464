use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::debug;

use super::instructions::DrawInstruction;

/// Delays used to stage a render cycle, in milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Pacing {
    pub ring_step_ms: u64,
    pub tree_start_ms: u64,
    pub tree_step_ms: u64,
    pub first_hop_ms: u64,
    pub hop_step_ms: u64,
    pub trace_start_ms: u64,
    pub trace_step_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            ring_step_ms: 60,
            tree_start_ms: 3000,
            tree_step_ms: 120,
            first_hop_ms: 1700,
            hop_step_ms: 1200,
            trace_start_ms: 1200,
            trace_step_ms: 1300,
        }
    }
}

impl Pacing {
    /// No delays at all; every cue is due immediately.
    pub const fn immediate() -> Self {
        Self {
            ring_step_ms: 0,
            tree_start_ms: 0,
            tree_step_ms: 0,
            first_hop_ms: 0,
            hop_step_ms: 0,
            trace_start_ms: 0,
            trace_step_ms: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum CueAction {
    Draw(DrawInstruction),
    /// Raw trace text for the side panel.
    TraceLine(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cue {
    pub at: Duration,
    pub action: CueAction,
}

/// Fully materialized, time-ordered list of cues for one render cycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RenderPlan {
    cues: Vec<Cue>,
}

impl RenderPlan {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ring `i` (1-based) appears at `i * ring_step`.
    pub fn rings(mut self, rings: Vec<DrawInstruction>, pacing: &Pacing) -> Self {
        for (index, ring) in rings.into_iter().enumerate() {
            let at = Duration::from_millis(pacing.ring_step_ms * (index as u64 + 1));
            self.cues.push(Cue {
                at,
                action: CueAction::Draw(ring),
            });
        }
        self
    }

    /// Group `i` appears at `start + i * step`; instructions inside a group keep
    /// their order.
    pub fn groups(
        mut self,
        groups: Vec<Vec<DrawInstruction>>,
        start_ms: u64,
        step_ms: u64,
    ) -> Self {
        for (index, group) in groups.into_iter().enumerate() {
            let at = Duration::from_millis(start_ms + step_ms * index as u64);
            self.cues.extend(group.into_iter().map(|instruction| Cue {
                at,
                action: CueAction::Draw(instruction),
            }));
        }
        self
    }

    pub fn trace_lines(mut self, lines: &[String], pacing: &Pacing) -> Self {
        for (index, line) in lines.iter().enumerate() {
            let offset = pacing.trace_step_ms * index as u64;
            let at = Duration::from_millis(pacing.trace_start_ms + offset);
            self.cues.push(Cue {
                at,
                action: CueAction::TraceLine(line.clone()),
            });
        }
        self
    }

    /// Stable sort by time, so equal times keep insertion order.
    pub fn finish(mut self) -> Self {
        self.cues.sort_by_key(|cue| cue.at);
        self
    }

    pub fn cues(&self) -> &[Cue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn duration(&self) -> Duration {
        self.cues.last().map(|cue| cue.at).unwrap_or_default()
    }

    /// Prefix of cues due after `elapsed`.
    pub fn due(&self, elapsed: Duration) -> &[Cue] {
        let end = self.cues.partition_point(|cue| cue.at <= elapsed);
        &self.cues[..end]
    }

    pub fn draw_instructions(&self) -> impl Iterator<Item = &DrawInstruction> {
        self.cues.iter().filter_map(|cue| match &cue.action {
            CueAction::Draw(instruction) => Some(instruction),
            CueAction::TraceLine(_) => None,
        })
    }
}

struct ActiveCycle {
    generation: u64,
    plan: RenderPlan,
    started: Instant,
}

/// Plays one render plan at a time. Beginning a new cycle drops whatever the
/// previous one had not shown yet.
#[derive(Default)]
pub struct RenderSequencer {
    generation: u64,
    active: Option<ActiveCycle>,
}

impl RenderSequencer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn begin(&mut self, plan: RenderPlan, now: Instant) -> u64 {
        self.generation += 1;
        if let Some(previous) = self.active.take() {
            let shown = previous.plan.due(now.saturating_duration_since(previous.started)).len();
            debug!(
                generation = previous.generation,
                abandoned = previous.plan.len() - shown,
                "superseding render cycle"
            );
        }
        self.active = Some(ActiveCycle {
            generation: self.generation,
            plan,
            started: now,
        });
        self.generation
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.active
            .as_ref()
            .is_some_and(|active| active.generation == generation)
    }

    pub fn due(&self, now: Instant) -> &[Cue] {
        match &self.active {
            Some(active) => active.plan.due(now.saturating_duration_since(active.started)),
            None => &[],
        }
    }

    pub fn is_finished(&self, now: Instant) -> bool {
        self.active.as_ref().is_none_or(|active| {
            now.saturating_duration_since(active.started) >= active.plan.duration()
        })
    }

    /// Time until the next cue becomes due.
    pub fn next_wakeup(&self, now: Instant) -> Option<Duration> {
        let active = self.active.as_ref()?;
        let elapsed = now.saturating_duration_since(active.started);
        active
            .plan
            .cues()
            .iter()
            .find(|cue| cue.at > elapsed)
            .map(|cue| cue.at - elapsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Point;

    fn connect(x: f64) -> DrawInstruction {
        DrawInstruction::Connect {
            from: Point::new(0.0, 0.0),
            to: Point::new(x, 0.0),
        }
    }

    fn sample_plan() -> RenderPlan {
        let pacing = Pacing::default();
        RenderPlan::new()
            .rings(vec![connect(-1.0), connect(-2.0)], &pacing)
            .groups(vec![vec![connect(1.0), connect(1.5)], vec![connect(2.0)]], 1700, 1200)
            .trace_lines(&["1: 10.1.10.1".to_owned(), "2: 8.8.8.8".to_owned()], &pacing)
            .finish()
    }

    #[test]
    fn cues_are_time_ordered() {
        let plan = sample_plan();
        let times = plan
            .cues()
            .iter()
            .map(|cue| cue.at.as_millis())
            .collect::<Vec<_>>();
        assert_eq!(times, vec![60, 120, 1200, 1700, 1700, 2500, 2900]);
        assert_eq!(plan.duration(), Duration::from_millis(2900));
    }

    #[test]
    fn group_order_survives_sorting() {
        let plan = sample_plan();
        let due = plan.due(Duration::from_millis(1700));
        assert_eq!(due.len(), 5);
        assert_eq!(due[3].action, CueAction::Draw(connect(1.0)));
        assert_eq!(due[4].action, CueAction::Draw(connect(1.5)));
    }

    #[test]
    fn due_is_a_growing_prefix() {
        let plan = sample_plan();
        assert!(plan.due(Duration::ZERO).is_empty());
        assert_eq!(plan.due(Duration::from_millis(119)).len(), 1);
        assert_eq!(plan.due(Duration::from_secs(60)).len(), plan.len());
    }

    #[test]
    fn planning_is_deterministic() {
        assert_eq!(sample_plan(), sample_plan());
    }

    #[test]
    fn new_cycle_supersedes_the_old_one() {
        let start = Instant::now();
        let mut sequencer = RenderSequencer::new();

        let first = sequencer.begin(sample_plan(), start);
        assert!(sequencer.is_current(first));
        assert_eq!(sequencer.due(start + Duration::from_millis(130)).len(), 2);

        let replacement = RenderPlan::new().groups(vec![vec![connect(9.0)]], 500, 0).finish();
        let second = sequencer.begin(replacement, start + Duration::from_millis(200));
        assert!(!sequencer.is_current(first));
        assert!(sequencer.is_current(second));
        assert_eq!(sequencer.generation(), second);
        assert!(!sequencer.is_finished(start + Duration::from_millis(300)));

        // Nothing from the first plan shows up, even once its times pass.
        let later = start + Duration::from_secs(10);
        let due = sequencer.due(later);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].action, CueAction::Draw(connect(9.0)));
        assert!(sequencer.is_finished(later));
    }

    #[test]
    fn wakeup_points_at_next_cue() {
        let start = Instant::now();
        let mut sequencer = RenderSequencer::new();
        assert_eq!(sequencer.next_wakeup(start), None);

        sequencer.begin(sample_plan(), start);
        assert_eq!(
            sequencer.next_wakeup(start + Duration::from_millis(100)),
            Some(Duration::from_millis(20))
        );
        assert_eq!(sequencer.next_wakeup(start + Duration::from_secs(5)), None);
    }
}
