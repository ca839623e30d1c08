use crate::shared::bounding_box::BoundingBox;
use crate::shared::oval_region::OvalRegion;

use super::dwell_policy::DwellPolicy;
use super::dwell_state::DwellState;

/// What a single tick did to the gate.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// No box had its center inside the oval; progress reset to zero.
    Absent,
    /// A face is in the oval and the threshold is not reached yet.
    Dwelling { accumulated_ms: u64 },
    /// Threshold reached on this tick: take the snapshot.
    Captured,
    /// A face is in the oval but a recent capture suppresses counting.
    CoolingDown,
}

impl TickOutcome {
    pub fn is_capture(&self) -> bool {
        matches!(self, TickOutcome::Captured)
    }

    /// Whether any face sat inside the oval on this tick.
    pub fn face_in_oval(&self) -> bool {
        !matches!(self, TickOutcome::Absent)
    }
}

/// True when any box has its center inside the oval.
pub fn any_contained(boxes: &[BoundingBox], oval: &OvalRegion) -> bool {
    boxes.iter().any(|b| oval.contains(b))
}

/// Pure tick transition.
///
/// The cooldown clock advances first, so a cooldown of `c` ms suppresses
/// the ticks that land strictly less than `c` ms after the capture.
/// Containment is evaluated once per tick: several qualifying boxes still
/// add a single tick period.
pub fn tick(
    state: DwellState,
    boxes: &[BoundingBox],
    oval: &OvalRegion,
    policy: &DwellPolicy,
) -> (DwellState, TickOutcome) {
    let period = policy.tick_period_ms();
    let mut next = state;

    if next.cooldown_active {
        next.cooldown_elapsed_ms = next.cooldown_elapsed_ms.saturating_add(period);
        if next.cooldown_elapsed_ms >= policy.cooldown_ms() {
            next.cooldown_active = false;
            next.cooldown_elapsed_ms = 0;
        }
    }

    if !any_contained(boxes, oval) {
        next.accumulated_ms = 0;
        return (next, TickOutcome::Absent);
    }

    if next.cooldown_active {
        next.accumulated_ms = 0;
        return (next, TickOutcome::CoolingDown);
    }

    next.accumulated_ms = next.accumulated_ms.saturating_add(period);
    if next.accumulated_ms < policy.threshold_ms() {
        let accumulated_ms = next.accumulated_ms;
        return (next, TickOutcome::Dwelling { accumulated_ms });
    }

    next.accumulated_ms = 0;
    if policy.has_cooldown() {
        next.cooldown_active = true;
        next.cooldown_elapsed_ms = 0;
    }
    (next, TickOutcome::Captured)
}

/// Owns the dwell state for one session, with its oval and policy.
#[derive(Clone, Debug)]
pub struct DwellGate {
    state: DwellState,
    policy: DwellPolicy,
    oval: OvalRegion,
}

impl DwellGate {
    pub fn new(policy: DwellPolicy, oval: OvalRegion) -> Self {
        Self {
            state: DwellState::new(),
            policy,
            oval,
        }
    }

    pub fn on_tick(&mut self, boxes: &[BoundingBox]) -> TickOutcome {
        let (next, outcome) = tick(self.state, boxes, &self.oval, &self.policy);
        self.state = next;
        outcome
    }

    pub fn reset(&mut self) {
        self.state = DwellState::new();
    }

    pub fn state(&self) -> DwellState {
        self.state
    }

    pub fn policy(&self) -> &DwellPolicy {
        &self.policy
    }

    pub fn oval(&self) -> &OvalRegion {
        &self.oval
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn oval() -> OvalRegion {
        OvalRegion::new(360.0, 280.0, 150.0, 200.0).unwrap()
    }

    fn centered_at(cx: f64, cy: f64) -> BoundingBox {
        BoundingBox::new(cx - 50.0, cy - 60.0, 100.0, 120.0)
    }

    fn inside() -> Vec<BoundingBox> {
        vec![centered_at(360.0, 280.0)]
    }

    fn outside() -> Vec<BoundingBox> {
        vec![centered_at(20.0, 20.0)]
    }

    fn no_cooldown() -> DwellPolicy {
        DwellPolicy::new(100, 3000, 0).unwrap()
    }

    /// Runs `frames` through a fresh gate and returns the 1-based ticks
    /// that captured.
    fn capture_ticks(policy: DwellPolicy, frames: &[Vec<BoundingBox>]) -> Vec<usize> {
        let mut gate = DwellGate::new(policy, oval());
        frames
            .iter()
            .enumerate()
            .filter(|(_, boxes)| gate.on_tick(boxes).is_capture())
            .map(|(i, _)| i + 1)
            .collect()
    }

    // ── Accumulation ─────────────────────────────────────────────────

    #[test]
    fn test_qualifying_tick_adds_one_period() {
        let (next, outcome) = tick(DwellState::new(), &inside(), &oval(), &no_cooldown());
        assert_eq!(next.accumulated_ms(), 100);
        assert_eq!(outcome, TickOutcome::Dwelling { accumulated_ms: 100 });
    }

    #[test]
    fn test_accumulator_non_decreasing_within_run() {
        let mut gate = DwellGate::new(no_cooldown(), oval());
        let mut last = 0;
        for _ in 0..29 {
            gate.on_tick(&inside());
            let now = gate.state().accumulated_ms();
            assert!(now >= last);
            last = now;
        }
        assert_eq!(last, 2900);
    }

    #[rstest]
    #[case::fresh(0)]
    #[case::midway(1500)]
    #[case::just_under_threshold(2900)]
    fn test_non_qualifying_tick_resets_to_zero(#[case] prior: u64) {
        let (next, outcome) = tick(DwellState::dwelling(prior), &outside(), &oval(), &no_cooldown());
        assert_eq!(next.accumulated_ms(), 0);
        assert_eq!(outcome, TickOutcome::Absent);
    }

    #[test]
    fn test_empty_detection_resets() {
        let (next, outcome) = tick(DwellState::dwelling(1200), &[], &oval(), &no_cooldown());
        assert_eq!(next.accumulated_ms(), 0);
        assert!(!outcome.face_in_oval());
    }

    #[test]
    fn test_several_qualifying_boxes_count_once() {
        let boxes = vec![centered_at(360.0, 280.0), centered_at(380.0, 300.0)];
        let (next, _) = tick(DwellState::new(), &boxes, &oval(), &no_cooldown());
        assert_eq!(next.accumulated_ms(), 100);
    }

    #[test]
    fn test_accumulator_saturates() {
        let policy = DwellPolicy::new(u64::MAX, u64::MAX, 0).unwrap();
        let (next, outcome) = tick(DwellState::dwelling(5), &inside(), &oval(), &policy);
        assert_eq!(outcome, TickOutcome::Captured);
        assert_eq!(next.accumulated_ms(), 0);
    }

    // ── Capture scenarios ────────────────────────────────────────────

    #[test]
    fn test_thirty_qualifying_ticks_capture_once_on_tick_thirty() {
        let frames = vec![inside(); 30];
        assert_eq!(capture_ticks(no_cooldown(), &frames), vec![30]);
        assert_eq!(capture_ticks(DwellPolicy::default(), &frames), vec![30]);
    }

    #[test]
    fn test_interrupted_run_starts_over() {
        let mut frames = vec![inside(); 29];
        frames.push(outside());
        frames.extend(vec![inside(); 30]);
        // 29 + 1 miss, then qualifying tick 30 of the second run is tick 60
        assert_eq!(capture_ticks(no_cooldown(), &frames), vec![60]);
    }

    #[test]
    fn test_boundary_center_counts_as_inside() {
        let frames = vec![vec![centered_at(360.0 + 150.0, 280.0)]; 30];
        assert_eq!(capture_ticks(no_cooldown(), &frames), vec![30]);
    }

    #[test]
    fn test_one_of_two_boxes_inside_qualifies() {
        let boxes = vec![centered_at(20.0, 20.0), centered_at(360.0, 280.0)];
        let (_, outcome) = tick(DwellState::new(), &boxes, &oval(), &no_cooldown());
        assert_eq!(outcome, TickOutcome::Dwelling { accumulated_ms: 100 });
    }

    #[rstest]
    #[case::exact_multiple(100, 3000, 30)]
    #[case::overshoot_fires_immediately(100, 250, 3)]
    #[case::long_dwell(100, 10_000, 100)]
    fn test_fires_at_first_tick_reaching_threshold(
        #[case] period: u64,
        #[case] threshold: u64,
        #[case] expected_tick: usize,
    ) {
        let policy = DwellPolicy::new(period, threshold, 0).unwrap();
        let frames = vec![inside(); expected_tick];
        assert_eq!(capture_ticks(policy, &frames), vec![expected_tick]);
    }

    #[test]
    fn test_capture_resets_accumulator() {
        let mut gate = DwellGate::new(no_cooldown(), oval());
        for _ in 0..30 {
            gate.on_tick(&inside());
        }
        assert_eq!(gate.state().accumulated_ms(), 0);
    }

    #[test]
    fn test_continuous_presence_without_cooldown_rearms_every_threshold() {
        let frames = vec![inside(); 90];
        assert_eq!(capture_ticks(no_cooldown(), &frames), vec![30, 60, 90]);
    }

    // ── Cooldown ─────────────────────────────────────────────────────

    #[test]
    fn test_cooldown_suppresses_following_ticks() {
        let mut gate = DwellGate::new(DwellPolicy::default(), oval());
        for _ in 0..30 {
            gate.on_tick(&inside());
        }
        assert!(gate.state().cooldown_active());

        // 500 ms cooldown at 100 ms ticks: ticks +1..+4 are suppressed
        for _ in 0..4 {
            assert_eq!(gate.on_tick(&inside()), TickOutcome::CoolingDown);
            assert_eq!(gate.state().accumulated_ms(), 0);
        }
        assert_eq!(
            gate.on_tick(&inside()),
            TickOutcome::Dwelling { accumulated_ms: 100 }
        );
        assert!(!gate.state().cooldown_active());
    }

    #[test]
    fn test_cooldown_delays_next_capture() {
        let frames = vec![inside(); 70];
        // Capture at 30, cooldown eats 31..=34, counting resumes at 35
        assert_eq!(capture_ticks(DwellPolicy::default(), &frames), vec![30, 64]);
    }

    #[test]
    fn test_cooldown_expires_even_when_face_leaves() {
        let mut gate = DwellGate::new(DwellPolicy::default(), oval());
        for _ in 0..30 {
            gate.on_tick(&inside());
        }
        for _ in 0..5 {
            assert_eq!(gate.on_tick(&outside()), TickOutcome::Absent);
        }
        assert!(!gate.state().cooldown_active());
    }

    #[test]
    fn test_no_cooldown_never_sets_flag() {
        let mut gate = DwellGate::new(no_cooldown(), oval());
        for _ in 0..30 {
            gate.on_tick(&inside());
        }
        assert!(!gate.state().cooldown_active());
    }

    // ── Reset and replay ─────────────────────────────────────────────

    #[test]
    fn test_reset_clears_progress_and_cooldown() {
        let mut gate = DwellGate::new(DwellPolicy::default(), oval());
        for _ in 0..30 {
            gate.on_tick(&inside());
        }
        gate.on_tick(&inside());
        gate.reset();
        assert_eq!(gate.state(), DwellState::new());
    }

    #[test]
    fn test_replay_after_reset_is_identical() {
        let mut frames = Vec::new();
        for i in 0..200 {
            frames.push(if i % 47 == 46 { outside() } else { inside() });
        }

        let mut gate = DwellGate::new(DwellPolicy::default(), oval());
        let first: Vec<TickOutcome> = frames.iter().map(|b| gate.on_tick(b)).collect();
        gate.reset();
        let second: Vec<TickOutcome> = frames.iter().map(|b| gate.on_tick(b)).collect();

        assert_eq!(first, second);
        assert!(first.iter().any(|o| o.is_capture()));
    }
}
