/// Progress of the dwell gate between ticks.
///
/// `accumulated_ms` is how long a qualifying face has continuously been
/// in the oval. The cooldown flag clears itself once `cooldown_elapsed_ms`
/// reaches the policy's cooldown.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DwellState {
    pub(crate) accumulated_ms: u64,
    pub(crate) cooldown_active: bool,
    pub(crate) cooldown_elapsed_ms: u64,
}

impl DwellState {
    pub fn new() -> Self {
        Self::default()
    }

    /// A state partway through a dwell, outside any cooldown.
    pub fn dwelling(accumulated_ms: u64) -> Self {
        Self {
            accumulated_ms,
            ..Self::default()
        }
    }

    pub fn accumulated_ms(&self) -> u64 {
        self.accumulated_ms
    }

    pub fn cooldown_active(&self) -> bool {
        self.cooldown_active
    }
}
