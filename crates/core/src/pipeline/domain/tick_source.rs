/// Drives the session loop at a fixed cadence.
///
/// `wait_next` blocks until the next tick is due and returns `false` once
/// the source is finished. Missed ticks are not replayed.
pub trait TickSource: Send {
    fn wait_next(&mut self) -> bool;
}
