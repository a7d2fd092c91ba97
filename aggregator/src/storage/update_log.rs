use crate::message::UpdateMessage;

/// Append only record of the updates accepted in the open round.
///
/// The aggregator derives its accepted count from `count`, so implementations must
/// count exactly what they were given through `append` since the last `clear`.
pub trait UpdateLog: Send {
    /// Records an accepted update.
    ///
    /// # Arguments
    /// * `msg` - An update that was already merged into the accumulator.
    fn append(&mut self, msg: UpdateMessage);

    /// Returns the amount of updates recorded for the open round.
    fn count(&self) -> usize;

    /// Discards every record, opening a new round.
    fn clear(&mut self);
}
