use super::UpdateLog;
use crate::message::UpdateMessage;

/// An `UpdateLog` that keeps the accepted updates of the open round in memory.
#[derive(Debug, Default)]
pub struct InMemoryUpdateLog {
    updates: Vec<UpdateMessage>,
}

impl InMemoryUpdateLog {
    /// Creates a new empty `InMemoryUpdateLog`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the updates recorded for the open round, in arrival order.
    pub fn updates(&self) -> &[UpdateMessage] {
        &self.updates
    }
}

impl UpdateLog for InMemoryUpdateLog {
    fn append(&mut self, msg: UpdateMessage) {
        self.updates.push(msg);
    }

    fn count(&self) -> usize {
        self.updates.len()
    }

    fn clear(&mut self) {
        self.updates.clear();
    }
}

#[cfg(test)]
mod tests {
    use ndarray::{ArrayD, IxDyn};

    use super::*;

    #[test]
    fn append_count_clear() {
        let mut log = InMemoryUpdateLog::new();
        assert_eq!(log.count(), 0);

        let msg = UpdateMessage::whole(ArrayD::ones(IxDyn(&[2])));
        log.append(msg.clone());
        log.append(msg.clone());

        assert_eq!(log.count(), 2);
        assert_eq!(log.updates(), [msg.clone(), msg]);

        log.clear();
        assert_eq!(log.count(), 0);
        assert!(log.updates().is_empty());
    }
}
