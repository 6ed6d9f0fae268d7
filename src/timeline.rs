use std::sync::{Arc, Mutex};

use tutor_realtime_types::{ConversationTurn, TurnSide};

struct TimelineShared {
    turns: Mutex<Vec<ConversationTurn>>,
    // Latest assigned sequence; consumers watch this to auto-scroll.
    growth: tokio::sync::watch::Sender<u64>,
}

/// Append-only conversation log merging typed and voice-sourced turns.
/// `append` is the only mutation; turns are never reordered or deleted.
/// Cheap to clone, all clones share one log.
#[derive(Clone)]
pub struct Timeline {
    shared: Arc<TimelineShared>,
}

impl Timeline {
    pub fn new() -> Self {
        let (growth, _) = tokio::sync::watch::channel(0);
        Self {
            shared: Arc::new(TimelineShared {
                turns: Mutex::new(Vec::new()),
                growth,
            }),
        }
    }

    /// Append one turn, assigning the next sequence number, and publish the
    /// new latest sequence to watchers.
    pub fn append(&self, author: &str, content: &str, side: TurnSide) -> ConversationTurn {
        let turn = {
            let mut turns = match self.shared.turns.lock() {
                Ok(turns) => turns,
                Err(poisoned) => poisoned.into_inner(),
            };
            let sequence = turns.len() as u64 + 1;
            let turn = ConversationTurn::new(author, content, side, sequence);
            turns.push(turn.clone());
            turn
        };
        self.shared.growth.send_replace(turn.sequence());
        turn
    }

    pub fn turns(&self) -> Vec<ConversationTurn> {
        match self.shared.turns.lock() {
            Ok(turns) => turns.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn len(&self) -> usize {
        match self.shared.turns.lock() {
            Ok(turns) => turns.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Receiver carrying the latest sequence number. Starts at 0 (empty);
    /// every append bumps it, which is the consumer's cue to scroll to the
    /// newest turn.
    pub fn growth(&self) -> tokio::sync::watch::Receiver<u64> {
        self.shared.growth.subscribe()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequences_are_strictly_increasing_in_arrival_order() {
        let timeline = Timeline::new();
        timeline.append("You", "hi", TurnSide::User);
        timeline.append("assistant", "hello", TurnSide::Assistant);
        timeline.append("You", "explain entropy", TurnSide::User);

        let turns = timeline.turns();
        assert_eq!(turns.len(), 3);
        for (i, turn) in turns.iter().enumerate() {
            assert_eq!(turn.sequence(), i as u64 + 1);
        }
        assert_eq!(turns[0].content(), "hi");
        assert_eq!(turns[1].side(), TurnSide::Assistant);
        assert_eq!(turns[2].content(), "explain entropy");
    }

    #[test]
    fn clones_share_one_log() {
        let timeline = Timeline::new();
        let clone = timeline.clone();
        timeline.append("You", "from original", TurnSide::User);
        clone.append("assistant", "from clone", TurnSide::Assistant);

        assert_eq!(timeline.len(), 2);
        assert_eq!(clone.turns()[1].sequence(), 2);
    }

    #[tokio::test]
    async fn growth_signal_tracks_the_latest_sequence() {
        let timeline = Timeline::new();
        let mut growth = timeline.growth();
        assert_eq!(*growth.borrow(), 0);

        timeline.append("You", "hi", TurnSide::User);
        growth.changed().await.unwrap();
        assert_eq!(*growth.borrow_and_update(), 1);

        timeline.append("assistant", "hello", TurnSide::Assistant);
        growth.changed().await.unwrap();
        assert_eq!(*growth.borrow_and_update(), 2);
    }
}
