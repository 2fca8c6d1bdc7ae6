use std::collections::{BTreeMap, HashMap};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TimerKind {
    ReloadComplete,
    SpeedBoostExpired,
    BotRespawn,
}

impl TimerKind {
    const ALL: [TimerKind; 3] = [
        TimerKind::ReloadComplete,
        TimerKind::SpeedBoostExpired,
        TimerKind::BotRespawn,
    ];
}

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerKey {
    pub kind: TimerKind,
    pub entity_id: String,
}

impl TimerKey {
    pub fn new(kind: TimerKind, entity_id: &str) -> Self {
        Self {
            kind,
            entity_id: entity_id.to_string(),
        }
    }
}

/// Deferred effects ordered by due time. At most one timer per key is
/// pending; scheduling an existing key moves it.
#[derive(Clone, Debug, Default)]
pub struct TimerQueue {
    queue: BTreeMap<(u64, u64), TimerKey>,
    index: HashMap<TimerKey, (u64, u64)>,
    seq: u64,
}

impl TimerQueue {
    pub fn schedule(&mut self, key: TimerKey, due_ms: u64) {
        self.cancel(&key);
        self.seq = self.seq.wrapping_add(1);
        let slot = (due_ms, self.seq);
        self.index.insert(key.clone(), slot);
        self.queue.insert(slot, key);
    }

    pub fn cancel(&mut self, key: &TimerKey) -> bool {
        match self.index.remove(key) {
            Some(slot) => {
                self.queue.remove(&slot);
                true
            }
            None => false,
        }
    }

    pub fn cancel_entity(&mut self, entity_id: &str) {
        for kind in TimerKind::ALL {
            self.cancel(&TimerKey::new(kind, entity_id));
        }
    }

    pub fn is_scheduled(&self, key: &TimerKey) -> bool {
        self.index.contains_key(key)
    }

    pub fn pending(&self, kind: TimerKind) -> usize {
        self.index.keys().filter(|key| key.kind == kind).count()
    }

    /// Removes and returns every timer due at or before `now_ms`, earliest
    /// first.
    pub fn pop_due(&mut self, now_ms: u64) -> Vec<TimerKey> {
        let mut due = Vec::new();
        while let Some((&slot, _)) = self.queue.first_key_value() {
            if slot.0 > now_ms {
                break;
            }
            if let Some(key) = self.queue.remove(&slot) {
                self.index.remove(&key);
                due.push(key);
            }
        }
        due
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
