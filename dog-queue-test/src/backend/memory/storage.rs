use std::collections::{HashMap, VecDeque};

use crate::{JobRecord, QueueName};

/// In-memory queue storage: queue name -> records in insertion order
#[derive(Debug, Default, Clone)]
pub struct QueueStore {
    queues: HashMap<QueueName, VecDeque<JobRecord>>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self {
            queues: HashMap::new(),
        }
    }

    /// Snapshot of a queue; an unknown queue is created empty
    pub fn get(&mut self, name: &QueueName) -> Vec<JobRecord> {
        self.get_mut(name).iter().cloned().collect()
    }

    /// Mutable access, creating the queue on first use
    pub fn get_mut(&mut self, name: &QueueName) -> &mut VecDeque<JobRecord> {
        self.queues.entry(name.clone()).or_default()
    }

    /// Every queue name seen so far, sorted
    pub fn names(&self) -> Vec<QueueName> {
        let mut names: Vec<QueueName> = self.queues.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn push(&mut self, name: &QueueName, record: JobRecord) {
        self.get_mut(name).push_back(record);
    }

    /// Remove and return the oldest record
    pub fn shift(&mut self, name: &QueueName) -> Option<JobRecord> {
        self.queues.get_mut(name).and_then(VecDeque::pop_front)
    }

    /// Copy of `count` records starting at `start`
    pub fn slice(&self, name: &QueueName, start: usize, count: usize) -> Vec<JobRecord> {
        self.queues
            .get(name)
            .map(|queue| queue.iter().skip(start).take(count).cloned().collect())
            .unwrap_or_default()
    }

    /// Delete every record matching `predicate`, keeping the order of the rest
    pub fn remove_where<F>(&mut self, name: &QueueName, mut predicate: F) -> usize
    where
        F: FnMut(&JobRecord) -> bool,
    {
        match self.queues.get_mut(name) {
            Some(queue) => {
                let before = queue.len();
                queue.retain(|record| !predicate(record));
                before - queue.len()
            }
            None => 0,
        }
    }

    pub fn len(&self, name: &QueueName) -> usize {
        self.queues.get(name).map_or(0, VecDeque::len)
    }

    /// True when no queue holds a record
    pub fn is_empty(&self) -> bool {
        self.queues.values().all(VecDeque::is_empty)
    }

    /// Drop every queue and record
    pub fn clear(&mut self) {
        self.queues.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(n: i64) -> JobRecord {
        JobRecord::new("Person", vec![json!(n)])
    }

    #[test]
    fn test_unknown_queue_reads_empty() {
        let mut store = QueueStore::new();
        assert_eq!(store.len(&"my_queue".into()), 0);
        assert!(store.names().is_empty());

        assert!(store.get(&"my_queue".into()).is_empty());
        assert_eq!(store.names(), vec![QueueName::from("my_queue")]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_mut_creates_queue() {
        let mut store = QueueStore::new();
        store.get_mut(&"my_queue".into()).push_back(record(1));
        assert_eq!(store.names(), vec![QueueName::from("my_queue")]);
        assert!(!store.is_empty());
    }

    #[test]
    fn test_shift_and_slice() {
        let mut store = QueueStore::new();
        let queue = QueueName::from("people");
        for n in 0..4 {
            store.push(&queue, record(n));
        }

        assert_eq!(store.slice(&queue, 1, 2), vec![record(1), record(2)]);
        assert_eq!(store.slice(&queue, 3, 10), vec![record(3)]);
        assert!(store.slice(&queue, 9, 1).is_empty());
        assert_eq!(store.len(&queue), 4);

        assert_eq!(store.shift(&queue), Some(record(0)));
        assert_eq!(store.len(&queue), 3);
    }

    #[test]
    fn test_remove_where_counts_removed() {
        let mut store = QueueStore::new();
        let queue = QueueName::from("people");
        store.push(&queue, record(1));
        store.push(&queue, record(2));
        store.push(&queue, record(1));

        let removed = store.remove_where(&queue, |r| r.args == vec![json!(1)]);
        assert_eq!(removed, 2);
        assert_eq!(store.get(&queue), vec![record(2)]);
        assert_eq!(store.remove_where(&"missing".into(), |_| true), 0);
    }

    #[test]
    fn test_clear_empties_everything() {
        let mut store = QueueStore::new();
        store.push(&"a".into(), record(1));
        store.push(&"b".into(), record(2));
        store.clear();
        assert!(store.is_empty());
        assert!(store.names().is_empty());
        assert!(store.get(&"a".into()).is_empty());
    }

    proptest! {
        #[test]
        fn prop_shift_is_fifo(values in proptest::collection::vec(any::<i64>(), 0..32)) {
            let mut store = QueueStore::new();
            let queue = QueueName::from("fifo");
            for v in &values {
                store.push(&queue, record(*v));
            }

            let mut drained = Vec::new();
            while let Some(r) = store.shift(&queue) {
                drained.push(r);
            }

            let expected: Vec<JobRecord> = values.iter().map(|v| record(*v)).collect();
            prop_assert_eq!(drained, expected);
        }

        #[test]
        fn prop_remove_where_keeps_relative_order(values in proptest::collection::vec(0i64..4, 0..32)) {
            let mut store = QueueStore::new();
            let queue = QueueName::from("order");
            for v in &values {
                store.push(&queue, record(*v));
            }

            let removed = store.remove_where(&queue, |r| r.args == vec![json!(0)]);
            let kept: Vec<JobRecord> = values.iter().filter(|v| **v != 0).map(|v| record(*v)).collect();
            prop_assert_eq!(removed, values.len() - kept.len());
            prop_assert_eq!(store.get(&queue), kept);
        }
    }
}
