//! Property-based test generators using proptest.
//!
//! Provides strategies for generating queue items, batches, and operation
//! sequences that exercise segment rollover, head advancement, and
//! close/reopen recovery.

use proptest::prelude::*;

/// Strategy for generating valid queue items.
///
/// Items are non-empty so the identity codecs never produce a zero-length
/// payload.
pub fn item_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-z0-9]{1,16}").expect("Invalid regex")
}

/// Strategy for generating a batch of items.
pub fn item_batch_strategy(max_len: usize) -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(item_strategy(), 1..=max_len)
}

/// Strategy for generating segment capacities small enough to force
/// frequent rollover.
pub fn capacity_strategy() -> impl Strategy<Value = usize> {
    1usize..=8
}

/// One queue operation in a generated sequence.
#[derive(Debug, Clone)]
pub enum QueueOp {
    /// Enqueue one item.
    Enqueue(String),
    /// Enqueue a batch of items.
    EnqueueMany(Vec<String>),
    /// Dequeue one item.
    Dequeue,
    /// Dequeue up to the given number of items.
    DequeueMany(usize),
    /// Close the queue and reopen it from disk.
    Reopen,
}

/// Strategy for generating a single queue operation.
pub fn queue_op_strategy() -> impl Strategy<Value = QueueOp> {
    prop_oneof![
        3 => item_strategy().prop_map(QueueOp::Enqueue),
        2 => item_batch_strategy(6).prop_map(QueueOp::EnqueueMany),
        3 => Just(QueueOp::Dequeue),
        2 => (1usize..=6).prop_map(QueueOp::DequeueMany),
        1 => Just(QueueOp::Reopen),
    ]
}

/// Strategy for generating a sequence of queue operations.
pub fn op_sequence_strategy(
    min_ops: usize,
    max_ops: usize,
) -> impl Strategy<Value = Vec<QueueOp>> {
    prop::collection::vec(queue_op_strategy(), min_ops..max_ops)
}

/// Configuration for property tests.
#[derive(Debug, Clone)]
pub struct PropTestConfig {
    /// Number of test cases to run.
    pub cases: u32,
    /// Maximum shrink iterations.
    pub max_shrink_iters: u32,
}

impl Default for PropTestConfig {
    fn default() -> Self {
        Self {
            cases: 256,
            max_shrink_iters: 1000,
        }
    }
}

impl PropTestConfig {
    /// Creates a configuration for quick tests.
    #[must_use]
    pub fn quick() -> Self {
        Self {
            cases: 32,
            max_shrink_iters: 100,
        }
    }

    /// Converts to proptest config.
    #[must_use]
    pub fn to_proptest_config(&self) -> ProptestConfig {
        ProptestConfig {
            cases: self.cases,
            max_shrink_iters: self.max_shrink_iters,
            ..ProptestConfig::default()
        }
    }
}
