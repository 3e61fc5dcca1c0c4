//! End-to-end queue scenarios exercising rollover, persistence, batch
//! operations, and capacity changes across reopen.

use std::path::Path;

use conveyor_codec::Utf8Codec;
use conveyor_core::{Queue, QueueError, QueueOptions};
use tempfile::tempdir;

fn open(folder: &Path, capacity: usize) -> Queue<String, Utf8Codec> {
    Queue::open(QueueOptions::new(folder, Utf8Codec).max_objects_per_segment(capacity)).unwrap()
}

fn enqueue_all(queue: &Queue<String, Utf8Codec>, items: &[&str]) {
    for item in items {
        queue.enqueue((*item).to_string()).unwrap();
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| (*s).to_string()).collect()
}

fn segment_files(folder: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(folder)
        .unwrap()
        .filter_map(|entry| {
            let name = entry.unwrap().file_name().to_str()?.to_string();
            name.ends_with(".queue").then_some(name)
        })
        .collect();
    names.sort();
    names
}

#[test]
fn basic_interleaving() {
    let dir = tempdir().unwrap();
    let queue = open(dir.path(), 2);

    enqueue_all(&queue, &["a", "b", "c", "d"]);
    assert_eq!(queue.dequeue().unwrap(), "a");
    assert_eq!(queue.dequeue().unwrap(), "b");
    assert_eq!(queue.dequeue().unwrap(), "c");
    queue.enqueue("e".to_string()).unwrap();
    assert_eq!(queue.dequeue().unwrap(), "d");
    assert_eq!(queue.dequeue().unwrap(), "e");
    assert!(matches!(queue.dequeue(), Err(QueueError::Empty)));
}

#[test]
fn persist_across_reopen() {
    let dir = tempdir().unwrap();
    {
        let queue = open(dir.path(), 2);
        enqueue_all(&queue, &["a", "b", "c", "d", "e"]);
        queue.close().unwrap();
    }

    let queue = open(dir.path(), 2);
    for expected in ["a", "b", "c", "d", "e"] {
        assert_eq!(queue.dequeue().unwrap(), expected);
    }
}

#[test]
fn batch_operations_across_segments() {
    let dir = tempdir().unwrap();
    let queue = open(dir.path(), 2);

    queue.enqueue_many(strings(&["a", "b", "c", "d", "e"])).unwrap();
    assert_eq!(queue.dequeue_many(2).unwrap(), strings(&["a", "b"]));
    assert_eq!(queue.dequeue_many(4).unwrap(), strings(&["c", "d", "e"]));

    queue
        .enqueue_many(strings(&["a", "b", "c", "d", "e", "f"]))
        .unwrap();
    assert_eq!(queue.dequeue_many(3).unwrap(), strings(&["a", "b", "c"]));
    assert_eq!(queue.dequeue().unwrap(), "d");
    assert_eq!(queue.dequeue_many(1).unwrap(), strings(&["e"]));
    queue.enqueue_many(strings(&["g"])).unwrap();
    assert_eq!(queue.dequeue_many(2).unwrap(), strings(&["f", "g"]));
}

#[test]
fn capacity_change_across_reopen() {
    let dir = tempdir().unwrap();
    {
        let queue = open(dir.path(), 2);
        enqueue_all(&queue, &["a", "b", "c", "d", "e"]);
        queue.close().unwrap();
    }

    // Segments written under capacity 2 keep it; new segments use 5.
    let queue = open(dir.path(), 5);
    assert_eq!(queue.dequeue_many(2).unwrap(), strings(&["a", "b"]));
    queue.enqueue_many(strings(&["a", "b", "c", "d", "e"])).unwrap();
    assert_eq!(queue.dequeue_many(4).unwrap(), strings(&["c", "d", "e", "a"]));
    assert_eq!(queue.dequeue_many(3).unwrap(), strings(&["b", "c", "d"]));
    assert_eq!(queue.dequeue_many(2).unwrap(), strings(&["e"]));
}

#[test]
fn empty_dequeue_on_fresh_folder() {
    let dir = tempdir().unwrap();
    let queue = open(dir.path(), 2);

    assert!(matches!(queue.dequeue(), Err(QueueError::Empty)));
    queue.enqueue("x".to_string()).unwrap();
    assert_eq!(queue.dequeue().unwrap(), "x");
    assert!(matches!(queue.dequeue(), Err(QueueError::Empty)));
}

#[test]
fn dequeue_many_on_empty_queue_errors() {
    let dir = tempdir().unwrap();
    let queue = open(dir.path(), 2);
    assert!(matches!(queue.dequeue_many(3), Err(QueueError::Empty)));
}

#[test]
fn segment_files_span_head_to_tail() {
    let dir = tempdir().unwrap();
    let queue = open(dir.path(), 2);

    enqueue_all(&queue, &["a", "b", "c", "d", "e"]);
    assert_eq!(
        segment_files(dir.path()),
        vec!["00001.queue", "00002.queue", "00003.queue"]
    );

    queue.dequeue_many(4).unwrap();
    assert_eq!(segment_files(dir.path()), vec!["00003.queue"]);

    // Draining the last segment replaces it with a fresh, higher-numbered
    // one; old numbers are never reused.
    queue.enqueue("f".to_string()).unwrap();
    assert_eq!(queue.dequeue().unwrap(), "e");
    assert_eq!(queue.dequeue().unwrap(), "f");
    assert_eq!(segment_files(dir.path()), vec!["00004.queue"]);
}

#[test]
fn flushed_items_survive_drop_without_close() {
    let dir = tempdir().unwrap();
    {
        let queue = Queue::open(
            QueueOptions::new(dir.path(), Utf8Codec)
                .max_objects_per_segment(2)
                .always_flush(true),
        )
        .unwrap();
        enqueue_all(&queue, &["a", "b", "c"]);
        // No close: simulate a crash by dropping all in-memory state.
    }

    let queue = open(dir.path(), 2);
    for expected in ["a", "b", "c"] {
        assert_eq!(queue.dequeue().unwrap(), expected);
    }
}

#[test]
fn mixed_singles_and_batches_keep_order() {
    let dir = tempdir().unwrap();
    let queue = open(dir.path(), 3);

    queue.enqueue("a".to_string()).unwrap();
    queue.enqueue_many(strings(&["b", "c", "d", "e"])).unwrap();
    queue.enqueue("f".to_string()).unwrap();

    assert_eq!(queue.dequeue_many(3).unwrap(), strings(&["a", "b", "c"]));
    assert_eq!(queue.dequeue().unwrap(), "d");
    assert_eq!(queue.dequeue_many(10).unwrap(), strings(&["e", "f"]));
}

#[test]
fn reopen_mid_drain_resumes_from_middle_segment() {
    let dir = tempdir().unwrap();
    {
        let queue = open(dir.path(), 1);
        enqueue_all(&queue, &["a", "b", "c", "d"]);
        assert_eq!(queue.dequeue().unwrap(), "a");
        queue.close().unwrap();
    }

    // Head #2, middle #3, tail #4 on disk; the middle segment is only
    // opened once the head drains down to it.
    let queue = open(dir.path(), 1);
    for expected in ["b", "c", "d"] {
        assert_eq!(queue.dequeue().unwrap(), expected);
    }
    assert!(matches!(queue.dequeue(), Err(QueueError::Empty)));
}
