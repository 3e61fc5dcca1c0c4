//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

/// Generates a deterministic payload of the given size.
pub fn payload(size: usize) -> Vec<u8> {
    (0..size).map(|i| (i % 251 + 1) as u8).collect()
}

/// Generates a batch of deterministic payloads.
pub fn payload_batch(count: usize, size: usize) -> Vec<Vec<u8>> {
    (0..count).map(|_| payload(size)).collect()
}
