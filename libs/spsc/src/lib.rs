//! # Lock-Free SPSC Ring Buffer
//!
//! Bounded single-producer/single-consumer queue for the feed pipeline.
//! The producer thread (session + decoder) pushes normalized events; the
//! consumer thread pops them. No locks, no allocation after construction.
//!
//! ## Design
//!
//! 1. Cache-line padding between the producer and consumer indices to
//!    prevent false sharing (the dominant cost in a naive ring).
//! 2. Power-of-two capacity so index advance is a mask, not a modulo.
//! 3. Acquire-release ordering: the producer's release store of `head`
//!    publishes the slot write; the consumer's acquire load observes it.
//!    Nothing stronger is required on any architecture.
//! 4. One slot is always left empty so `head == tail` means empty and
//!    `head + 1 == tail` means full, with no separate occupancy flag.
//! 5. Elements must be `Copy`: the consumer reads the slot by value and no
//!    destruction ever has to be coordinated across threads.

mod ring;

pub use ring::RingBuffer;
