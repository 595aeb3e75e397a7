//! Aggregated statistics snapshot.
//!
//! Snapshots are taken on the producer thread (or after the threads have
//! joined) and rendered either human-readable or as JSON.

use std::fmt;

use serde::Serialize;

use feed_itch::DecoderStats;
use feed_mold::SessionStats;

use crate::pump::PumpStats;

/// Everything worth printing after a run.
#[derive(Debug, Clone, Serialize)]
pub struct FeedStats {
    pub pump: PumpStats,
    pub session: SessionStats,
    pub decoder: DecoderStats,
    pub queue: QueueStats,
    /// Filled in once the consumer thread has joined.
    pub events_consumed: u64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct QueueStats {
    pub depth: usize,
    pub capacity: usize,
    pub available: usize,
}

impl fmt::Display for FeedStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Feed Handler Statistics ===")?;
        writeln!(f, "Packets processed:    {}", self.pump.packets_processed)?;
        writeln!(f, "Bytes processed:      {}", self.pump.bytes_processed)?;
        writeln!(f, "Invalid packets:      {}", self.pump.invalid_packets)?;
        writeln!(f, "Events pushed:        {}", self.pump.messages_pushed)?;
        writeln!(f, "Ring-full drops:      {}", self.pump.buffer_full_count)?;
        writeln!(f, "Events consumed:      {}", self.events_consumed)?;
        writeln!(f)?;
        writeln!(f, "--- Session ---")?;
        writeln!(f, "Packets received:     {}", self.session.packets_received)?;
        writeln!(f, "Messages received:    {}", self.session.messages_received)?;
        writeln!(f, "Gaps detected:        {}", self.session.gaps_detected)?;
        writeln!(f, "Heartbeats:           {}", self.session.heartbeats_received)?;
        writeln!(f, "Invalid packets:      {}", self.session.invalid_packets)?;
        writeln!(f)?;
        writeln!(f, "--- Decoder ---")?;
        writeln!(f, "Total messages:       {}", self.decoder.total_messages)?;
        writeln!(f, "Add orders:           {}", self.decoder.add_orders)?;
        writeln!(f, "Executions:           {}", self.decoder.order_executed)?;
        writeln!(f, "Cancels:              {}", self.decoder.order_cancelled)?;
        writeln!(f, "Deletes:              {}", self.decoder.order_deleted)?;
        writeln!(f, "Replaces:             {}", self.decoder.order_replaced)?;
        writeln!(f, "Trades:               {}", self.decoder.trades)?;
        writeln!(f, "Other messages:       {}", self.decoder.other_messages)?;
        writeln!(f, "Unknown messages:     {}", self.decoder.unknown_messages)?;
        writeln!(f, "Unknown side bytes:   {}", self.decoder.unknown_side)?;
        writeln!(f)?;
        writeln!(f, "--- Ring ---")?;
        writeln!(f, "Depth:                {}", self.queue.depth)?;
        writeln!(f, "Capacity:             {}", self.queue.capacity)?;
        write!(f, "Available:            {}", self.queue.available)
    }
}
