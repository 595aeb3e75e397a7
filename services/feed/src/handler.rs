//! Feed handler lifecycle: threads, ingress modes, shutdown.
//!
//! Two long-running threads at most: the producer (whichever ingress mode
//! is active, running the session/decoder inline) and the consumer
//! (draining the ring). Cancellation is one shared atomic flag, written
//! with release and polled with acquire; on clear the producer stops after
//! the current datagram and the consumer drains whatever is left before
//! exiting.

use std::net::UdpSocket;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::{info, warn};

use feed_mold::SessionState;
use feed_spsc::RingBuffer;
use feed_types::Event;

use crate::config::FeedConfig;
use crate::error::{FeedError, Result};
use crate::pcap::PcapReader;
use crate::pump::PacketPump;
use crate::stats::{FeedStats, QueueStats};

/// What the consumer saw, reported once it has joined.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsumerReport {
    pub events_consumed: u64,
}

/// Owns the ring, the producer-side pump, and the consumer thread.
pub struct FeedHandler {
    config: FeedConfig,
    queue: Arc<RingBuffer<Event>>,
    pump: PacketPump,
    running: Arc<AtomicBool>,
    consumer: Option<JoinHandle<u64>>,
    events_consumed: u64,
}

impl FeedHandler {
    pub fn new(config: FeedConfig) -> Self {
        let queue = Arc::new(RingBuffer::new(config.feed.queue_capacity));
        let pump = PacketPump::new(Arc::clone(&queue));
        FeedHandler {
            config,
            queue,
            pump,
            running: Arc::new(AtomicBool::new(true)),
            consumer: None,
            events_consumed: 0,
        }
    }

    /// The shared cancellation flag; clear it (release) to stop both
    /// threads. Handed to the signal handler by the binary.
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Direct access to the producer-side pump, e.g. to feed
    /// retransmissions or single packets.
    pub fn pump_mut(&mut self) -> &mut PacketPump {
        &mut self.pump
    }

    /// Process one MoldUDP64 UDP payload. Producer thread only.
    pub fn process_packet(&mut self, payload: &[u8]) -> bool {
        self.pump.process_datagram(payload)
    }

    /// Spawn the consumer thread. It busy-drains the ring with a pause
    /// hint between empty polls and exits once the running flag clears
    /// and the ring is drained.
    pub fn start_consumer(&mut self) {
        assert!(self.consumer.is_none(), "consumer already running");

        let queue = Arc::clone(&self.queue);
        let running = Arc::clone(&self.running);
        let pin = self
            .config
            .cores
            .pin
            .then_some(self.config.cores.consumer);

        let handle = std::thread::Builder::new()
            .name("feed-consumer".into())
            .spawn(move || {
                if let Some(core) = pin {
                    pin_to_core(core);
                }

                let mut consumed: u64 = 0;
                loop {
                    while let Some(event) = queue.try_pop() {
                        // Downstream integration point: book building,
                        // strategy, persistence. Here the event is only
                        // accounted.
                        let _ = event;
                        consumed += 1;
                    }
                    if !running.load(Ordering::Acquire) {
                        break;
                    }
                    std::hint::spin_loop();
                }

                // final drain after the flag cleared
                while let Some(_event) = queue.try_pop() {
                    consumed += 1;
                }
                consumed
            })
            .expect("failed to spawn consumer thread");

        self.consumer = Some(handle);
    }

    /// Clear the running flag and join the consumer.
    pub fn stop(&mut self) -> ConsumerReport {
        self.running.store(false, Ordering::Release);
        if let Some(handle) = self.consumer.take() {
            match handle.join() {
                Ok(consumed) => self.events_consumed = consumed,
                Err(_) => warn!("consumer thread panicked"),
            }
        }
        ConsumerReport {
            events_consumed: self.events_consumed,
        }
    }

    /// Replay a pcap capture. Returns the number of frames accepted by the
    /// session.
    pub fn process_pcap_file(&mut self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).map_err(|e| FeedError::io(path.display().to_string(), e))?;

        if self.config.cores.pin {
            pin_to_core(self.config.cores.producer);
        }

        let mut reader = PcapReader::new(&data)?;
        let mut accepted: u64 = 0;
        while let Some(record) = reader.next_record() {
            if !self.running.load(Ordering::Acquire) {
                break;
            }
            if self.pump.process_frame(record.frame) {
                accepted += 1;
            }
        }

        info!(
            path = %path.display(),
            frames = accepted,
            "pcap replay complete"
        );
        Ok(accepted)
    }

    /// Replay a raw ITCH capture (2-byte big-endian length framing, no
    /// MoldUDP64). Returns the number of messages decoded.
    pub fn process_itch_file(&mut self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let data =
            std::fs::read(path).map_err(|e| FeedError::io(path.display().to_string(), e))?;

        if self.config.cores.pin {
            pin_to_core(self.config.cores.producer);
        }

        let decoded = self.pump.process_itch_chunk(&data) as u64;
        info!(
            path = %path.display(),
            messages = decoded,
            "raw ITCH replay complete"
        );
        Ok(decoded)
    }

    /// Live ingress: receive MoldUDP64 datagrams on the configured port
    /// until the running flag clears or the session terminates. Returns
    /// the number of packets accepted.
    pub fn run_live(&mut self) -> Result<u64> {
        let addr = format!("0.0.0.0:{}", self.config.feed.listen_port);
        let socket = UdpSocket::bind(&addr).map_err(|e| FeedError::io(addr, e))?;
        self.run_live_on(socket)
    }

    /// Live ingress on an already-bound socket.
    pub fn run_live_on(&mut self, socket: UdpSocket) -> Result<u64> {
        let addr = socket
            .local_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| "<unbound>".into());
        // short timeout so the running flag is polled even on a quiet feed
        socket
            .set_read_timeout(Some(Duration::from_millis(100)))
            .map_err(|e| FeedError::io(addr.clone(), e))?;

        if self.config.cores.pin {
            pin_to_core(self.config.cores.producer);
        }

        info!(addr = %addr, "listening for MoldUDP64 datagrams");

        let mut buf = vec![0u8; self.config.feed.recv_buffer_bytes];
        let mut accepted: u64 = 0;

        while self.running.load(Ordering::Acquire) {
            let len = match socket.recv(&mut buf) {
                Ok(len) => len,
                Err(e)
                    if e.kind() == std::io::ErrorKind::WouldBlock
                        || e.kind() == std::io::ErrorKind::TimedOut =>
                {
                    continue;
                }
                Err(e) => return Err(FeedError::io(addr.clone(), e)),
            };

            if self.pump.process_datagram(&buf[..len]) {
                accepted += 1;
            }

            match self.pump.session_state() {
                SessionState::EndOfSession => {
                    info!("end of session received, stopping ingress");
                    break;
                }
                SessionState::Error => {
                    warn!("session in error state, stopping ingress");
                    break;
                }
                _ => {}
            }
        }

        Ok(accepted)
    }

    /// Snapshot of every counter. Producer thread only, or after joining.
    pub fn stats(&self) -> FeedStats {
        FeedStats {
            pump: self.pump.stats(),
            session: *self.pump.session_stats(),
            decoder: *self.pump.decoder_stats(),
            queue: QueueStats {
                depth: self.queue.len(),
                capacity: self.queue.capacity(),
                available: self.queue.available(),
            },
            events_consumed: self.events_consumed,
        }
    }
}

impl Drop for FeedHandler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Best-effort pinning; a missing core is a warning, not an error.
fn pin_to_core(core: usize) {
    let Some(core_ids) = core_affinity::get_core_ids() else {
        warn!(core, "core enumeration failed, pinning skipped");
        return;
    };
    match core_ids.into_iter().find(|c| c.id == core) {
        Some(id) => {
            if !core_affinity::set_for_current(id) {
                warn!(core, "failed to pin thread");
            }
        }
        None => warn!(core, "core not present, pinning skipped"),
    }
}
