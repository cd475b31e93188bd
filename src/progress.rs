// src/progress.rs

use std::sync::mpsc::Sender;

/// Events emitted while a run resolves activities. Per run, `Section`
/// percentages are strictly increasing and `Completed` is the final event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    Section { name: String, percent: u8 },
    File { name: String, index: usize, total: usize },
    Completed,
}

/// Delivery is best-effort: `emit` never blocks and never fails the run.
/// A sink whose listener has gone away just swallows the event.
pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: ProgressEvent);
}

pub struct ChannelSink {
    tx: Sender<ProgressEvent>,
}

impl ChannelSink {
    pub fn new(tx: Sender<ProgressEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelSink {
    fn emit(&self, event: ProgressEvent) {
        let _ = self.tx.send(event);
    }
}

/// Sink for headless runs and tests that assert on outcomes, not events.
pub struct NullSink;

impl ProgressSink for NullSink {
    fn emit(&self, _event: ProgressEvent) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_sink_delivers_in_order() {
        let (tx, rx) = std::sync::mpsc::channel();
        let sink = ChannelSink::new(tx);
        sink.emit(ProgressEvent::Section { name: "Week 1".to_string(), percent: 0 });
        sink.emit(ProgressEvent::File { name: "a.pdf".to_string(), index: 1, total: 2 });
        sink.emit(ProgressEvent::Completed);

        let events: Vec<ProgressEvent> = rx.try_iter().collect();
        assert_eq!(events.len(), 3);
        assert_eq!(events[2], ProgressEvent::Completed);
    }

    #[test]
    fn test_channel_sink_survives_dropped_receiver() {
        let (tx, rx) = std::sync::mpsc::channel();
        let sink = ChannelSink::new(tx);
        drop(rx);
        // Must not panic or error.
        sink.emit(ProgressEvent::Completed);
    }
}
