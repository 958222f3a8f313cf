//! Fixed-rate event loop around a [`FrameProcessor`]

use std::sync::mpsc::{Receiver, TryRecvError};
use std::time::Instant;

use brn_core::CameraInfo;
use tracing::{debug, info, warn};

use crate::config::NodeConfig;
use crate::messages::ImageMessage;
use crate::processor::{FrameProcessor, ProcessOutcome};
use crate::sink::OutputSink;

/// Input delivered to the node
#[derive(Debug, Clone)]
pub enum Event {
    Image(ImageMessage),
    CameraInfo(CameraInfo),
}

pub struct Node<S: OutputSink> {
    processor: FrameProcessor,
    sink: S,
    config: NodeConfig,
}

impl<S: OutputSink> Node<S> {
    pub fn new(processor: FrameProcessor, sink: S, config: NodeConfig) -> Self {
        Self {
            processor,
            sink,
            config,
        }
    }

    pub fn processor(&self) -> &FrameProcessor {
        &self.processor
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Apply one input; bad input is logged and dropped
    pub fn handle(&mut self, event: Event) {
        match event {
            Event::Image(msg) => {
                if let Err(err) = self.processor.submit_message(&msg) {
                    debug!(%err, seq = msg.header.seq, "image event dropped");
                }
            }
            Event::CameraInfo(info) => match self.processor.set_calibration(&info) {
                Ok(()) => info!("calibration updated"),
                Err(err) => warn!(%err, "ignoring calibration"),
            },
        }
    }

    /// Process the pending frame, if any, then publish
    pub fn tick(&mut self) {
        if let ProcessOutcome::Processed(report) = self.processor.process() {
            debug!(
                circles = report.circles.len(),
                rays = report.rays_computed,
                "cycle"
            );
        }
        self.processor.publish(&mut self.sink);
    }

    /// Run until every sender is dropped; returns the number of ticks
    ///
    /// Events queued between ticks are all applied before the next tick, so
    /// only the newest image of a burst is processed.
    pub fn run(&mut self, events: &Receiver<Event>) -> usize {
        let period = self.config.period();
        let mut ticks = 0;
        info!(rate_hz = self.config.rate_hz, "node running");

        loop {
            let started = Instant::now();
            let mut disconnected = false;
            loop {
                match events.try_recv() {
                    Ok(event) => self.handle(event),
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => {
                        disconnected = true;
                        break;
                    }
                }
            }

            self.tick();
            ticks += 1;

            if disconnected {
                info!(ticks, "input closed, node stopping");
                return ticks;
            }

            if let Some(rest) = period.checked_sub(started.elapsed()) {
                std::thread::sleep(rest);
            }
        }
    }
}
