//! One detect-and-publish cycle over the latest frame

use brn_core::{
    Camera, CameraError, CameraInfo, Circle, CircleDetector, Frame, FrameDecodeError,
    ParamsError, Ray,
};
use nalgebra::{Matrix3, Point2};
use tracing::{debug, instrument, trace, warn};

use crate::config::ProcessorConfig;
use crate::draw::{self, BOX_COLOR, CIRCLE_COLOR};
use crate::messages::{Header, ImageMessage, PoseStamped, Stamp};
use crate::sink::OutputSink;

/// What a call to [`FrameProcessor::process`] did
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    /// No pending frame; nothing changed
    Idle,
    Processed(CycleReport),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Detections, in detector order
    pub circles: Vec<Circle>,
    /// Circles whose center could be back-projected
    pub rays_computed: usize,
    /// Ray retained from this frame, if any
    pub selected: Option<Ray>,
}

/// Owns the processing state: pending frame, output buffer and last ray
pub struct FrameProcessor {
    config: ProcessorConfig,
    detector: CircleDetector,
    camera: Camera,
    // Frames travel with the encoding label they arrived under
    pending: Option<(Frame, String)>,
    output: Option<(Frame, String)>,
    ray: Ray,
    image_seq: u64,
    pose_seq: u64,
}

impl FrameProcessor {
    pub fn new(config: ProcessorConfig) -> Result<Self, ParamsError> {
        let detector = CircleDetector::new(config.detection.clone())?;
        Ok(Self {
            config,
            detector,
            camera: Camera::new(),
            pending: None,
            output: None,
            ray: Ray::zero(),
            image_seq: 0,
            pose_seq: 0,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Apply a calibration message; a rejected one leaves the old calibration
    pub fn set_calibration(&mut self, info: &CameraInfo) -> Result<(), CameraError> {
        self.camera.set_calibration(info)
    }

    pub fn set_intrinsics(&mut self, k: Matrix3<f64>) -> Result<(), CameraError> {
        self.camera.set_intrinsics(k)
    }

    /// Queue a frame, replacing any frame not yet processed
    pub fn submit_frame(&mut self, frame: Frame) {
        let label = frame.encoding().as_str().to_string();
        self.queue(frame, label);
    }

    fn queue(&mut self, frame: Frame, label: String) {
        if self.pending.is_some() {
            trace!("replacing unprocessed frame");
        }
        self.pending = Some((frame, label));
    }

    /// Decode and queue a transport image
    ///
    /// The published image keeps the message's encoding label as received.
    /// An undecodable image clears the pending slot so no stale frame is
    /// processed in its place.
    pub fn submit_message(&mut self, msg: &ImageMessage) -> Result<(), FrameDecodeError> {
        match msg.to_frame() {
            Ok(frame) => {
                self.queue(frame, msg.encoding.clone());
                Ok(())
            }
            Err(err) => {
                warn!(%err, encoding = %msg.encoding, "dropping undecodable frame");
                self.pending = None;
                Err(err)
            }
        }
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Annotated frame from the last processed cycle
    pub fn output(&self) -> Option<&Frame> {
        self.output.as_ref().map(|(frame, _)| frame)
    }

    /// Ray that will be published; zero until a back-projection succeeds
    pub fn ray(&self) -> Ray {
        self.ray
    }

    /// Sequence number of the last published image
    pub fn image_seq(&self) -> u64 {
        self.image_seq
    }

    /// Consume the pending frame: detect, back-project, annotate
    #[instrument(level = "debug", skip(self))]
    pub fn process(&mut self) -> ProcessOutcome {
        let Some((mut frame, label)) = self.pending.take() else {
            return ProcessOutcome::Idle;
        };

        let circles = self.detector.detect(&frame);
        let thickness = self.config.line_thickness;
        let mut candidates = Vec::with_capacity(circles.len());

        for circle in &circles {
            let center = circle.pixel_center();
            draw::fill_circle(
                &mut frame,
                center,
                self.config.marker_radius as i64,
                CIRCLE_COLOR,
            );
            draw::circle_outline(
                &mut frame,
                center,
                circle.radius.round() as i64,
                thickness,
                CIRCLE_COLOR,
            );

            match self.camera.back_project((center.0 as f64, center.1 as f64)) {
                Ok(ray) => candidates.push((*circle, ray)),
                Err(err) => warn!(%err, x = center.0, y = center.1, "skipping ray"),
            }
        }

        if self.config.diagnostic_overlay {
            let side = self.config.box_size as i64;
            let origin = (
                frame.width() as i64 / 2 - side / 2,
                frame.height() as i64 / 2 - side / 2,
            );
            draw::rectangle_outline(&mut frame, origin, side, side, thickness, BOX_COLOR);
        }

        let image_center = Point2::new(frame.width() as f64 / 2.0, frame.height() as f64 / 2.0);
        let selected = self
            .config
            .selection
            .select(&candidates, image_center)
            .map(|ray| {
                if self.config.normalize_ray {
                    ray.normalized()
                } else {
                    ray
                }
            });
        if let Some(ray) = selected {
            self.ray = ray;
        }

        debug!(
            circles = circles.len(),
            rays = candidates.len(),
            ray = ?self.ray.direction(),
            "frame processed"
        );
        self.output = Some((frame, label));

        ProcessOutcome::Processed(CycleReport {
            circles,
            rays_computed: candidates.len(),
            selected,
        })
    }

    /// Emit the annotated frame (if any) and the retained ray
    pub fn publish<S: OutputSink + ?Sized>(&mut self, sink: &mut S) {
        let stamp = Stamp::now();

        if let Some((frame, label)) = &self.output {
            self.image_seq += 1;
            let header = Header {
                seq: self.image_seq,
                stamp,
                frame_id: self.config.image_frame_id.clone(),
            };
            let mut msg = ImageMessage::from_frame(frame, header);
            msg.encoding.clone_from(label);
            sink.publish_image(msg);
        }

        self.pose_seq += 1;
        let header = Header {
            seq: self.pose_seq,
            stamp,
            frame_id: self.config.ray_frame_id.clone(),
        };
        sink.publish_pose(PoseStamped::from_ray(header, &self.ray));
    }
}
