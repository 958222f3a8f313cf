//! Transport messages exchanged with the frame source and the output sink

use std::time::{SystemTime, UNIX_EPOCH};

use brn_core::{Frame, FrameDecodeError, PixelEncoding, Ray};
use serde::{Deserialize, Serialize};

/// Wall-clock time since the Unix epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct Stamp {
    pub sec: u64,
    pub nanosec: u32,
}

impl Stamp {
    pub fn now() -> Self {
        let since = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            sec: since.as_secs(),
            nanosec: since.subsec_nanos(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Header {
    pub seq: u64,
    pub stamp: Stamp,
    pub frame_id: String,
}

/// Raw image as delivered by a camera driver
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMessage {
    pub header: Header,
    pub width: u32,
    pub height: u32,
    /// Pixel encoding label, e.g. `"bgr8"`
    pub encoding: String,
    /// Bytes per row, padding included
    pub step: u32,
    pub data: Vec<u8>,
}

impl ImageMessage {
    pub fn from_frame(frame: &Frame, header: Header) -> Self {
        Self {
            header,
            width: frame.width() as u32,
            height: frame.height() as u32,
            encoding: frame.encoding().as_str().to_string(),
            step: frame.step() as u32,
            data: frame.data().to_vec(),
        }
    }

    /// Decode into a packed frame
    pub fn to_frame(&self) -> Result<Frame, FrameDecodeError> {
        let encoding: PixelEncoding = self.encoding.parse()?;
        Frame::from_rows(
            self.width as usize,
            self.height as usize,
            encoding,
            self.step as usize,
            &self.data,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Quaternion {
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub w: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub position: Point,
    pub orientation: Quaternion,
}

/// Pose message used as a plain 3-vector carrier for the ray
///
/// The position is always the origin; the orientation's vector part holds
/// the ray and `w` is zero. It is not a rotation.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PoseStamped {
    pub header: Header,
    pub pose: Pose,
}

impl PoseStamped {
    pub fn from_ray(header: Header, ray: &Ray) -> Self {
        Self {
            header,
            pose: Pose {
                position: Point::default(),
                orientation: Quaternion {
                    x: ray.x(),
                    y: ray.y(),
                    z: ray.z(),
                    w: 0.0,
                },
            },
        }
    }

    /// The carried ray
    pub fn ray(&self) -> Ray {
        let q = &self.pose.orientation;
        Ray::new(nalgebra::Vector3::new(q.x, q.y, q.z))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_image_message_round_trip() {
        let mut frame = Frame::filled(3, 2, PixelEncoding::Bgr8, Rgb([1, 2, 3]));
        frame.put_rgb(2, 1, Rgb([200, 100, 50]));

        let msg = ImageMessage::from_frame(&frame, Header::default());
        assert_eq!(msg.encoding, "bgr8");
        assert_eq!(msg.step, 9);
        assert_eq!(msg.to_frame().unwrap(), frame);
    }

    #[test]
    fn test_image_message_with_padding() {
        let msg = ImageMessage {
            header: Header::default(),
            width: 2,
            height: 2,
            encoding: "mono8".into(),
            step: 3,
            data: vec![10, 20, 0, 30, 40, 0],
        };
        let frame = msg.to_frame().unwrap();
        assert_eq!(frame.data(), &[10, 20, 30, 40]);
    }

    #[test]
    fn test_image_message_bad_encoding() {
        let msg = ImageMessage {
            header: Header::default(),
            width: 1,
            height: 1,
            encoding: "yuv422".into(),
            step: 2,
            data: vec![0, 0],
        };
        assert!(matches!(
            msg.to_frame(),
            Err(FrameDecodeError::UnsupportedEncoding(_))
        ));
    }

    #[test]
    fn test_image_message_truncated() {
        let msg = ImageMessage {
            header: Header::default(),
            width: 4,
            height: 4,
            encoding: "rgb8".into(),
            step: 12,
            data: vec![0; 40],
        };
        assert!(matches!(
            msg.to_frame(),
            Err(FrameDecodeError::BufferSize { .. })
        ));
    }

    #[test]
    fn test_pose_carries_ray() {
        let ray = Ray::new(nalgebra::Vector3::new(100.0, 100.0, 1.0));
        let pose = PoseStamped::from_ray(Header::default(), &ray);

        assert_eq!(pose.pose.position, Point::default());
        assert_eq!(pose.pose.orientation.w, 0.0);
        assert_eq!(pose.pose.orientation.x, 100.0);
        assert_eq!(pose.pose.orientation.z, 1.0);
        assert_eq!(pose.ray(), ray);
    }

    #[test]
    fn test_stamp_now_is_after_epoch() {
        assert!(Stamp::now().sec > 0);
    }
}
