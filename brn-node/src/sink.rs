use crate::messages::{ImageMessage, PoseStamped};

/// Downstream consumer of processed output
pub trait OutputSink {
    fn publish_image(&mut self, msg: ImageMessage);

    fn publish_pose(&mut self, msg: PoseStamped);
}

impl<S: OutputSink + ?Sized> OutputSink for &mut S {
    fn publish_image(&mut self, msg: ImageMessage) {
        (**self).publish_image(msg);
    }

    fn publish_pose(&mut self, msg: PoseStamped) {
        (**self).publish_pose(msg);
    }
}

/// Keeps every published message in memory
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub images: Vec<ImageMessage>,
    pub poses: Vec<PoseStamped>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_image(&self) -> Option<&ImageMessage> {
        self.images.last()
    }

    pub fn last_pose(&self) -> Option<&PoseStamped> {
        self.poses.last()
    }
}

impl OutputSink for CollectingSink {
    fn publish_image(&mut self, msg: ImageMessage) {
        self.images.push(msg);
    }

    fn publish_pose(&mut self, msg: PoseStamped) {
        self.poses.push(msg);
    }
}
