//! Webcam snapshot device

use std::path::Path;

use opencv::core::{Mat, Vector};
use opencv::prelude::*;
use opencv::{imgcodecs, videoio};

use crate::{Error, Result};

/// One-shot snapshot capability
///
/// The device is opened, read once, and released inside a single call;
/// nothing holds the camera between captures.
pub trait SnapshotDevice: Send + Sync {
    /// Grab one frame and write it to `path`
    ///
    /// Returns `Ok(true)` when a frame was written, `Ok(false)` when the
    /// device opened but produced no frame.
    ///
    /// # Errors
    ///
    /// Returns error if the device cannot be opened or the frame cannot
    /// be written
    fn snap(&self, path: &Path) -> Result<bool>;
}

/// Webcam addressed by device index
pub struct Webcam {
    index: i32,
}

impl Webcam {
    /// Reference the camera at `index` (0 is the default device)
    #[must_use]
    pub const fn new(index: i32) -> Self {
        Self { index }
    }
}

impl SnapshotDevice for Webcam {
    fn snap(&self, path: &Path) -> Result<bool> {
        let mut cap = videoio::VideoCapture::new(self.index, videoio::CAP_ANY)
            .map_err(|e| Error::Camera(format!("failed to open camera {}: {e}", self.index)))?;

        if !cap
            .is_opened()
            .map_err(|e| Error::Camera(format!("camera {} state unknown: {e}", self.index)))?
        {
            return Err(Error::Camera(format!("camera {} not available", self.index)));
        }

        let mut frame = Mat::default();
        let read = cap.read(&mut frame);
        // Release before touching the frame; the pixels are already ours
        // and the device must be freed no matter what happens next.
        if let Err(e) = cap.release() {
            tracing::warn!(error = %e, "camera release failed");
        }

        let got_frame = read.map_err(|e| Error::Camera(format!("frame read failed: {e}")))?;
        if !got_frame || frame.empty().unwrap_or(true) {
            return Ok(false);
        }

        let file = path
            .to_str()
            .ok_or_else(|| Error::Camera(format!("non-UTF8 capture path: {}", path.display())))?;
        let written = imgcodecs::imwrite(file, &frame, &Vector::new())
            .map_err(|e| Error::Camera(format!("failed to write {file}: {e}")))?;

        Ok(written)
    }
}
