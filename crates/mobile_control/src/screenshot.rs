//! Screen capture to a local file

use image::ImageReader;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{debug, warn, Span};
use uuid::Uuid;

use crate::bridge::Bridge;
use crate::error::{DeviceError, Result};

const OPERATION: &str = "take_screenshot";

/// A screenshot written to the local filesystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Screenshot {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
}

/// Capture the screen of `serial` into `dest`
///
/// The image is pulled into a temporary file next to `dest`, decoded to make
/// sure it is a complete image, then renamed over `dest`. Any failure leaves
/// `dest` untouched. The on-device capture is removed whether or not the
/// transfer worked.
pub(crate) async fn capture(
    bridge: &Bridge,
    serial: &str,
    dest: &Path,
    span: &Span,
) -> Result<Screenshot> {
    let parent = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    tokio::fs::create_dir_all(&parent).await?;

    let remote = format!("/sdcard/mobile-control-{}.png", Uuid::new_v4().simple());
    let result = capture_via(bridge, serial, &remote, &parent, dest).await;

    if let Err(err) = bridge
        .run(OPERATION, Some(serial), &["shell", "rm", "-f", remote.as_str()])
        .await
    {
        warn!(parent: span, %remote, "could not remove on-device capture: {}", err);
    }

    match &result {
        Ok(shot) => debug!(
            parent: span,
            "Screenshot saved to {} ({}x{})",
            shot.path.display(),
            shot.width,
            shot.height
        ),
        Err(err) => warn!(parent: span, "Screenshot failed: {}", err),
    }
    result
}

async fn capture_via(
    bridge: &Bridge,
    serial: &str,
    remote: &str,
    parent: &Path,
    dest: &Path,
) -> Result<Screenshot> {
    bridge
        .run(OPERATION, Some(serial), &["shell", "screencap", "-p", remote])
        .await?;

    // Dropping `staging` on any early return deletes the partial file
    let staging = tempfile::Builder::new()
        .prefix(".screenshot-")
        .suffix(".png")
        .tempfile_in(parent)?;
    let staging_path = staging.path().to_string_lossy().into_owned();
    bridge
        .run(OPERATION, Some(serial), &["pull", remote, staging_path.as_str()])
        .await?;

    let (width, height) = ImageReader::open(staging.path())?
        .with_guessed_format()?
        .into_dimensions()?;

    staging
        .persist(dest)
        .map_err(|err| DeviceError::Io(err.error))?;

    Ok(Screenshot {
        path: dest.to_path_buf(),
        width,
        height,
    })
}
