//! Model weights fetching.

use std::io::{Read, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

/// Hard cap on a weights download; Mask R-CNN exports stay well under this.
const MAX_WEIGHTS_BYTES: u64 = 2 * 1024 * 1024 * 1024;

const DOWNLOAD_CHUNK_BYTES: usize = 64 * 1024;

/// Make sure the weights file at `path` exists, downloading it when absent.
///
/// The download streams to a sibling `.part` file and renames into place, so
/// an interrupted fetch never leaves a truncated file at the real path.
pub fn ensure_weights(path: &Path, url: Option<&str>) -> Result<()> {
    if path.exists() {
        log::debug!("model weights present at {}", path.display());
        return Ok(());
    }

    let Some(url) = url.filter(|url| !url.trim().is_empty()) else {
        return Err(anyhow!(
            "model weights not found at {} and no weights_url configured",
            path.display()
        ));
    };

    let parsed = url::Url::parse(url).with_context(|| format!("invalid weights url '{url}'"))?;
    log::info!("downloading model weights from {parsed}");

    let response = ureq::get(parsed.as_str())
        .call()
        .context("weights download request failed")?;
    let total_bytes = response
        .header("Content-Length")
        .and_then(|value| value.parse::<u64>().ok());

    let progress = match total_bytes {
        Some(total) => {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::with_template("{bar:40} {bytes}/{total_bytes} {eta}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        }
        None => ProgressBar::new_spinner(),
    };

    let partial_path = path.with_extension("part");
    let mut out = std::fs::File::create(&partial_path)
        .with_context(|| format!("failed to create {}", partial_path.display()))?;

    let mut reader = response.into_reader().take(MAX_WEIGHTS_BYTES);
    let mut buffer = [0u8; DOWNLOAD_CHUNK_BYTES];
    let mut written: u64 = 0;
    loop {
        let read = reader.read(&mut buffer).context("weights download read failed")?;
        if read == 0 {
            break;
        }
        out.write_all(&buffer[..read])
            .with_context(|| format!("failed to write {}", partial_path.display()))?;
        written += read as u64;
        progress.set_position(written);
    }
    progress.finish_and_clear();

    if let Some(total) = total_bytes {
        if written != total {
            let _ = std::fs::remove_file(&partial_path);
            return Err(anyhow!(
                "weights download truncated: got {written} of {total} bytes"
            ));
        }
    }

    std::fs::rename(&partial_path, path)
        .with_context(|| format!("failed to move weights into {}", path.display()))?;
    log::info!("saved model weights to {} ({written} bytes)", path.display());
    Ok(())
}
