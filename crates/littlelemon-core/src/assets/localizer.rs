use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, warn};

/// Directory the menu images are served from.
pub const DEFAULT_IMAGE_BASE_URL: &str =
    "https://github.com/Meta-Mobile-Developer-PC/Working-With-Data-API/blob/main/images";

/// The menu document names this image differently from the file actually
/// published next to it.
const NAME_CORRECTIONS: &[(&str, &str)] = &[("lemonDessert.jpg", "lemonDessert 2.jpg")];

/// Attempts per image before giving up. Every attempt targets the same path.
const MAX_DOWNLOAD_ATTEMPTS: u32 = 3;

const INITIAL_RETRY_DELAY_MS: u64 = 250;

const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

static PARTIAL_SEQ: AtomicU64 = AtomicU64::new(0);

/// Turns a remote image name into a local file path.
///
/// Never fails: the returned path may not exist if the download did not
/// succeed, and the display layer is expected to cope with that.
#[async_trait]
pub trait ImageLocalizer: Send + Sync {
    async fn localize(&self, remote_name: &str) -> String;
}

#[derive(Clone)]
pub struct AssetLocalizer {
    client: Client,
    assets_dir: PathBuf,
    image_base_url: String,
}

impl AssetLocalizer {
    pub fn new(assets_dir: PathBuf, image_base_url: impl Into<String>) -> anyhow::Result<Self> {
        std::fs::create_dir_all(&assets_dir)?;
        let client = Client::builder()
            .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            assets_dir,
            image_base_url: image_base_url.into(),
        })
    }

    /// Apply the fixed name correction table.
    pub fn corrected_name(remote_name: &str) -> &str {
        NAME_CORRECTIONS
            .iter()
            .find(|(from, _)| *from == remote_name)
            .map(|(_, to)| *to)
            .unwrap_or(remote_name)
    }

    /// Deterministic local path for an image name.
    pub fn local_path(&self, remote_name: &str) -> PathBuf {
        let corrected = Self::corrected_name(remote_name);
        // Only the final component; names come from the network.
        let file_name = Path::new(corrected)
            .file_name()
            .map(|f| f.to_os_string())
            .unwrap_or_default();
        self.assets_dir.join(file_name)
    }

    pub fn remote_url(&self, remote_name: &str) -> String {
        format!(
            "{}/{}?raw=true",
            self.image_base_url.trim_end_matches('/'),
            Self::corrected_name(remote_name)
        )
    }

    async fn download(&self, url: &str, target: &Path) -> anyhow::Result<()> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;

        // Write beside the target and rename so a partial file never looks resident.
        let partial = partial_path(target);
        tokio::fs::write(&partial, &bytes).await?;
        if let Err(e) = tokio::fs::rename(&partial, target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }
        Ok(())
    }

    async fn download_with_retry(&self, url: &str, target: &Path) -> bool {
        let mut delay_ms = INITIAL_RETRY_DELAY_MS;

        for attempt in 1..=MAX_DOWNLOAD_ATTEMPTS {
            match self.download(url, target).await {
                Ok(()) => {
                    debug!(url, path = %target.display(), attempt, "Image downloaded");
                    return true;
                }
                Err(e) if attempt < MAX_DOWNLOAD_ATTEMPTS => {
                    debug!(url, attempt, error = %e, "Image download failed, retrying");
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                    delay_ms *= 2;
                }
                Err(e) => {
                    warn!(url, attempts = attempt, error = %e, "Giving up on image download");
                }
            }
        }
        false
    }
}

/// Scratch file next to `target`, unique per download so concurrent writers
/// never share one. `pasta.jpg` and `pasta.png` never collide either.
fn partial_path(target: &Path) -> PathBuf {
    let seq = PARTIAL_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut name = target.file_name().unwrap_or_default().to_os_string();
    name.push(format!(".{}.part", seq));
    target.with_file_name(name)
}

#[async_trait]
impl ImageLocalizer for AssetLocalizer {
    async fn localize(&self, remote_name: &str) -> String {
        if remote_name.trim().is_empty() {
            return String::new();
        }

        let target = self.local_path(remote_name);
        if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
            let url = self.remote_url(remote_name);
            self.download_with_retry(&url, &target).await;
        }

        target.to_string_lossy().into_owned()
    }
}
