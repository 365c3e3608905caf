// ABOUTME: Image asset resolution: plans one download per canonical URL and runs them concurrently.
// ABOUTME: A per-URL OnceCell guard guarantees a URL is fetched at most once per resolver.

//! Image asset resolution.
//!
//! Key behaviors:
//! - Planning walks records in the order given, then each field's `<img>`
//!   references in document order; the first reference to a canonical URL
//!   fixes its file label, so file names do not depend on download timing.
//! - Assets already known (from the store) seed the guard table and are
//!   reused without a request.
//! - A failed download is reported for that URL only; nothing is written
//!   and the reference stays as it was.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use compendium_extract::image_utils::{icon_local_path, image_refs};
use compendium_extract::{asset_file_name, canonical_url, FieldName, ImageAsset, Record};
use futures::stream::{self, StreamExt};
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::client::Client;
use crate::error::{FetchError, OP_FETCH_IMAGE};

/// Default number of concurrent image downloads.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// One planned download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetRequest {
    /// Canonical URL; the dedup key.
    pub origin_url: String,
    /// URL as found in the page, query included.
    pub fetch_url: String,
    /// File name under the icons directory.
    pub file_name: String,
    pub alt_text: Option<String>,
}

/// What happened to one planned request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssetOutcome {
    /// Downloaded and written during this run.
    Fetched(ImageAsset),
    /// Already known; no request was made.
    Reused(ImageAsset),
    /// Download or write failed; the message is the error text.
    Failed(String),
}

impl AssetOutcome {
    pub fn asset(&self) -> Option<&ImageAsset> {
        match self {
            AssetOutcome::Fetched(asset) | AssetOutcome::Reused(asset) => Some(asset),
            AssetOutcome::Failed(_) => None,
        }
    }
}

/// Plans the downloads needed for `records`, one per canonical URL.
pub fn plan_requests(records: &[Record], fields: &[FieldName]) -> Vec<AssetRequest> {
    let mut seen = HashSet::new();
    let mut requests = Vec::new();

    for record in records {
        for field in fields {
            for image in image_refs(record.fields().get(*field)) {
                let Some(url) = image.candidate() else {
                    continue;
                };
                let origin_url = canonical_url(&url);
                if !seen.insert(origin_url.clone()) {
                    continue;
                }
                let alt_text = image.alt_text().map(str::to_string);
                let label = alt_text.as_deref().unwrap_or(record.name());
                requests.push(AssetRequest {
                    file_name: asset_file_name(record.source(), label, &url),
                    origin_url,
                    fetch_url: url,
                    alt_text,
                });
            }
        }
    }

    requests
}

type Slot = Arc<OnceCell<Result<ImageAsset, String>>>;

/// Downloads images into `<public_dir>/images/icons`.
pub struct ImageResolver {
    client: Client,
    public_dir: PathBuf,
    concurrency: usize,
    slots: Mutex<HashMap<String, Slot>>,
}

impl ImageResolver {
    pub fn new(client: Client, public_dir: impl Into<PathBuf>) -> Self {
        Self {
            client,
            public_dir: public_dir.into(),
            concurrency: DEFAULT_CONCURRENCY,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Caps the number of downloads in flight.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Marks assets as already resolved so they are never fetched again.
    pub fn with_known(self, assets: impl IntoIterator<Item = ImageAsset>) -> Self {
        {
            let mut slots = self.lock_slots();
            for asset in assets {
                let slot = Arc::new(OnceCell::new_with(Some(Ok(asset.clone()))));
                slots.insert(asset.origin_url.clone(), slot);
            }
        }
        self
    }

    pub fn public_dir(&self) -> &Path {
        &self.public_dir
    }

    fn lock_slots(&self) -> std::sync::MutexGuard<'_, HashMap<String, Slot>> {
        // A poisoned map still holds valid slots.
        self.slots.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn slot(&self, origin_url: &str) -> Slot {
        self.lock_slots()
            .entry(origin_url.to_string())
            .or_insert_with(|| Arc::new(OnceCell::new()))
            .clone()
    }

    /// Resolves one request, downloading only if no one has yet.
    pub async fn resolve(&self, request: &AssetRequest) -> AssetOutcome {
        let slot = self.slot(&request.origin_url);
        let fetched_here = AtomicBool::new(false);
        let flag = &fetched_here;
        let result = slot
            .get_or_init(|| async move {
                flag.store(true, Ordering::Relaxed);
                self.download(request).await.map_err(|e| e.to_string())
            })
            .await;

        match result {
            Ok(asset) if fetched_here.load(Ordering::Relaxed) => AssetOutcome::Fetched(asset.clone()),
            Ok(asset) => AssetOutcome::Reused(asset.clone()),
            Err(message) => AssetOutcome::Failed(message.clone()),
        }
    }

    /// Resolves every request with bounded concurrency.
    ///
    /// Outcomes are returned in completion order, paired with their request.
    pub async fn resolve_all(&self, requests: &[AssetRequest]) -> Vec<(AssetRequest, AssetOutcome)> {
        stream::iter(requests)
            .map(|request| async move { (request.clone(), self.resolve(request).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await
    }

    async fn download(&self, request: &AssetRequest) -> Result<ImageAsset, FetchError> {
        let bytes = match self.client.fetch_bytes(&request.fetch_url).await {
            Ok(bytes) => bytes,
            Err(err) => {
                warn!(url = %request.fetch_url, error = %err, "image download failed");
                return Err(err);
            }
        };

        let local_path = icon_local_path(&request.file_name);
        let target = self.public_dir.join(&local_path);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| FetchError::io(&request.fetch_url, OP_FETCH_IMAGE, e))?;
        }
        tokio::fs::write(&target, &bytes)
            .await
            .map_err(|e| FetchError::io(&request.fetch_url, OP_FETCH_IMAGE, e))?;
        debug!(url = %request.origin_url, path = %target.display(), bytes = bytes.len(), "saved image");

        Ok(ImageAsset {
            origin_url: request.origin_url.clone(),
            fetch_url: request.fetch_url.clone(),
            local_path,
            alt_text: request.alt_text.clone(),
        })
    }
}
