use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use crate::{
    fetcher::{ImageFetcher, fetch},
    model::{DownloadOutcome, DownloadedImage},
    notify::Notifier,
    persister::{Persister, persist_image},
};

/// Everything a download task needs, cheap to clone per button press
#[derive(Clone)]
pub struct DownloadContext {
    pub fetcher: Arc<dyn ImageFetcher>,
    pub persister: Arc<Persister>,
    pub notifier: Notifier,
    /// Feeds the session store on the UI thread
    pub store_tx: UnboundedSender<DownloadedImage>,
}

/// Fetch → store → persist for one URL.
///
/// A failed fetch stops here: nothing is stored and nothing is written. On
/// success the image goes to the store before the save starts, so a failed
/// save never takes it back out.
pub async fn run_download(url: String, ctx: DownloadContext) -> DownloadOutcome {
    let img = match fetch(ctx.fetcher.as_ref(), &url, &ctx.notifier).await {
        Ok(img) => img,
        Err(e) => return DownloadOutcome::FetchFailed(e),
    };

    let downloaded = DownloadedImage::new(url.clone(), img);
    if ctx.store_tx.send(downloaded.clone()).is_err() {
        log::debug!("Session store is gone, {url} will not be displayed");
    }

    let saved = persist_image(
        ctx.persister.clone(),
        Some(downloaded.image.clone()),
        url,
        &ctx.notifier,
    )
    .await;

    DownloadOutcome::Fetched {
        image: downloaded,
        saved,
    }
}
