use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};

use crate::assets::decode::decode_image;
use crate::assets::source::GarmentSource;
use crate::foundation::error::{DrapeError, DrapeResult};

/// A decoded garment image ready to draw.
///
/// Construction guarantees non-zero dimensions, so [`GarmentAsset::aspect_ratio`] is always
/// finite and positive.
#[derive(Clone, Debug)]
pub struct GarmentAsset {
    reference: String,
    width: u32,
    height: u32,
    rgba8_premul: Arc<Vec<u8>>,
}

impl GarmentAsset {
    /// Wrap premultiplied RGBA8 pixels.
    pub fn new(
        reference: impl Into<String>,
        width: u32,
        height: u32,
        rgba8_premul: Arc<Vec<u8>>,
    ) -> DrapeResult<Self> {
        if width == 0 || height == 0 {
            return Err(DrapeError::decode("garment image has zero width or height"));
        }
        let expected = (width as usize) * (height as usize) * 4;
        if rgba8_premul.len() != expected {
            return Err(DrapeError::decode(format!(
                "garment buffer is {} bytes, expected {expected}",
                rgba8_premul.len()
            )));
        }
        Ok(Self {
            reference: reference.into(),
            width,
            height,
            rgba8_premul,
        })
    }

    /// Reference the image was loaded from.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// `width / height`.
    pub fn aspect_ratio(&self) -> f64 {
        f64::from(self.width) / f64::from(self.height)
    }

    /// Row-major premultiplied RGBA8 pixels.
    pub fn rgba8_premul(&self) -> &[u8] {
        &self.rgba8_premul
    }

    pub(crate) fn shared_pixels(&self) -> Arc<Vec<u8>> {
        Arc::clone(&self.rgba8_premul)
    }
}

/// A garment choice pushed in by the host application.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct GarmentSelection {
    /// Catalog identifier.
    pub id: String,
    /// Image reference resolved by the configured [`GarmentSource`].
    pub image_reference: String,
    /// Name shown to the user.
    pub display_name: String,
}

/// Lifecycle of the current garment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    /// Nothing selected.
    Empty,
    /// A load for the latest selection is pending.
    Loading,
    /// The latest selection is decoded and drawable.
    Ready,
    /// The latest selection could not be loaded; nothing is drawn.
    Failed,
}

/// One load job handed to a [`GarmentLoader`].
#[derive(Clone, Debug)]
pub struct LoadRequest {
    /// Request counter; only the latest generation is ever applied.
    pub generation: u64,
    /// Image reference to fetch.
    pub reference: String,
}

/// Result of a [`LoadRequest`].
#[derive(Debug)]
pub struct LoadOutcome {
    /// Generation of the request this answers.
    pub generation: u64,
    /// Image reference that was fetched.
    pub reference: String,
    /// Decoded garment, or why it could not be loaded.
    pub result: DrapeResult<GarmentAsset>,
}

/// Runs garment loads and reports each outcome exactly once on `done`.
///
/// Outcomes may arrive on any thread and in any order; the cache sorts out staleness.
pub trait GarmentLoader: Send {
    /// Start loading `request`; send exactly one outcome on `done`.
    fn load(&self, request: LoadRequest, done: Sender<LoadOutcome>);
}

fn fetch_and_decode(source: &dyn GarmentSource, reference: &str) -> DrapeResult<GarmentAsset> {
    let bytes = source.fetch(reference)?;
    decode_image(reference, &bytes)
}

/// Loads each garment on its own background thread.
#[derive(Debug)]
pub struct ThreadLoader<S> {
    source: Arc<S>,
}

impl<S: GarmentSource + 'static> ThreadLoader<S> {
    /// Load from `source` on a fresh thread per request.
    pub fn new(source: S) -> Self {
        Self {
            source: Arc::new(source),
        }
    }
}

impl<S: GarmentSource + 'static> GarmentLoader for ThreadLoader<S> {
    fn load(&self, request: LoadRequest, done: Sender<LoadOutcome>) {
        let source = Arc::clone(&self.source);
        std::thread::spawn(move || {
            let result = fetch_and_decode(source.as_ref(), &request.reference);
            // The cache may have been dropped; nobody is left to care.
            let _ = done.send(LoadOutcome {
                generation: request.generation,
                reference: request.reference,
                result,
            });
        });
    }
}

/// Loads on the calling thread. The outcome is still applied on the next `poll`.
#[derive(Debug)]
pub struct InlineLoader<S> {
    source: S,
}

impl<S: GarmentSource> InlineLoader<S> {
    /// Load from `source` on the calling thread.
    pub fn new(source: S) -> Self {
        Self { source }
    }
}

impl<S: GarmentSource> GarmentLoader for InlineLoader<S> {
    fn load(&self, request: LoadRequest, done: Sender<LoadOutcome>) {
        let result = fetch_and_decode(&self.source, &request.reference);
        let _ = done.send(LoadOutcome {
            generation: request.generation,
            reference: request.reference,
            result,
        });
    }
}

/// Holds the currently selected garment.
///
/// Last request wins: every `select` bumps a generation counter and outcomes carrying an older
/// generation are dropped on arrival. Load failures are silent; they only show up as
/// [`LoadState::Failed`] and a log line.
pub struct GarmentCache {
    loader: Box<dyn GarmentLoader>,
    done_tx: Sender<LoadOutcome>,
    done_rx: Receiver<LoadOutcome>,
    generation: u64,
    selection: Option<GarmentSelection>,
    state: LoadState,
    current: Option<Arc<GarmentAsset>>,
    applied_loads: u64,
}

impl std::fmt::Debug for GarmentCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GarmentCache")
            .field("generation", &self.generation)
            .field("selection", &self.selection)
            .field("state", &self.state)
            .field("applied_loads", &self.applied_loads)
            .finish_non_exhaustive()
    }
}

impl GarmentCache {
    /// An empty cache that loads through `loader`.
    pub fn new(loader: impl GarmentLoader + 'static) -> Self {
        let (done_tx, done_rx) = mpsc::channel();
        Self {
            loader: Box::new(loader),
            done_tx,
            done_rx,
            generation: 0,
            selection: None,
            state: LoadState::Empty,
            current: None,
            applied_loads: 0,
        }
    }

    /// Select a garment and start loading it.
    ///
    /// Returns `false` without starting a load when the same image is already loading or ready.
    #[tracing::instrument(skip(self, selection), fields(reference = %selection.image_reference))]
    pub fn select(&mut self, selection: GarmentSelection) -> bool {
        let same_reference = self
            .selection
            .as_ref()
            .is_some_and(|s| s.image_reference == selection.image_reference);
        if same_reference && matches!(self.state, LoadState::Loading | LoadState::Ready) {
            tracing::debug!("garment already selected");
            self.selection = Some(selection);
            return false;
        }

        self.generation += 1;
        self.state = LoadState::Loading;
        self.current = None;
        let request = LoadRequest {
            generation: self.generation,
            reference: selection.image_reference.clone(),
        };
        self.selection = Some(selection);
        tracing::debug!(generation = self.generation, "garment load started");
        self.loader.load(request, self.done_tx.clone());
        true
    }

    /// Drop the selection; any pending load is discarded when it lands.
    pub fn clear(&mut self) {
        self.generation += 1;
        self.selection = None;
        self.state = LoadState::Empty;
        self.current = None;
    }

    /// Apply completed loads. Returns `true` when the state changed.
    pub fn poll(&mut self) -> bool {
        let mut changed = false;
        loop {
            let outcome = match self.done_rx.try_recv() {
                Ok(o) => o,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            };
            if outcome.generation != self.generation || self.state != LoadState::Loading {
                tracing::debug!(
                    generation = outcome.generation,
                    reference = %outcome.reference,
                    "discarding stale garment load"
                );
                continue;
            }
            match outcome.result {
                Ok(asset) => {
                    tracing::debug!(
                        reference = %outcome.reference,
                        width = asset.width(),
                        height = asset.height(),
                        "garment ready"
                    );
                    self.current = Some(Arc::new(asset));
                    self.state = LoadState::Ready;
                    self.applied_loads += 1;
                }
                Err(err) => {
                    tracing::warn!(reference = %outcome.reference, error = %err, "garment load failed");
                    self.current = None;
                    self.state = LoadState::Failed;
                }
            }
            changed = true;
        }
        changed
    }

    /// The drawable garment, present only in [`LoadState::Ready`].
    pub fn current(&self) -> Option<&Arc<GarmentAsset>> {
        self.current.as_ref()
    }

    /// Lifecycle of the latest selection.
    pub fn state(&self) -> LoadState {
        self.state
    }

    /// The latest selection, if any.
    pub fn selection(&self) -> Option<&GarmentSelection> {
        self.selection.as_ref()
    }

    /// Number of loads that reached `Ready` over the cache's lifetime.
    pub fn applied_loads(&self) -> u64 {
        self.applied_loads
    }
}

#[cfg(test)]
#[path = "../../tests/unit/assets/garment.rs"]
mod tests;
