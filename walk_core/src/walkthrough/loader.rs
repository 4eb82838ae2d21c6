use std::{
    sync::mpsc::{self, Receiver, Sender, TryRecvError},
    thread,
};

use walk_scene::{AssetRef, SceneAsset, SceneError};

use super::WalkError;
use crate::helpers::Stopwatch;

pub type LoadResult = Result<SceneAsset, SceneError>;

/// Starts asset loads off the frame thread.
pub trait AssetLoader {
    fn begin(&mut self, asset: &AssetRef) -> PendingLoad;
}

pub enum LoadPoll {
    Pending,
    Done(Result<SceneAsset, WalkError>),
}

/// The receiving end of one load. Dropping it cancels the load: whatever the
/// loader sends afterwards goes nowhere.
pub struct PendingLoad {
    asset: String,
    rx: Receiver<LoadResult>,
    stopwatch: Stopwatch,
}

impl PendingLoad {
    pub fn channel(asset: &AssetRef) -> (Sender<LoadResult>, PendingLoad) {
        let (tx, rx) = mpsc::channel();

        let pending = PendingLoad {
            asset: asset.name(),
            rx,
            stopwatch: Stopwatch::new(),
        };
        (tx, pending)
    }

    pub fn asset(&self) -> &str {
        &self.asset
    }

    /// Never blocks.
    pub fn poll(&mut self) -> LoadPoll {
        let result = match self.rx.try_recv() {
            Ok(result) => result.map_err(|source| WalkError::AssetLoad {
                asset: self.asset.clone(),
                source,
            }),
            Err(TryRecvError::Empty) => return LoadPoll::Pending,
            Err(TryRecvError::Disconnected) => Err(WalkError::LoadAborted(self.asset.clone())),
        };

        log::debug!(
            "Load of {} finished after {:?}",
            self.asset,
            self.stopwatch.lap()
        );
        LoadPoll::Done(result)
    }
}

/// Parses each asset on its own short-lived thread.
#[derive(Debug, Default)]
pub struct ThreadLoader;

impl AssetLoader for ThreadLoader {
    fn begin(&mut self, asset: &AssetRef) -> PendingLoad {
        let (tx, pending) = PendingLoad::channel(asset);
        let asset = asset.clone();

        let spawned = thread::Builder::new()
            .name("scene-loader".to_string())
            .spawn(move || {
                let result = SceneAsset::load(&asset);
                if tx.send(result).is_err() {
                    log::debug!("Load of {} finished after it was cancelled", asset.name());
                }
            });

        // The sender went down with the closure, so the poll reports the load
        // as aborted.
        if let Err(e) = spawned {
            log::error!("Failed to spawn loader thread: {}", e);
        }

        pending
    }
}
