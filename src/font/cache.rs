//! Font atlas cache
//!
//! Maps (font name, size) to a built [`FontAtlas`]. Each key has its own
//! slot mutex, so concurrent requests for the same key wait on a single
//! in-flight build and share its result, while different keys build
//! independently. Failed builds leave the slot empty.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::{debug, info};

use super::atlas::FontAtlas;
use super::loader;
use super::rasterizer::{FontdueRasterizer, Rasterizer};
use crate::error::Result;
use crate::gpu::GraphicsDevice;

/// Cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FontKey {
    /// Font file identifier (path or name resolved by the loader)
    pub name: String,
    /// Point size
    pub size: u32,
}

impl FontKey {
    pub fn new(name: impl Into<String>, size: u32) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }
}

type Slot = Arc<Mutex<Option<Arc<FontAtlas>>>>;

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

fn load_font_file(name: &str, size: u32) -> Result<FontdueRasterizer> {
    let path = loader::resolve_font_path(name)?;
    let data = loader::read_font(&path)?;
    FontdueRasterizer::new(name, &data, size as f32)
}

/// Font atlas cache with at-most-once builds per key
#[derive(Default)]
pub struct FontCache {
    slots: Mutex<HashMap<FontKey, Slot>>,
    builds: AtomicUsize,
}

impl FontCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the atlas for `name` at `size`, building it from the font file
    /// on first request
    pub fn get_or_build<D>(&self, device: &D, name: &str, size: u32) -> Result<Arc<FontAtlas>>
    where
        D: GraphicsDevice + ?Sized,
    {
        self.get_or_build_with(device, name, size, || load_font_file(name, size))
    }

    /// Like [`get_or_build`](Self::get_or_build) with a caller-supplied
    /// rasterizer constructor
    ///
    /// `load` runs only on a miss, and at most once per concurrent miss.
    pub fn get_or_build_with<D, R, F>(
        &self,
        device: &D,
        name: &str,
        size: u32,
        load: F,
    ) -> Result<Arc<FontAtlas>>
    where
        D: GraphicsDevice + ?Sized,
        R: Rasterizer,
        F: FnOnce() -> Result<R>,
    {
        let key = FontKey::new(name, size);
        let slot = self.slot(&key);

        // Held for the whole build: later callers for this key wait here
        let mut entry = lock(&slot);
        if let Some(atlas) = entry.as_ref() {
            debug!("Font cache hit: {} @ {}", key.name, key.size);
            return Ok(Arc::clone(atlas));
        }

        debug!("Font cache miss: {} @ {}", key.name, key.size);
        match self.build(device, &key, load) {
            Ok(atlas) => {
                *entry = Some(Arc::clone(&atlas));
                Ok(atlas)
            }
            Err(e) => {
                drop(entry);
                self.forget_slot(&key, slot);
                Err(e)
            }
        }
    }

    /// Force a fresh build of `name` at `size` from the font file
    ///
    /// Returns the new atlas and the one it replaced, if any.
    pub fn rebuild<D>(
        &self,
        device: &D,
        name: &str,
        size: u32,
    ) -> Result<(Arc<FontAtlas>, Option<Arc<FontAtlas>>)>
    where
        D: GraphicsDevice + ?Sized,
    {
        self.rebuild_with(device, name, size, || load_font_file(name, size))
    }

    /// Like [`rebuild`](Self::rebuild) with a caller-supplied rasterizer
    /// constructor
    ///
    /// The key's slot stays locked from taking the old atlas until the new
    /// one is stored, so concurrent callers see either the old atlas or the
    /// new one. On failure the old atlas stays cached.
    pub fn rebuild_with<D, R, F>(
        &self,
        device: &D,
        name: &str,
        size: u32,
        load: F,
    ) -> Result<(Arc<FontAtlas>, Option<Arc<FontAtlas>>)>
    where
        D: GraphicsDevice + ?Sized,
        R: Rasterizer,
        F: FnOnce() -> Result<R>,
    {
        let key = FontKey::new(name, size);
        let slot = self.slot(&key);

        let mut entry = lock(&slot);
        let old = entry.take();
        match self.build(device, &key, load) {
            Ok(atlas) => {
                *entry = Some(Arc::clone(&atlas));
                info!("Font rebuilt: {} @ {}", key.name, key.size);
                Ok((atlas, old))
            }
            Err(e) => {
                let had_old = old.is_some();
                *entry = old;
                drop(entry);
                if !had_old {
                    self.forget_slot(&key, slot);
                }
                Err(e)
            }
        }
    }

    /// Load a rasterizer and build its atlas; the caller holds the slot lock
    fn build<D, R, F>(&self, device: &D, key: &FontKey, load: F) -> Result<Arc<FontAtlas>>
    where
        D: GraphicsDevice + ?Sized,
        R: Rasterizer,
        F: FnOnce() -> Result<R>,
    {
        let rasterizer = load()?;
        let atlas = Arc::new(FontAtlas::build(device, &rasterizer)?);
        self.builds.fetch_add(1, Ordering::Relaxed);

        info!(
            "Font cached: {} @ {} ({}x{})",
            key.name,
            key.size,
            atlas.width(),
            atlas.height()
        );
        Ok(atlas)
    }

    fn slot(&self, key: &FontKey) -> Slot {
        let mut slots = lock(&self.slots);
        Arc::clone(slots.entry(key.clone()).or_default())
    }

    /// Drop the map entry for an empty slot after a failed build
    ///
    /// Slots are only cloned under the map lock, so a strong count of two
    /// (map plus `slot`) means no other caller can reach it.
    fn forget_slot(&self, key: &FontKey, slot: Slot) {
        let mut slots = lock(&self.slots);
        let unshared = match slots.get(key) {
            Some(current) => Arc::ptr_eq(current, &slot) && Arc::strong_count(&slot) == 2,
            None => false,
        };
        if unshared {
            slots.remove(key);
        }
    }

    #[cfg(test)]
    fn slot_count(&self) -> usize {
        lock(&self.slots).len()
    }

    /// Cached atlas, without building
    ///
    /// Waits if a build for the key is in flight.
    pub fn get(&self, name: &str, size: u32) -> Option<Arc<FontAtlas>> {
        let slot = lock(&self.slots).get(&FontKey::new(name, size)).cloned()?;
        let entry = lock(&slot);
        entry.clone()
    }

    /// Remove a key, handing back its atlas so the owner can release the
    /// texture once nothing draws with it
    pub fn evict(&self, name: &str, size: u32) -> Option<Arc<FontAtlas>> {
        let slot = lock(&self.slots).remove(&FontKey::new(name, size))?;
        let mut entry = lock(&slot);
        let atlas = entry.take();
        if atlas.is_some() {
            info!("Font evicted: {} @ {}", name, size);
        }
        atlas
    }

    /// Number of cached atlases
    pub fn len(&self) -> usize {
        let slots: Vec<Slot> = lock(&self.slots).values().cloned().collect();
        slots.iter().filter(|s| lock(s).is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Successful builds since creation
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}
