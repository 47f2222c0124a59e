//! Name-keyed cache of immutable assets, addressed by generational handles.
//!
//! Handles stay valid while the asset is cached. Evicting an entry bumps its slot generation, so
//! a stale handle resolves to `None` instead of aliasing whatever reuses the slot.

use crate::{AnimationClip, Error, SkeletonData};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::Arc;

pub struct AssetHandle<T> {
    index: usize,
    generation: u32,
    _marker: PhantomData<fn() -> T>,
}

impl<T> AssetHandle<T> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl<T> Clone for AssetHandle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for AssetHandle<T> {}

impl<T> PartialEq for AssetHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.generation == other.generation
    }
}

impl<T> Eq for AssetHandle<T> {}

impl<T> std::hash::Hash for AssetHandle<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.index.hash(state);
        self.generation.hash(state);
    }
}

impl<T> std::fmt::Debug for AssetHandle<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetHandle")
            .field("index", &self.index)
            .field("generation", &self.generation)
            .finish()
    }
}

/// Produces assets for names that are not cached yet.
pub trait AssetSource<T> {
    fn read(&mut self, name: &str) -> Result<T, Error>;
}

/// An in-memory source, mostly useful for tests and procedurally built assets.
impl<T: Clone> AssetSource<T> for HashMap<String, T> {
    fn read(&mut self, name: &str) -> Result<T, Error> {
        self.get(name).cloned().ok_or_else(|| Error::UnknownAsset {
            name: name.to_string(),
        })
    }
}

#[derive(Debug)]
struct CachedAsset<T> {
    name: String,
    asset: Arc<T>,
    refs: u32,
}

#[derive(Debug)]
struct AssetSlot<T> {
    generation: u32,
    entry: Option<CachedAsset<T>>,
}

#[derive(Debug)]
pub struct AssetCache<T> {
    slots: Vec<AssetSlot<T>>,
    free_list: Vec<usize>,
    by_name: HashMap<String, usize>,
}

pub type SkeletonCache = AssetCache<SkeletonData>;
pub type ClipCache = AssetCache<AnimationClip>;

impl<T> Default for AssetCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AssetCache<T> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Returns the cached asset for `name`, reading it from `source` on first use. Every
    /// successful call adds a reference that must be returned with [`AssetCache::release`].
    pub fn load<S>(&mut self, name: &str, source: &mut S) -> Result<AssetHandle<T>, Error>
    where
        S: AssetSource<T> + ?Sized,
    {
        if let Some(&index) = self.by_name.get(name) {
            let slot = &mut self.slots[index];
            if let Some(entry) = slot.entry.as_mut() {
                entry.refs += 1;
                return Ok(Self::handle(index, slot.generation));
            }
        }

        let asset = source.read(name).inspect_err(|err| {
            log::error!("failed to load asset {name}: {err}");
        })?;
        Ok(self.insert(name, Arc::new(asset), 1))
    }

    /// Registers an asset built elsewhere. Replaces any cached asset with the same name; handles
    /// to the replaced asset become stale.
    pub fn insert_existing(&mut self, name: &str, asset: Arc<T>) -> AssetHandle<T> {
        if let Some(index) = self.by_name.remove(name) {
            self.free_slot(index);
        }
        self.insert(name, asset, 0)
    }

    pub fn get(&self, handle: AssetHandle<T>) -> Option<Arc<T>> {
        self.entry(handle).map(|e| e.asset.clone())
    }

    pub fn handle_of(&self, name: &str) -> Option<AssetHandle<T>> {
        let index = *self.by_name.get(name)?;
        Some(Self::handle(index, self.slots[index].generation))
    }

    pub fn name_of(&self, handle: AssetHandle<T>) -> Option<&str> {
        self.entry(handle).map(|e| e.name.as_str())
    }

    pub fn ref_count(&self, handle: AssetHandle<T>) -> Option<u32> {
        self.entry(handle).map(|e| e.refs)
    }

    pub fn release(&mut self, handle: AssetHandle<T>) -> Result<(), Error> {
        let slot = self.slots.get_mut(handle.index).ok_or(Error::StaleHandle)?;
        if slot.generation != handle.generation {
            return Err(Error::StaleHandle);
        }
        let entry = slot.entry.as_mut().ok_or(Error::StaleHandle)?;
        entry.refs = entry.refs.saturating_sub(1);
        Ok(())
    }

    /// Evicts every asset nobody holds a reference to. Returns the number of evicted entries.
    pub fn clear_unreferenced(&mut self) -> usize {
        let unreferenced = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| match &slot.entry {
                Some(entry) if entry.refs == 0 => Some(index),
                _ => None,
            })
            .collect::<Vec<_>>();

        for &index in &unreferenced {
            if let Some(entry) = self.slots[index].entry.as_ref() {
                self.by_name.remove(&entry.name);
            }
            self.free_slot(index);
        }
        if !unreferenced.is_empty() {
            log::debug!("evicted {} unreferenced assets", unreferenced.len());
        }
        unreferenced.len()
    }

    fn handle(index: usize, generation: u32) -> AssetHandle<T> {
        AssetHandle {
            index,
            generation,
            _marker: PhantomData,
        }
    }

    fn entry(&self, handle: AssetHandle<T>) -> Option<&CachedAsset<T>> {
        let slot = self.slots.get(handle.index)?;
        if slot.generation != handle.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn insert(&mut self, name: &str, asset: Arc<T>, refs: u32) -> AssetHandle<T> {
        let entry = CachedAsset {
            name: name.to_string(),
            asset,
            refs,
        };
        let index = match self.free_list.pop() {
            Some(index) => {
                self.slots[index].entry = Some(entry);
                index
            }
            None => {
                self.slots.push(AssetSlot {
                    generation: 0,
                    entry: Some(entry),
                });
                self.slots.len() - 1
            }
        };
        self.by_name.insert(name.to_string(), index);
        Self::handle(index, self.slots[index].generation)
    }

    fn free_slot(&mut self, index: usize) {
        let slot = &mut self.slots[index];
        slot.entry = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(index);
    }
}
