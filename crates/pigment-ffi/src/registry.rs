//! Process-wide handle registries
//!
//! Every object handed across the C ABI lives in a registry and is named
//! by the raw form of its generational [`Handle`]. Removal bumps the slot
//! generation, so stale handles never resolve again.

use std::sync::{Arc, LazyLock, Mutex, MutexGuard, PoisonError};

use pigment_render::{Font, Handle, HandleTable, Image, Resource, VectorPath};

/// Resources are locked individually so draw calls on different resources
/// do not contend on the registry
pub(crate) type SharedResource = Arc<Mutex<Resource>>;

/// Paths are edited in place by the builder entry points
pub(crate) type SharedPath = Arc<Mutex<VectorPath>>;

pub(crate) static RESOURCES: LazyLock<Registry<SharedResource>> = LazyLock::new(Registry::new);
pub(crate) static PATHS: LazyLock<Registry<SharedPath>> = LazyLock::new(Registry::new);
pub(crate) static FONTS: LazyLock<Registry<Font>> = LazyLock::new(Registry::new);
pub(crate) static IMAGES: LazyLock<Registry<Image>> = LazyLock::new(Registry::new);

pub(crate) struct Registry<T> {
    table: Mutex<HandleTable<T>>,
}

impl<T: Clone> Registry<T> {
    fn new() -> Self {
        Self {
            table: Mutex::new(HandleTable::new()),
        }
    }

    fn table(&self) -> MutexGuard<'_, HandleTable<T>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register `value`, returning its raw handle (never 0)
    pub(crate) fn insert(&self, value: T) -> u64 {
        self.table().insert(value).to_raw()
    }

    pub(crate) fn get(&self, raw: u64) -> Option<T> {
        let handle = Handle::from_raw(raw)?;
        self.table().get(handle).cloned()
    }

    pub(crate) fn remove(&self, raw: u64) -> Option<T> {
        let handle = Handle::from_raw(raw)?;
        self.table().remove(handle)
    }
}

/// Lock a shared resource, recovering from a poisoned lock
pub(crate) fn lock(resource: &SharedResource) -> MutexGuard<'_, Resource> {
    resource.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Run `f` on the resource named by `handle`; `None` for unknown handles
pub(crate) fn with_resource<R>(handle: u64, op: &str, f: impl FnOnce(&mut Resource) -> R) -> Option<R> {
    let Some(resource) = RESOURCES.get(handle) else {
        tracing::warn!("{}: unknown resource handle {:#x}", op, handle);
        return None;
    };
    let mut guard = lock(&resource);
    Some(f(&mut guard))
}

/// Run `f` on the path named by `handle`; `None` for unknown handles
pub(crate) fn with_path<R>(handle: u64, op: &str, f: impl FnOnce(&mut VectorPath) -> R) -> Option<R> {
    let Some(path) = PATHS.get(handle) else {
        tracing::warn!("{}: unknown path handle {:#x}", op, handle);
        return None;
    };
    let mut guard = path.lock().unwrap_or_else(PoisonError::into_inner);
    Some(f(&mut guard))
}

pub(crate) fn font(handle: u64, op: &str) -> Option<Font> {
    let font = FONTS.get(handle);
    if font.is_none() {
        tracing::warn!("{}: unknown font handle {:#x}", op, handle);
    }
    font
}

pub(crate) fn image(handle: u64, op: &str) -> Option<Image> {
    let image = IMAGES.get(handle);
    if image.is_none() {
        tracing::warn!("{}: unknown image handle {:#x}", op, handle);
    }
    image
}
