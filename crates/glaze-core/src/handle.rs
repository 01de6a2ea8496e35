//! RAII ownership of externally reference-counted native handles.
//!
//! Backends hand the core raw pointers whose lifetime is managed by the
//! native toolkit's own acquire/release pair (GObject ref/unref, COM
//! AddRef/Release, CFRetain/CFRelease). `RawHandle` wraps one such pointer
//! with the pair so that clone acquires and drop releases exactly once.

use std::ffi::c_void;

/// The acquire/release pair for one native resource kind.
pub struct HandleOps<T> {
    pub acquire: unsafe fn(*mut T),
    pub release: unsafe fn(*mut T),
}

impl<T> Clone for HandleOps<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for HandleOps<T> {}

/// Owns one reference to a native resource.
///
/// A null handle is valid and inert: it clones and drops without touching
/// the ops. `into_raw` leaks the reference to the caller.
pub struct RawHandle<T> {
    ptr: *mut T,
    ops: HandleOps<T>,
}

impl<T> RawHandle<T> {
    /// Take ownership of an existing reference without acquiring.
    ///
    /// # Safety
    /// `ptr` must be null or carry one reference the caller transfers to
    /// the handle, and `ops` must be safe to call from any thread for the
    /// whole lifetime of the resource.
    pub unsafe fn adopt(ptr: *mut T, ops: HandleOps<T>) -> Self {
        Self { ptr, ops }
    }

    /// Acquire a new reference to `ptr` and own it.
    ///
    /// # Safety
    /// Same contract as [`RawHandle::adopt`], except the caller keeps its
    /// own reference.
    pub unsafe fn acquire(ptr: *mut T, ops: HandleOps<T>) -> Self {
        if !ptr.is_null() {
            (ops.acquire)(ptr);
        }
        Self { ptr, ops }
    }

    /// A handle holding no resource.
    pub fn null(ops: HandleOps<T>) -> Self {
        Self {
            ptr: std::ptr::null_mut(),
            ops,
        }
    }

    pub fn as_ptr(&self) -> *mut T {
        self.ptr
    }

    pub fn is_null(&self) -> bool {
        self.ptr.is_null()
    }

    /// Give up ownership; the caller becomes responsible for the release.
    pub fn into_raw(self) -> *mut T {
        let ptr = self.ptr;
        std::mem::forget(self);
        ptr
    }
}

impl<T> Clone for RawHandle<T> {
    fn clone(&self) -> Self {
        // Acquire before adopting so the refcount never dips.
        unsafe { Self::acquire(self.ptr, self.ops) }
    }

    fn clone_from(&mut self, source: &Self) {
        if std::ptr::eq(self, source) {
            return;
        }
        // Acquire the source first: releasing our own pointer before the
        // acquire could free it when both handles point at the same object.
        let next = source.clone();
        *self = next;
    }
}

impl<T> Drop for RawHandle<T> {
    fn drop(&mut self) {
        if !self.ptr.is_null() {
            unsafe { (self.ops.release)(self.ptr) };
        }
    }
}

// The unsafe constructors require ops that tolerate any thread; handles
// cross threads inside dispatch replies.
unsafe impl<T> Send for RawHandle<T> {}
unsafe impl<T> Sync for RawHandle<T> {}

/// A page favicon as handed out by the backend.
///
/// Backends without favicon support return [`Icon::none`]; the facade
/// surfaces that as an empty icon, not an error.
#[derive(Clone, Default)]
pub struct Icon {
    handle: Option<RawHandle<c_void>>,
}

impl Icon {
    pub fn none() -> Self {
        Self { handle: None }
    }

    /// Wrap a native image handle.
    ///
    /// # Safety
    /// Same contract as the [`RawHandle`] constructors.
    pub unsafe fn from_handle(handle: RawHandle<c_void>) -> Self {
        Self {
            handle: (!handle.is_null()).then_some(handle),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.handle.is_none()
    }

    pub fn as_ptr(&self) -> *mut c_void {
        self.handle
            .as_ref()
            .map(RawHandle::as_ptr)
            .unwrap_or(std::ptr::null_mut())
    }
}

impl std::fmt::Debug for Icon {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Icon")
            .field("empty", &self.is_empty())
            .finish()
    }
}
