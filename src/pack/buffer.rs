//! Tile storage that is either allocated here or borrowed from the caller
//!
//! Owned storage is zero-initialized and 64-byte aligned (AVX-512 line
//! size). Whether memory is released on drop is decided by the variant of
//! [`Storage`], never by comparing pointers.

use bytemuck::Zeroable;
use std::alloc::{Layout as AllocLayout, alloc_zeroed, dealloc, handle_alloc_error};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};
use std::ptr::NonNull;

/// Alignment of internally allocated buffers, in bytes
pub const BUFFER_ALIGN: usize = 64;

/// Zero-initialized, 64-byte aligned heap buffer
pub struct AlignedBuffer<T> {
    ptr: NonNull<T>,
    len: usize,
    _marker: PhantomData<T>,
}

// SAFETY: AlignedBuffer uniquely owns its allocation, like Vec<T>.
unsafe impl<T: Send> Send for AlignedBuffer<T> {}
// SAFETY: shared access only hands out &[T].
unsafe impl<T: Sync> Sync for AlignedBuffer<T> {}

impl<T: Zeroable> AlignedBuffer<T> {
    /// Allocate `len` zeroed elements
    ///
    /// Aborts through [`handle_alloc_error`] if the allocator fails.
    pub fn zeroed(len: usize) -> Self {
        let layout = Self::layout(len);
        if layout.size() == 0 {
            return Self {
                ptr: NonNull::dangling(),
                len,
                _marker: PhantomData,
            };
        }

        // SAFETY: layout has non-zero size; all-zero bytes are a valid T.
        let raw = unsafe { alloc_zeroed(layout) } as *mut T;
        let Some(ptr) = NonNull::new(raw) else {
            handle_alloc_error(layout);
        };

        Self {
            ptr,
            len,
            _marker: PhantomData,
        }
    }
}

impl<T> AlignedBuffer<T> {
    fn layout(len: usize) -> AllocLayout {
        let size = len
            .checked_mul(std::mem::size_of::<T>())
            .unwrap_or_else(|| panic!("aligned buffer of {len} elements overflows usize"));
        let align = BUFFER_ALIGN.max(std::mem::align_of::<T>());
        AllocLayout::from_size_align(size, align)
            .unwrap_or_else(|e| panic!("invalid aligned buffer layout: {e}"))
    }

    /// Number of elements
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the buffer holds no elements
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl<T> Deref for AlignedBuffer<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        // SAFETY: ptr is valid (or dangling with zero size) for len elements.
        unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> DerefMut for AlignedBuffer<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        // SAFETY: ptr is valid for len elements and uniquely borrowed.
        unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
    }
}

impl<T> Drop for AlignedBuffer<T> {
    fn drop(&mut self) {
        let layout = Self::layout(self.len);
        if layout.size() == 0 {
            return;
        }
        // SAFETY: allocated in `zeroed` with this exact layout.
        unsafe {
            dealloc(self.ptr.as_ptr() as *mut u8, layout);
        }
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for AlignedBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlignedBuffer")
            .field("len", &self.len)
            .field("ptr", &self.ptr)
            .finish()
    }
}

/// Buffer storage with an explicit ownership flag
#[derive(Debug)]
pub enum Storage<'a, T> {
    /// Allocated by the packer and released when it is dropped
    Owned(AlignedBuffer<T>),
    /// Supplied by the caller; never released here
    Borrowed(&'a mut [T]),
}

impl<'a, T: Zeroable> Storage<'a, T> {
    /// Adopt `external` if given, otherwise allocate `len` aligned elements
    pub fn new_or_borrowed(external: Option<&'a mut [T]>, len: usize) -> Self {
        match external {
            Some(buf) => Self::Borrowed(buf),
            None => Self::Owned(AlignedBuffer::zeroed(len)),
        }
    }
}

impl<T> Storage<'_, T> {
    /// Returns true if this storage is released on drop
    #[inline]
    pub fn is_owned(&self) -> bool {
        matches!(self, Self::Owned(_))
    }
}

impl<T> Deref for Storage<'_, T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        match self {
            Self::Owned(buf) => buf,
            Self::Borrowed(buf) => buf,
        }
    }
}

impl<T> DerefMut for Storage<'_, T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        match self {
            Self::Owned(buf) => buf,
            Self::Borrowed(buf) => buf,
        }
    }
}
