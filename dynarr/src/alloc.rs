use crate::error::{Error, Result};
use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::marker::PhantomData;
use std::mem::{align_of, size_of};
use std::ptr::{self, NonNull};

/// Capacity of the first allocation made for an empty buffer on append.
pub const MIN_NON_ZERO_CAP: usize = 1;
/// Multiplier applied to the capacity of a full buffer on append.
pub const GROWTH_FACTOR: usize = 2;

/// Returns the capacity after one growth step, or None on overflow.
#[inline]
pub fn grown_capacity(cap: usize) -> Option<usize> {
    if cap == 0 {
        Some(MIN_NON_ZERO_CAP)
    } else {
        cap.checked_mul(GROWTH_FACTOR)
    }
}

#[cold]
#[inline(never)]
pub(crate) fn capacity_overflow(cap: usize) -> ! {
    panic!("capacity overflow({})", cap)
}

/// RawBuf is a safe abstraction of an owned, uninitialized buffer
/// holding `cap` slots of `T`.
///
/// It never tracks which slots are initialized, so dropping a RawBuf
/// only releases memory. Owners must drop live elements themselves.
pub struct RawBuf<T> {
    ptr: NonNull<T>,
    cap: usize,
    _marker: PhantomData<T>,
}

unsafe impl<T: Send> Send for RawBuf<T> {}
unsafe impl<T: Sync> Sync for RawBuf<T> {}

impl<T> Drop for RawBuf<T> {
    #[inline]
    fn drop(&mut self) {
        if let Some(layout) = self.current_layout() {
            // # SAFETY
            //
            // The pointer was returned by `alloc` with exactly this layout.
            unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) }
        }
    }
}

impl<T> Default for RawBuf<T> {
    #[inline]
    fn default() -> Self {
        RawBuf::new()
    }
}

impl<T> RawBuf<T> {
    /// Create an empty buffer without allocation.
    #[inline]
    pub const fn new() -> Self {
        RawBuf {
            ptr: NonNull::dangling(),
            cap: 0,
            _marker: PhantomData,
        }
    }

    /// Create a buffer with exactly `cap` slots.
    ///
    /// Panics if the byte size overflows, and aborts through
    /// `handle_alloc_error` if the allocator fails.
    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        let layout = match Layout::array::<T>(cap) {
            Ok(layout) => layout,
            Err(_) => capacity_overflow(cap),
        };
        match Self::allocate(layout, cap) {
            Some(buf) => buf,
            None => handle_alloc_error(layout),
        }
    }

    /// Create a buffer with exactly `cap` slots, reporting failures
    /// as errors.
    #[inline]
    pub fn try_with_capacity(cap: usize) -> Result<Self> {
        let layout = Layout::array::<T>(cap).map_err(|_| Error::CapacityOverflow(cap))?;
        Self::allocate(layout, cap).ok_or(Error::InsufficientMemory(layout.size()))
    }

    #[inline]
    fn allocate(layout: Layout, cap: usize) -> Option<Self> {
        if layout.size() == 0 {
            // zero capacity or zero sized type, nothing to allocate.
            return Some(RawBuf {
                ptr: NonNull::dangling(),
                cap,
                _marker: PhantomData,
            });
        }
        // # SAFETY
        //
        // Layout size is non-zero.
        let ptr = unsafe { alloc(layout) } as *mut T;
        NonNull::new(ptr).map(|ptr| RawBuf {
            ptr,
            cap,
            _marker: PhantomData,
        })
    }

    #[inline]
    fn current_layout(&self) -> Option<Layout> {
        if self.cap == 0 || size_of::<T>() == 0 {
            return None;
        }
        // # SAFETY
        //
        // The same size and alignment passed `Layout::array` on allocation.
        Some(unsafe {
            Layout::from_size_align_unchecked(size_of::<T>() * self.cap, align_of::<T>())
        })
    }

    /// Returns number of slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.cap
    }

    #[inline]
    pub fn as_ptr(&self) -> *const T {
        self.ptr.as_ptr()
    }

    #[inline]
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.ptr.as_ptr()
    }

    /// Move the first `len` elements into a new buffer of `new_cap` slots
    /// and release the old one.
    ///
    /// # Safety
    ///
    /// Caller must guarantee the first `len` slots are initialized and
    /// `len <= new_cap`.
    #[inline]
    pub unsafe fn relocate(&mut self, len: usize, new_cap: usize) {
        debug_assert!(len <= new_cap && len <= self.cap);
        let new_buf = Self::with_capacity(new_cap);
        self.adopt(new_buf, len);
    }

    /// Fallible version of [`relocate`](Self::relocate). The buffer is
    /// untouched if the allocation fails.
    ///
    /// # Safety
    ///
    /// Same as [`relocate`](Self::relocate).
    #[inline]
    pub unsafe fn try_relocate(&mut self, len: usize, new_cap: usize) -> Result<()> {
        debug_assert!(len <= new_cap && len <= self.cap);
        let new_buf = Self::try_with_capacity(new_cap)?;
        self.adopt(new_buf, len);
        Ok(())
    }

    #[inline]
    unsafe fn adopt(&mut self, mut new_buf: Self, len: usize) {
        ptr::copy_nonoverlapping(self.as_ptr(), new_buf.as_mut_ptr(), len);
        // old memory is released only after all elements are moved.
        let old = std::mem::replace(self, new_buf);
        drop(old);
    }
}
