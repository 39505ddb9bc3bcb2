mod iter;
mod ops;
mod pos;

pub use iter::IntoIter;
pub use pos::Pos;

use crate::alloc::{capacity_overflow, grown_capacity, RawBuf};
use crate::error::{Error, Result};
use std::mem;
use std::ptr;
use std::slice;

/// DynArray is an owned, contiguous and growable sequence.
///
/// Length and capacity are tracked separately. Appending to a full
/// array doubles its capacity (an empty buffer grows to one slot), so
/// a sequence of N appends copies O(N) elements in total. Positional
/// insertion and removal shift the tail and cost O(n).
///
/// Slots beyond the length are uninitialized and never observed.
pub struct DynArray<T> {
    buf: RawBuf<T>,
    len: usize,
    /// Bumped on every reallocation or element shift, to detect
    /// stale positions.
    gen: u64,
}

impl<T> Default for DynArray<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Drop for DynArray<T> {
    #[inline]
    fn drop(&mut self) {
        // # SAFETY
        //
        // The first `len` slots are always initialized.
        // Buffer itself is released by RawBuf.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                self.buf.as_mut_ptr(),
                self.len,
            ))
        }
    }
}

impl<T> DynArray<T> {
    /// Create an empty array without allocation.
    #[inline]
    pub const fn new() -> Self {
        DynArray {
            buf: RawBuf::new(),
            len: 0,
            gen: 0,
        }
    }

    /// Create an empty array with exactly `cap` slots.
    #[inline]
    pub fn with_capacity(cap: usize) -> Self {
        DynArray {
            buf: RawBuf::with_capacity(cap),
            len: 0,
            gen: 0,
        }
    }

    /// Create an array of `count` default values.
    /// Both length and capacity equal `count`.
    #[inline]
    pub fn with_len(count: usize) -> Self
    where
        T: Default,
    {
        let mut arr = Self::with_capacity(count);
        while arr.len < count {
            // # SAFETY
            //
            // Capacity is exactly `count`.
            unsafe { arr.push_unchecked(T::default()) }
        }
        arr
    }

    /// Take the buffer out of `src`, leaving it empty with zero capacity.
    ///
    /// ```
    /// use dynarr::DynArray;
    ///
    /// let mut src = DynArray::from([1, 2, 3]);
    /// let dst = DynArray::take(&mut src);
    /// assert_eq!(dst, [1, 2, 3]);
    /// assert_eq!(0, src.len());
    /// assert_eq!(0, src.capacity());
    /// ```
    #[inline]
    pub fn take(src: &mut Self) -> Self {
        let gen = src.gen.wrapping_add(1);
        mem::replace(
            src,
            DynArray {
                buf: RawBuf::new(),
                len: 0,
                gen,
            },
        )
    }

    /// Replace contents of self with the buffer of `src`, leaving `src`
    /// empty with zero capacity. Previous elements of self are dropped.
    #[inline]
    pub fn move_from(&mut self, src: &mut Self) {
        let gen = self.gen.wrapping_add(1);
        *self = Self::take(src);
        self.gen = gen;
    }

    /// Returns number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns number of allocated slots.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buf.capacity()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn as_slice(&self) -> &[T] {
        // # SAFETY
        //
        // Pointer is non-null and aligned, first `len` slots are initialized.
        unsafe { slice::from_raw_parts(self.buf.as_ptr(), self.len) }
    }

    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        // # SAFETY
        //
        // Pointer is non-null and aligned, first `len` slots are initialized.
        unsafe { slice::from_raw_parts_mut(self.buf.as_mut_ptr(), self.len) }
    }

    /// Returns the element at given index, or an error if
    /// `index >= len`.
    #[inline]
    pub fn at(&self, index: usize) -> Result<&T> {
        if index >= self.len {
            return Err(Error::out_of_bound("at", index, 0, self.len));
        }
        // # SAFETY
        //
        // Index is checked above.
        Ok(unsafe { self.get_unchecked(index) })
    }

    #[inline]
    pub fn at_mut(&mut self, index: usize) -> Result<&mut T> {
        if index >= self.len {
            return Err(Error::out_of_bound("at", index, 0, self.len));
        }
        // # SAFETY
        //
        // Index is checked above.
        Ok(unsafe { self.get_unchecked_mut(index) })
    }

    /// Returns the element at given index without bound check.
    ///
    /// # Safety
    ///
    /// Caller must guarantee `index < len`.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        debug_assert!(index < self.len);
        &*self.buf.as_ptr().add(index)
    }

    /// Returns the mutable element at given index without bound check.
    ///
    /// # Safety
    ///
    /// Caller must guarantee `index < len`.
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        debug_assert!(index < self.len);
        &mut *self.buf.as_mut_ptr().add(index)
    }

    #[inline]
    pub fn front(&self) -> Result<&T> {
        self.at(0)
            .map_err(|_| Error::IndexOutOfBound("front of empty array".to_string()))
    }

    #[inline]
    pub fn front_mut(&mut self) -> Result<&mut T> {
        self.at_mut(0)
            .map_err(|_| Error::IndexOutOfBound("front of empty array".to_string()))
    }

    #[inline]
    pub fn back(&self) -> Result<&T> {
        match self.len.checked_sub(1) {
            Some(idx) => self.at(idx),
            None => Err(Error::IndexOutOfBound("back of empty array".to_string())),
        }
    }

    #[inline]
    pub fn back_mut(&mut self) -> Result<&mut T> {
        match self.len.checked_sub(1) {
            Some(idx) => self.at_mut(idx),
            None => Err(Error::IndexOutOfBound("back of empty array".to_string())),
        }
    }

    /// Position of the first element.
    #[inline]
    pub fn begin(&self) -> Pos {
        Pos::new(0, self.gen)
    }

    /// Position one past the last element.
    #[inline]
    pub fn end(&self) -> Pos {
        Pos::new(self.len, self.gen)
    }

    /// Position of given index. The index is not validated until the
    /// position is used.
    #[inline]
    pub fn pos(&self, index: usize) -> Pos {
        Pos::new(index, self.gen)
    }

    /// Returns the element at given position.
    #[inline]
    pub fn get_pos(&self, pos: Pos) -> Result<&T> {
        self.check_gen("get", pos)?;
        self.at(pos.index())
    }

    #[inline]
    pub fn get_pos_mut(&mut self, pos: Pos) -> Result<&mut T> {
        self.check_gen("get", pos)?;
        self.at_mut(pos.index())
    }

    #[inline]
    fn check_gen(&self, op: &str, pos: Pos) -> Result<()> {
        if pos.gen() != self.gen {
            return Err(Error::IndexOutOfBound(format!(
                "{} position {} is stale: generation {} != {}",
                op,
                pos.index(),
                pos.gen(),
                self.gen
            )));
        }
        Ok(())
    }

    #[inline]
    fn bump(&mut self) {
        self.gen = self.gen.wrapping_add(1);
    }

    /// Append an element, doubling capacity if the array is full.
    #[inline]
    pub fn push(&mut self, value: T) {
        if self.len == self.buf.capacity() {
            self.grow_for_append();
        }
        // # SAFETY
        //
        // Capacity is ensured to be greater than length.
        unsafe { self.push_unchecked(value) }
    }

    /// Append an element, returning an error instead of aborting if
    /// the buffer cannot grow. The array is unchanged on error.
    #[inline]
    pub fn try_push(&mut self, value: T) -> Result<()> {
        if self.len == self.buf.capacity() {
            self.try_grow_for_append()?;
        }
        // # SAFETY
        //
        // Capacity is ensured to be greater than length.
        unsafe { self.push_unchecked(value) };
        Ok(())
    }

    /// # Safety
    ///
    /// Caller must guarantee `len < capacity`.
    #[inline]
    unsafe fn push_unchecked(&mut self, value: T) {
        debug_assert!(self.len < self.buf.capacity());
        self.buf.as_mut_ptr().add(self.len).write(value);
        self.len += 1;
    }

    /// Remove the last element and return it.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        self.bump();
        // # SAFETY
        //
        // The slot was initialized and is no longer counted in length.
        Some(unsafe { ptr::read(self.buf.as_ptr().add(self.len)) })
    }

    #[inline]
    fn grow_for_append(&mut self) {
        let old_cap = self.buf.capacity();
        let new_cap = grown_capacity(old_cap).unwrap_or_else(|| capacity_overflow(old_cap));
        log::trace!("grow array buffer: capacity {} -> {}", old_cap, new_cap);
        // # SAFETY
        //
        // First `len` slots are initialized and new capacity is larger.
        unsafe { self.buf.relocate(self.len, new_cap) }
        self.bump();
    }

    #[inline]
    fn try_grow_for_append(&mut self) -> Result<()> {
        let old_cap = self.buf.capacity();
        let new_cap = grown_capacity(old_cap).ok_or(Error::CapacityOverflow(old_cap))?;
        log::trace!("grow array buffer: capacity {} -> {}", old_cap, new_cap);
        // # SAFETY
        //
        // First `len` slots are initialized and new capacity is larger.
        unsafe { self.buf.try_relocate(self.len, new_cap)? };
        self.bump();
        Ok(())
    }

    /// Make sure capacity is at least `len + additional`, reallocating
    /// to exactly that amount if it is not.
    #[inline]
    pub fn reserve_exact(&mut self, additional: usize) {
        let required = self
            .len
            .checked_add(additional)
            .unwrap_or_else(|| capacity_overflow(additional));
        if required > self.buf.capacity() {
            log::trace!(
                "reserve array buffer: capacity {} -> {}",
                self.buf.capacity(),
                required
            );
            // # SAFETY
            //
            // First `len` slots are initialized and required capacity is larger.
            unsafe { self.buf.relocate(self.len, required) }
            self.bump();
        }
    }

    #[inline]
    pub fn try_reserve_exact(&mut self, additional: usize) -> Result<()> {
        let required = self
            .len
            .checked_add(additional)
            .ok_or(Error::CapacityOverflow(additional))?;
        if required > self.buf.capacity() {
            log::trace!(
                "reserve array buffer: capacity {} -> {}",
                self.buf.capacity(),
                required
            );
            // # SAFETY
            //
            // First `len` slots are initialized and required capacity is larger.
            unsafe { self.buf.try_relocate(self.len, required)? };
            self.bump();
        }
        Ok(())
    }

    /// Release spare slots so that capacity equals length.
    #[inline]
    pub fn shrink_to_fit(&mut self) {
        if self.buf.capacity() > self.len {
            log::debug!(
                "shrink array buffer: capacity {} -> {}",
                self.buf.capacity(),
                self.len
            );
            // # SAFETY
            //
            // First `len` slots are initialized.
            unsafe { self.buf.relocate(self.len, self.len) }
            self.bump();
        }
    }

    /// Insert an element before given position, which must be within
    /// `[begin, end]`. Returns position of the inserted element.
    ///
    /// On error the array is left unchanged.
    ///
    /// ```
    /// use dynarr::DynArray;
    ///
    /// let mut arr = DynArray::from([1, 3]);
    /// let pos = arr.insert(arr.begin().next(), 2).unwrap();
    /// assert_eq!(1, pos.index());
    /// assert_eq!(arr, [1, 2, 3]);
    /// assert!(arr.insert(arr.end().next(), 4).is_err());
    /// ```
    pub fn insert(&mut self, pos: Pos, value: T) -> Result<Pos> {
        self.check_gen("insert", pos)?;
        let idx = pos.index();
        if idx > self.len {
            return Err(Error::out_of_bound("insert", idx, 0, self.len + 1));
        }
        if self.len == self.buf.capacity() {
            // the index survives reallocation.
            self.grow_for_append();
        }
        // # SAFETY
        //
        // `idx <= len < capacity`, so the shifted range and the written
        // slot are in bound. `ptr::copy` handles the overlap.
        unsafe {
            let p = self.buf.as_mut_ptr().add(idx);
            ptr::copy(p, p.add(1), self.len - idx);
            p.write(value);
        }
        self.len += 1;
        self.bump();
        Ok(Pos::new(idx, self.gen))
    }

    /// Remove the element at given position, which must be within
    /// `[begin, end)`. Returns position of the element that followed
    /// the removed one, which is `end()` if the last element was removed.
    pub fn erase(&mut self, pos: Pos) -> Result<Pos> {
        self.check_gen("erase", pos)?;
        let idx = pos.index();
        if idx >= self.len {
            return Err(Error::out_of_bound("erase", idx, 0, self.len));
        }
        // # SAFETY
        //
        // Index is checked above.
        let removed = unsafe { self.remove_unchecked(idx) };
        drop(removed);
        Ok(Pos::new(idx, self.gen))
    }

    /// Remove and return the element at given index, shifting all
    /// elements after it to the left.
    #[inline]
    pub fn remove(&mut self, index: usize) -> Result<T> {
        if index >= self.len {
            return Err(Error::out_of_bound("remove", index, 0, self.len));
        }
        // # SAFETY
        //
        // Index is checked above.
        Ok(unsafe { self.remove_unchecked(index) })
    }

    /// # Safety
    ///
    /// Caller must guarantee `index < len`.
    #[inline]
    unsafe fn remove_unchecked(&mut self, index: usize) -> T {
        debug_assert!(index < self.len);
        let p = self.buf.as_mut_ptr().add(index);
        let value = ptr::read(p);
        ptr::copy(p.add(1), p, self.len - index - 1);
        self.len -= 1;
        self.bump();
        value
    }

    /// Shorten the array to `len` elements, dropping the rest.
    /// Capacity is kept.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        if len >= self.len {
            return;
        }
        // # SAFETY
        //
        // `len < self.len`, so the offset is in bound.
        let tail_ptr = unsafe { self.buf.as_mut_ptr().add(len) };
        let tail = ptr::slice_from_raw_parts_mut(tail_ptr, self.len - len);
        // update length before dropping, so a panicking drop cannot
        // cause the tail to be dropped again.
        self.len = len;
        self.bump();
        // # SAFETY
        //
        // Tail elements are initialized and no longer counted.
        unsafe { ptr::drop_in_place(tail) }
    }

    /// Drop all elements. Capacity is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.truncate(0);
    }

    /// Resize the array to `count` elements.
    ///
    /// If `count` differs from current length, a new buffer of exactly
    /// `count` slots replaces the old one: the first `min(count, len)`
    /// elements are moved over, the rest are dropped, and new slots
    /// are filled with default values. Resizing to current length is
    /// a no-op.
    pub fn resize(&mut self, count: usize)
    where
        T: Default,
    {
        if count == self.len {
            return;
        }
        log::debug!(
            "resize array: len {} -> {}, capacity {} -> {}",
            self.len,
            count,
            self.buf.capacity(),
            count
        );
        let keep = count.min(self.len);
        let mut new_buf = RawBuf::with_capacity(count);
        // # SAFETY
        //
        // First `keep` slots of old buffer are initialized and fit into
        // the new buffer.
        unsafe { ptr::copy_nonoverlapping(self.buf.as_ptr(), new_buf.as_mut_ptr(), keep) };
        let mut old_buf = mem::replace(&mut self.buf, new_buf);
        let old_len = mem::replace(&mut self.len, keep);
        self.bump();
        // # SAFETY
        //
        // Slots `[keep, old_len)` of old buffer are initialized and were
        // not moved. The old buffer is released even if a drop panics.
        unsafe {
            ptr::drop_in_place(ptr::slice_from_raw_parts_mut(
                old_buf.as_mut_ptr().add(keep),
                old_len - keep,
            ))
        };
        drop(old_buf);
        while self.len < count {
            // # SAFETY
            //
            // Capacity is exactly `count`.
            unsafe { self.push_unchecked(T::default()) }
        }
    }

    /// Exchange contents with another array in O(1).
    #[inline]
    pub fn swap(&mut self, other: &mut Self) {
        mem::swap(&mut self.buf, &mut other.buf);
        mem::swap(&mut self.len, &mut other.len);
        self.bump();
        other.bump();
    }
}
