use super::{DynArray, Pos};
use crate::alloc::RawBuf;
use scopeguard::guard;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, AddAssign, Deref, DerefMut, Index, IndexMut};

impl<T: Clone> DynArray<T> {
    /// Append clones of all elements in `other`.
    ///
    /// If spare capacity is not enough, the buffer is reallocated to
    /// exactly `len + other.len()` slots rather than doubled.
    ///
    /// ```
    /// use dynarr::DynArray;
    ///
    /// let mut arr = DynArray::from([1, 2]);
    /// arr.append_range(&DynArray::from([3, 4, 5]));
    /// assert_eq!(arr, [1, 2, 3, 4, 5]);
    /// assert_eq!(5, arr.capacity());
    /// ```
    #[inline]
    pub fn append_range(&mut self, other: &[T]) {
        self.reserve_exact(other.len());
        // # SAFETY
        //
        // Capacity is reserved above.
        unsafe { self.extend_cloned_unchecked(other) }
    }

    /// # Safety
    ///
    /// Caller must guarantee `len + src.len() <= capacity`.
    #[inline]
    unsafe fn extend_cloned_unchecked(&mut self, src: &[T]) {
        debug_assert!(self.len + src.len() <= self.buf.capacity());
        let dst = self.buf.as_mut_ptr();
        // length is written back even if a clone panics, so the array
        // owns exactly the elements written so far.
        let mut len = guard(self.len, |len| self.len = len);
        for item in src {
            dst.add(*len).write(item.clone());
            *len += 1;
        }
    }
}

/// Cloned array has capacity equal to length of the source.
impl<T: Clone> Clone for DynArray<T> {
    #[inline]
    fn clone(&self) -> Self {
        let mut arr = DynArray::with_capacity(self.len);
        // # SAFETY
        //
        // Capacity equals source length.
        unsafe { arr.extend_cloned_unchecked(self.as_slice()) };
        arr
    }

    /// Overwrite self with clones of `src`. The buffer is reused when
    /// its capacity equals the source capacity, otherwise it is replaced
    /// by one of the source capacity.
    fn clone_from(&mut self, src: &Self) {
        if self.buf.capacity() != src.buf.capacity() {
            log::trace!(
                "reallocate array buffer for assignment: capacity {} -> {}",
                self.buf.capacity(),
                src.buf.capacity()
            );
            let new_buf = RawBuf::with_capacity(src.buf.capacity());
            self.clear();
            self.buf = new_buf;
        }
        let common = self.len.min(src.len);
        self.as_mut_slice()[..common].clone_from_slice(&src.as_slice()[..common]);
        self.truncate(src.len);
        // # SAFETY
        //
        // Capacity equals source capacity, which holds source length.
        unsafe { self.extend_cloned_unchecked(&src.as_slice()[common..]) };
        self.bump();
    }
}

impl<T: Clone> AddAssign<&DynArray<T>> for DynArray<T> {
    #[inline]
    fn add_assign(&mut self, rhs: &DynArray<T>) {
        self.append_range(rhs);
    }
}

impl<T: Clone> Add<&DynArray<T>> for &DynArray<T> {
    type Output = DynArray<T>;

    #[inline]
    fn add(self, rhs: &DynArray<T>) -> DynArray<T> {
        let mut res = self.clone();
        res += rhs;
        res
    }
}

impl<T: Clone> Add<&DynArray<T>> for DynArray<T> {
    type Output = DynArray<T>;

    #[inline]
    fn add(mut self, rhs: &DynArray<T>) -> DynArray<T> {
        self += rhs;
        self
    }
}

impl<T, U> PartialEq<DynArray<U>> for DynArray<T>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &DynArray<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Eq> Eq for DynArray<T> {}

impl<T, U> PartialEq<[U]> for DynArray<T>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U]) -> bool {
        self.as_slice() == other
    }
}

impl<T, U, const N: usize> PartialEq<[U; N]> for DynArray<T>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &[U; N]) -> bool {
        self.as_slice() == &other[..]
    }
}

impl<T, U> PartialEq<Vec<U>> for DynArray<T>
where
    T: PartialEq<U>,
{
    #[inline]
    fn eq(&self, other: &Vec<U>) -> bool {
        self.as_slice() == other.as_slice()
    }
}

impl<T: Hash> Hash for DynArray<T> {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_slice().hash(state)
    }
}

impl<T: fmt::Debug> fmt::Debug for DynArray<T> {
    #[inline]
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_slice(), f)
    }
}

/// Renders elements as `{e0,e1,...}`, and an empty array as `{}`.
impl<T: fmt::Display> fmt::Display for DynArray<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, item) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            fmt::Display::fmt(item, f)?;
        }
        f.write_str("}")
    }
}

impl<T> Deref for DynArray<T> {
    type Target = [T];

    #[inline]
    fn deref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> DerefMut for DynArray<T> {
    #[inline]
    fn deref_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

impl<T> AsRef<[T]> for DynArray<T> {
    #[inline]
    fn as_ref(&self) -> &[T] {
        self.as_slice()
    }
}

impl<T> AsMut<[T]> for DynArray<T> {
    #[inline]
    fn as_mut(&mut self) -> &mut [T] {
        self.as_mut_slice()
    }
}

/// Panics if index is out of bound, like slice indexing.
impl<T> Index<usize> for DynArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.as_slice()[index]
    }
}

impl<T> IndexMut<usize> for DynArray<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.as_mut_slice()[index]
    }
}

/// Panics if the position is stale or out of bound.
impl<T> Index<Pos> for DynArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, pos: Pos) -> &T {
        match self.get_pos(pos) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T> IndexMut<Pos> for DynArray<T> {
    #[inline]
    fn index_mut(&mut self, pos: Pos) -> &mut T {
        match self.get_pos_mut(pos) {
            Ok(item) => item,
            Err(e) => panic!("{}", e),
        }
    }
}

impl<T, const N: usize> From<[T; N]> for DynArray<T> {
    #[inline]
    fn from(src: [T; N]) -> Self {
        let mut arr = DynArray::with_capacity(N);
        for item in src {
            arr.push(item);
        }
        arr
    }
}

impl<T> From<Vec<T>> for DynArray<T> {
    #[inline]
    fn from(src: Vec<T>) -> Self {
        let mut arr = DynArray::with_capacity(src.len());
        for item in src {
            arr.push(item);
        }
        arr
    }
}

impl<T: Clone> From<&[T]> for DynArray<T> {
    #[inline]
    fn from(src: &[T]) -> Self {
        let mut arr = DynArray::with_capacity(src.len());
        arr.append_range(src);
        arr
    }
}

impl<T> From<DynArray<T>> for Vec<T> {
    #[inline]
    fn from(src: DynArray<T>) -> Self {
        src.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::tests::Tracked;
    use std::cell::Cell;
    use std::collections::hash_map::DefaultHasher;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::rc::Rc;

    /// Element whose clone panics for value 3.
    #[derive(Debug)]
    struct Brittle {
        val: i32,
        live: Rc<Cell<usize>>,
    }

    impl Brittle {
        fn new(val: i32, live: &Rc<Cell<usize>>) -> Self {
            live.set(live.get() + 1);
            Brittle {
                val,
                live: Rc::clone(live),
            }
        }
    }

    impl Clone for Brittle {
        fn clone(&self) -> Self {
            if self.val == 3 {
                panic!("clone of brittle value");
            }
            Brittle::new(self.val, &self.live)
        }
    }

    impl Drop for Brittle {
        fn drop(&mut self) {
            self.live.set(self.live.get() - 1);
        }
    }

    fn hash_of<T: Hash>(v: &T) -> u64 {
        let mut hasher = DefaultHasher::new();
        v.hash(&mut hasher);
        hasher.finish()
    }

    #[test]
    fn test_clone() {
        let mut arr = DynArray::with_capacity(16);
        arr.extend([1, 2, 3]);
        let cloned = arr.clone();
        assert_eq!(arr, cloned);
        assert_eq!(3, cloned.capacity());

        let empty = DynArray::<i32>::new();
        let cloned = empty.clone();
        assert!(cloned.is_empty());
        assert_eq!(0, cloned.capacity());
    }

    #[test]
    fn test_clone_from_same_capacity() {
        let drops = Rc::new(Cell::new(0));
        let src: DynArray<Tracked> = (0..3).map(|i| Tracked::new(i, &drops)).collect();
        let mut tgt: DynArray<Tracked> = (10..13).map(|i| Tracked::new(i, &drops)).collect();
        tgt.pop();
        assert_eq!(1, drops.get());
        let ptr = tgt.as_ptr();
        tgt.clone_from(&src);
        assert_eq!(src, tgt);
        assert_eq!(ptr, tgt.as_ptr());
        assert_eq!(3, tgt.capacity());
    }

    #[test]
    fn test_clone_from_other_capacity() {
        let src = DynArray::from(["a".to_string(), "b".to_string()]);
        let mut tgt = DynArray::with_capacity(8);
        tgt.extend(["x", "y", "z"].iter().map(|s| s.to_string()));
        tgt.clone_from(&src);
        assert_eq!(tgt, ["a", "b"]);
        assert_eq!(2, tgt.capacity());

        let mut bigger = DynArray::with_capacity(4);
        bigger.push("q".to_string());
        let mut tgt = DynArray::from(["x".to_string()]);
        tgt.clone_from(&bigger);
        assert_eq!(tgt, ["q"]);
        assert_eq!(4, tgt.capacity());
    }

    #[test]
    fn test_clone_panic_safety() {
        let live = Rc::new(Cell::new(0));
        let arr: DynArray<Brittle> = (0..5).map(|i| Brittle::new(i, &live)).collect();
        assert_eq!(5, live.get());
        let res = catch_unwind(AssertUnwindSafe(|| arr.clone()));
        assert!(res.is_err());
        assert_eq!(5, live.get());

        let mut dst = DynArray::new();
        dst.push(Brittle::new(100, &live));
        let res = catch_unwind(AssertUnwindSafe(|| dst.append_range(&arr)));
        assert!(res.is_err());
        assert_eq!(4, dst.len());
        assert_eq!(
            vec![100, 0, 1, 2],
            dst.iter().map(|b| b.val).collect::<Vec<_>>()
        );
        drop(dst);
        assert_eq!(5, live.get());
        drop(arr);
        assert_eq!(0, live.get());
    }

    #[test]
    fn test_append_range() {
        let mut arr = DynArray::with_capacity(10);
        arr.extend([1, 2]);
        arr += &DynArray::from([3, 4]);
        assert_eq!(10, arr.capacity());
        assert_eq!(arr, [1, 2, 3, 4]);

        let mut arr = DynArray::from([1, 2]);
        arr += &DynArray::from([3, 4, 5]);
        assert_eq!(5, arr.capacity());

        arr += &DynArray::new();
        assert_eq!(arr, [1, 2, 3, 4, 5]);
        assert_eq!(5, arr.capacity());

        let mut empty = DynArray::new();
        empty.append_range(&[7, 8]);
        assert_eq!(empty, [7, 8]);
        assert_eq!(2, empty.capacity());
    }

    #[test]
    fn test_concat() {
        let a = DynArray::from([1, 2]);
        let b = DynArray::from([3, 4]);
        let c = &a + &b;
        assert_eq!(4, c.len());
        assert_eq!(c, [1, 2, 3, 4]);
        assert_eq!(a, [1, 2]);
        assert_eq!(b, [3, 4]);

        let empty = DynArray::<i32>::new();
        assert_eq!(&a + &empty, a);
        assert_eq!(&empty + &b, b);
        assert!((&empty + &empty).is_empty());

        let d = a + &b;
        assert_eq!(d, vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_equality() {
        let mut a = DynArray::with_capacity(10);
        a.extend([1, 2, 3]);
        let b = DynArray::from([1, 2, 3]);
        assert_eq!(a, b);
        assert_eq!(hash_of(&a), hash_of(&b));
        assert_ne!(a, DynArray::from([1, 2]));
        assert_ne!(a, DynArray::from([1, 2, 4]));
        assert_eq!(DynArray::<i32>::new(), DynArray::with_capacity(5));
        assert_eq!(*a, [1, 2, 3][..]);
    }

    #[test]
    fn test_display() {
        assert_eq!("{}", DynArray::<i32>::new().to_string());
        assert_eq!("{7}", DynArray::from([7]).to_string());
        assert_eq!("{1,2,3}", DynArray::from([1, 2, 3]).to_string());
        assert_eq!("{a,bc}", DynArray::from(["a", "bc"]).to_string());
        assert_eq!("[1, 2]", format!("{:?}", DynArray::from([1, 2])));
    }

    #[test]
    fn test_pos_index() {
        let mut arr = DynArray::from([1, 2, 3]);
        let p = arr.begin().next();
        assert_eq!(2, arr[p]);
        arr[p] = 20;
        assert_eq!(arr, [1, 20, 3]);
        let mut p = arr.begin();
        let mut seen = vec![];
        while p < arr.end() {
            seen.push(arr[p]);
            p = p.next();
        }
        assert_eq!(vec![1, 20, 3], seen);
        let mut p = arr.end();
        let mut rev = vec![];
        while p > arr.begin() {
            p = p.prev();
            rev.push(arr[p]);
        }
        assert_eq!(vec![3, 20, 1], rev);
    }

    #[test]
    #[should_panic]
    fn test_pos_index_stale() {
        let mut arr = DynArray::from([1, 2, 3]);
        let p = arr.begin();
        arr.clear();
        arr.push(1);
        let _ = arr[p];
    }

    #[test]
    fn test_conversions() {
        let v = vec![1, 2, 3];
        let arr = DynArray::from(v.clone());
        assert_eq!(3, arr.capacity());
        assert_eq!(arr, v);
        let arr = DynArray::from(&v[1..]);
        assert_eq!(arr, [2, 3]);
        let back: Vec<i32> = arr.into();
        assert_eq!(vec![2, 3], back);
        let arr = DynArray::from([4, 5]);
        assert_eq!(&[4, 5], arr.as_ref());
    }
}
