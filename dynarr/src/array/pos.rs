/// Pos marks a slot of a [`DynArray`](crate::DynArray).
///
/// A position is a plain index stamped with the generation of the array
/// it was taken from. Any reallocation or element shift starts a new
/// generation, after which the position is stale and every
/// position-taking operation rejects it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    idx: usize,
    gen: u64,
}

impl Pos {
    #[inline]
    pub(crate) const fn new(idx: usize, gen: u64) -> Self {
        Pos { idx, gen }
    }

    /// Returns the slot index.
    #[inline]
    pub const fn index(self) -> usize {
        self.idx
    }

    #[inline]
    pub(crate) const fn gen(self) -> u64 {
        self.gen
    }

    /// Returns the position of the following slot.
    #[inline]
    pub const fn next(self) -> Self {
        Pos {
            idx: self.idx.wrapping_add(1),
            gen: self.gen,
        }
    }

    /// Returns the position of the preceding slot.
    /// Stepping back from the first slot yields a position that no
    /// operation accepts.
    #[inline]
    pub const fn prev(self) -> Self {
        Pos {
            idx: self.idx.wrapping_sub(1),
            gen: self.gen,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pos_step() {
        let p = Pos::new(3, 7);
        assert_eq!(4, p.next().index());
        assert_eq!(2, p.prev().index());
        assert_eq!(p, p.next().prev());
        assert_eq!(7, p.next().gen());
        assert_eq!(usize::MAX, Pos::new(0, 0).prev().index());
    }

    #[test]
    fn test_pos_order() {
        let begin = Pos::new(0, 1);
        let end = Pos::new(5, 1);
        assert!(begin < end);
        assert!(end > begin);
        assert!(begin != end);
        let mut p = begin;
        let mut steps = 0;
        while p != end {
            p = p.next();
            steps += 1;
        }
        assert_eq!(5, steps);
    }
}
