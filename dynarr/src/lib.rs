//! A growable, contiguous array with explicit length and capacity.
//!
//! [`DynArray`] owns a single heap buffer and exposes index, position
//! and bulk operations on it:
//!
//! ```
//! use dynarr::DynArray;
//!
//! let mut arr = DynArray::from([1, 2, 3]);
//! arr.erase(arr.begin()).unwrap();
//! assert_eq!("{2,3}", arr.to_string());
//! arr.insert(arr.begin(), 1).unwrap();
//! assert_eq!(arr, [1, 2, 3]);
//!
//! let sum = &DynArray::from([1, 2]) + &DynArray::from([3, 4]);
//! assert_eq!(sum, [1, 2, 3, 4]);
//! assert!(sum.at(4).is_err());
//! ```
//!
//! Appending to a full array doubles its capacity, while `resize`,
//! `append_range` and cloning allocate exactly what they need.
//! Positions ([`Pos`]) are invalidated by every reallocation or element
//! shift, and stale positions are rejected with an error.

pub mod alloc;
pub mod array;
pub mod error;

pub use array::{DynArray, IntoIter, Pos};
pub use error::{Error, Result};
