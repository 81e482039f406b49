// Copyright (c) 2026, The nlmeans contributors. All rights reserved
//
// This source code is subject to the terms of the BSD 2 Clause License and
// the Alliance for Open Media Patent License 1.0. If the BSD 2 Clause License
// was not distributed with this source code in the LICENSE file, you can
// obtain it at www.aomedia.org/license/software. If the Alliance for Open
// Media Patent License 1.0 was not distributed with this source code in the
// PATENTS file, you can obtain it at www.aomedia.org/license/patent.

use std::alloc::{alloc, dealloc, handle_alloc_error, Layout};
use std::ptr::{self, NonNull};
use std::{fmt, mem};

/// An analog to a `Box<[T]>` where the underlying slice is aligned.
/// Alignment is according to the architecture-specific SIMD constraints.
///
/// Only used for plain-old-data element types (samples, accumulators and
/// integral image cells), so no destructors are ever run on the elements.
pub struct AlignedBoxedSlice<T: Copy> {
  ptr: NonNull<T>,
  len: usize,
}

impl<T: Copy> AlignedBoxedSlice<T> {
  // Data alignment in bytes.
  cfg_if::cfg_if! {
    if #[cfg(target_arch = "wasm32")] {
      // FIXME: wasm32 allocator fails for alignment larger than 3
      const DATA_ALIGNMENT_LOG2: usize = 3;
    } else {
      const DATA_ALIGNMENT_LOG2: usize = 6;
    }
  }

  fn layout(len: usize) -> Option<Layout> {
    let size = len.checked_mul(mem::size_of::<T>())?;
    Layout::from_size_align(size, 1 << Self::DATA_ALIGNMENT_LOG2).ok()
  }

  /// Returns the number of bytes an allocation of `len` elements takes,
  /// saturating on overflow. Used for error reporting.
  pub fn byte_size(len: usize) -> usize {
    len.saturating_mul(mem::size_of::<T>())
  }

  fn alloc_uninit(len: usize) -> Option<NonNull<T>> {
    let layout = Self::layout(len)?;
    if layout.size() == 0 {
      Some(NonNull::dangling())
    } else {
      // SAFETY: The layout has a non-zero size.
      NonNull::new(unsafe { alloc(layout) } as *mut T)
    }
  }

  /// Creates a slice of length `len` filled with `val`, or `None` if the
  /// allocation could not be satisfied.
  pub fn try_new(len: usize, val: T) -> Option<Self> {
    let ptr = Self::alloc_uninit(len)?;
    for i in 0..len {
      // SAFETY: `i` is within the allocation we just made.
      unsafe { ptr.as_ptr().add(i).write(val) };
    }

    Some(Self { ptr, len })
  }

  /// Creates a slice of length `len` filled with `val`.
  ///
  /// Aborts through [`handle_alloc_error`] if memory is exhausted.
  ///
  /// # Panics
  ///
  /// - If the requested size overflows `isize`.
  pub fn new(len: usize, val: T) -> Self {
    let Some(layout) = Self::layout(len) else {
      panic!("allocation of {len} elements overflows");
    };
    Self::try_new(len, val).unwrap_or_else(|| handle_alloc_error(layout))
  }
}

impl<T: Copy + fmt::Debug> fmt::Debug for AlignedBoxedSlice<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    fmt::Debug::fmt(&**self, f)
  }
}

impl<T: Copy> Clone for AlignedBoxedSlice<T> {
  fn clone(&self) -> Self {
    let Some(ptr) = Self::alloc_uninit(self.len) else {
      match Self::layout(self.len) {
        Some(layout) => handle_alloc_error(layout),
        None => unreachable!("an existing allocation has a valid layout"),
      }
    };
    // SAFETY: Both allocations hold `self.len` elements and are distinct.
    unsafe {
      ptr::copy_nonoverlapping(self.ptr.as_ptr(), ptr.as_ptr(), self.len)
    };
    Self { ptr, len: self.len }
  }
}

impl<T: Copy> std::ops::Deref for AlignedBoxedSlice<T> {
  type Target = [T];

  fn deref(&self) -> &[T] {
    // SAFETY: We know that `self.ptr` is not null, and we know its length.
    unsafe { std::slice::from_raw_parts(self.ptr.as_ptr(), self.len) }
  }
}

impl<T: Copy> std::ops::DerefMut for AlignedBoxedSlice<T> {
  fn deref_mut(&mut self) -> &mut [T] {
    // SAFETY: We know that `self.ptr` is not null, and we know its length.
    unsafe { std::slice::from_raw_parts_mut(self.ptr.as_ptr(), self.len) }
  }
}

impl<T: Copy> std::ops::Drop for AlignedBoxedSlice<T> {
  fn drop(&mut self) {
    if let Some(layout) = Self::layout(self.len) {
      if layout.size() != 0 {
        // SAFETY: The pointer was returned by `alloc` with this layout.
        unsafe { dealloc(self.ptr.as_ptr() as *mut u8, layout) }
      }
    }
  }
}

impl<T: Copy + PartialEq> PartialEq for AlignedBoxedSlice<T> {
  fn eq(&self, other: &Self) -> bool {
    **self == **other
  }
}

// SAFETY: The slice uniquely owns its allocation.
unsafe impl<T: Copy + Send> Send for AlignedBoxedSlice<T> {}
// SAFETY: Shared access only hands out `&[T]`.
unsafe impl<T: Copy + Sync> Sync for AlignedBoxedSlice<T> {}

#[cfg(test)]
mod test {
  use super::*;

  fn is_aligned<T>(ptr: *const T, n: usize) -> bool {
    ((ptr as usize) & ((1 << n) - 1)) == 0
  }

  #[test]
  fn sanity_heap() {
    let a: AlignedBoxedSlice<_> = AlignedBoxedSlice::new(3, 0u8);
    assert!(is_aligned(a.as_ptr(), 6));
    assert_eq!(&a[..], &[0, 0, 0]);
  }

  #[test]
  fn empty_slice() {
    let a = AlignedBoxedSlice::new(0, 0f32);
    assert!(a.is_empty());
    let b = a.clone();
    assert!(b.is_empty());
  }

  #[test]
  fn clone_copies_contents() {
    let mut a = AlignedBoxedSlice::new(17, 0u32);
    a.iter_mut().enumerate().for_each(|(i, v)| *v = i as u32 * 3);
    let b = a.clone();
    assert!(a == b);
    assert!(is_aligned(b.as_ptr(), 6));
  }

  #[test]
  fn oversized_request_fails() {
    assert!(AlignedBoxedSlice::<u32>::try_new(usize::MAX / 2, 0).is_none());
  }
}
