//! A bump allocator for decoded font data.
//!
//! All tables decoded by this crate store their arrays in an [`Arena`]: a
//! single caller provided byte region with a used-byte counter. Allocation
//! bumps the counter and the only way to free memory is to pop it back off
//! the top, so lifetimes of allocations must be strictly nested.
//!
//! Allocations are referred to by offset-based handles ([`Span`] and the
//! typed [`ArenaSlice`]) rather than references. Handles are resolved
//! against an arena (or an [`ArenaView`] of one) at access time, and a handle
//! that no longer points at live memory resolves to an empty slice.

use core::{
    marker::PhantomData,
    mem::{align_of, size_of},
    ops::Range,
};

use bytemuck::Pod;

/// An error produced by arena operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ArenaError {
    /// An allocation was larger than the space left in the arena.
    Exhausted { requested: usize, remaining: usize },
    /// A pop was larger than the number of bytes currently in use.
    Underflow { requested: usize, used: usize },
}

impl std::fmt::Display for ArenaError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Exhausted {
                requested,
                remaining,
            } => write!(
                f,
                "arena exhausted: requested {requested} bytes with {remaining} remaining"
            ),
            Self::Underflow { requested, used } => write!(
                f,
                "arena underflow: popped {requested} bytes with only {used} in use"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ArenaError {}

/// A range of bytes allocated from an [`Arena`].
///
/// The start is relative to the root region, so spans allocated from a
/// [subarena](Arena::subarena) remain valid in the parent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Span {
    start: usize,
    len: usize,
}

impl Span {
    /// The offset of the first byte, relative to the root region.
    pub const fn start(&self) -> usize {
        self.start
    }

    /// The number of bytes in the span.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The span as a range of offsets into the root region.
    pub const fn range(&self) -> Range<usize> {
        self.start..self.start + self.len
    }
}

/// A typed handle to an array of `T` allocated with [`Arena::push_slice`].
pub struct ArenaSlice<T> {
    span: Span,
    len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ArenaSlice<T> {
    /// The number of elements in the array.
    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The bytes backing the array.
    pub const fn span(&self) -> Span {
        self.span
    }

    /// Returns a handle to the first `len` elements.
    pub fn truncate(self, len: usize) -> Self {
        let len = len.min(self.len);
        Self {
            span: Span {
                start: self.span.start,
                len: len * size_of::<T>(),
            },
            len,
            _marker: PhantomData,
        }
    }
}

// manual impls so that we don't require these bounds on T
impl<T> Clone for ArenaSlice<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ArenaSlice<T> {}

impl<T> Default for ArenaSlice<T> {
    fn default() -> Self {
        Self {
            span: Span::default(),
            len: 0,
            _marker: PhantomData,
        }
    }
}

impl<T> PartialEq for ArenaSlice<T> {
    fn eq(&self, other: &Self) -> bool {
        self.span == other.span && self.len == other.len
    }
}

impl<T> Eq for ArenaSlice<T> {}

impl<T> std::fmt::Debug for ArenaSlice<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArenaSlice")
            .field("span", &self.span)
            .field("len", &self.len)
            .finish()
    }
}

/// A stack allocator over a borrowed byte region.
pub struct Arena<'a> {
    data: &'a mut [u8],
    // offset of `data` in the root region
    base: usize,
    used: usize,
}

impl<'a> Arena<'a> {
    /// Creates an empty arena backed by the given region.
    pub fn new(region: &'a mut [u8]) -> Self {
        Self {
            data: region,
            base: 0,
            used: 0,
        }
    }

    /// Total size of the backing region in bytes.
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Number of bytes currently allocated.
    pub fn used(&self) -> usize {
        self.used
    }

    /// Number of bytes still available.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.used
    }

    /// Allocates `size` bytes.
    ///
    /// The contents of the new allocation are unspecified; use
    /// [`push_zero`](Self::push_zero) if they need to be cleared.
    pub fn push(&mut self, size: usize) -> Result<Span, ArenaError> {
        let remaining = self.remaining();
        if size > remaining {
            return Err(ArenaError::Exhausted {
                requested: size,
                remaining,
            });
        }
        let span = Span {
            start: self.base + self.used,
            len: size,
        };
        self.used += size;
        Ok(span)
    }

    /// Allocates `size` zero filled bytes.
    pub fn push_zero(&mut self, size: usize) -> Result<Span, ArenaError> {
        let span = self.push(size)?;
        self.bytes_mut(span).fill(0);
        Ok(span)
    }

    /// Allocates a copy of `bytes`.
    pub fn push_bytes(&mut self, bytes: &[u8]) -> Result<Span, ArenaError> {
        let span = self.push(bytes.len())?;
        self.bytes_mut(span).copy_from_slice(bytes);
        Ok(span)
    }

    /// Allocates a zeroed array of `len` elements, aligned for `T`.
    ///
    /// Any padding required for alignment is allocated in front of the array
    /// and is included in the number of bytes that must later be popped.
    pub fn push_slice<T: Pod>(&mut self, len: usize) -> Result<ArenaSlice<T>, ArenaError> {
        let addr = self.data.as_ptr() as usize + self.used;
        let padding = align_up(addr, align_of::<T>()) - addr;
        let size = len
            .checked_mul(size_of::<T>())
            .and_then(|size| size.checked_add(padding))
            .ok_or(ArenaError::Exhausted {
                requested: usize::MAX,
                remaining: self.remaining(),
            })?;
        let span = self.push_zero(size)?;
        Ok(ArenaSlice {
            span: Span {
                start: span.start + padding,
                len: size - padding,
            },
            len,
            _marker: PhantomData,
        })
    }

    /// Frees the top `size` bytes.
    pub fn pop(&mut self, size: usize) -> Result<(), ArenaError> {
        if size > self.used {
            return Err(ArenaError::Underflow {
                requested: size,
                used: self.used,
            });
        }
        self.used -= size;
        Ok(())
    }

    /// Frees everything.
    pub fn reset(&mut self) {
        self.used = 0;
    }

    /// Returns the current top of the arena, for a later [`release`](Self::release).
    pub fn mark(&self) -> usize {
        self.used
    }

    /// Frees everything allocated since `mark` was taken.
    pub fn release(&mut self, mark: usize) -> Result<(), ArenaError> {
        self.pop(self.used.saturating_sub(mark))?;
        if self.used != mark {
            return Err(ArenaError::Underflow {
                requested: mark,
                used: self.used,
            });
        }
        Ok(())
    }

    /// Returns a read-only view of all allocated memory.
    pub fn view(&self) -> ArenaView<'_> {
        ArenaView {
            data: &self.data[..self.used],
            base: self.base,
        }
    }

    /// Returns the bytes of a previous allocation.
    pub fn bytes(&self, span: Span) -> &[u8] {
        self.view().bytes(span)
    }

    /// Returns the bytes of a previous allocation for writing.
    pub fn bytes_mut(&mut self, span: Span) -> &mut [u8] {
        let Some(start) = span.start.checked_sub(self.base) else {
            return &mut [];
        };
        match start.checked_add(span.len) {
            Some(end) if end <= self.used => &mut self.data[start..end],
            _ => &mut [],
        }
    }

    /// Resolves a typed handle.
    pub fn slice<T: Pod>(&self, handle: ArenaSlice<T>) -> &[T] {
        self.view().slice(handle)
    }

    /// Resolves a typed handle for writing.
    pub fn slice_mut<T: Pod>(&mut self, handle: ArenaSlice<T>) -> &mut [T] {
        if handle.len == 0 {
            return &mut [];
        }
        bytemuck::try_cast_slice_mut(self.bytes_mut(handle.span)).unwrap_or_default()
    }

    /// Carves a child arena of `size` bytes out of the free space.
    ///
    /// The full `size` is counted as used in this arena. While the child is
    /// alive, everything allocated before the split remains readable through
    /// the returned view. Once the child is dropped, the caller pops whatever
    /// portion of `size` the child did not end up keeping.
    pub fn subarena(&mut self, size: usize) -> Result<(ArenaView<'_>, Arena<'_>), ArenaError> {
        let start = self.used;
        self.push(size)?;
        let (head, tail) = self.data.split_at_mut(start);
        let child = Arena {
            data: &mut tail[..size],
            base: self.base + start,
            used: 0,
        };
        let view = ArenaView {
            data: head,
            base: self.base,
        };
        Ok((view, child))
    }

    /// Runs `f` with a temporary child arena of `size` bytes.
    ///
    /// Everything allocated by `f` is freed when it returns.
    pub fn scoped<R>(
        &mut self,
        size: usize,
        f: impl FnOnce(ArenaView<'_>, &mut Arena<'_>) -> R,
    ) -> Result<R, ArenaError> {
        let (view, mut child) = self.subarena(size)?;
        let result = f(view, &mut child);
        self.pop(size)?;
        Ok(result)
    }
}

/// Read-only access to the allocated portion of an [`Arena`].
#[derive(Clone, Copy)]
pub struct ArenaView<'a> {
    data: &'a [u8],
    base: usize,
}

impl<'a> ArenaView<'a> {
    /// Creates a view over bytes that did not come from an arena.
    ///
    /// Spans are resolved relative to the start of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, base: 0 }
    }

    /// Number of readable bytes.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the bytes of an allocation, or an empty slice if the span is
    /// not covered by this view.
    pub fn bytes(&self, span: Span) -> &'a [u8] {
        span.start
            .checked_sub(self.base)
            .and_then(|start| self.data.get(start..start.checked_add(span.len)?))
            .unwrap_or_default()
    }

    /// Resolves a typed handle.
    pub fn slice<T: Pod>(&self, handle: ArenaSlice<T>) -> &'a [T] {
        if handle.len == 0 {
            return &[];
        }
        bytemuck::try_cast_slice(self.bytes(handle.span)).unwrap_or_default()
    }

    /// Returns a single element of a typed allocation.
    pub fn get<T: Pod>(&self, handle: ArenaSlice<T>, index: usize) -> Option<T> {
        self.slice(handle).get(index).copied()
    }
}

fn align_up(len: usize, alignment: usize) -> usize {
    len + (len.wrapping_neg() & (alignment - 1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_and_pop() {
        let mut buf = [0u8; 64];
        let mut arena = Arena::new(&mut buf);
        assert_eq!(arena.capacity(), 64);
        let a = arena.push(10).unwrap();
        let b = arena.push(20).unwrap();
        assert_eq!(a.range(), 0..10);
        assert_eq!(b.range(), 10..30);
        assert_eq!(arena.used(), 30);
        arena.pop(20).unwrap();
        assert_eq!(arena.used(), 10);
        // the next push reuses the popped space
        assert_eq!(arena.push(4).unwrap().start(), 10);
    }

    #[test]
    fn mark_and_release() {
        let mut buf = [0u8; 32];
        let mut arena = Arena::new(&mut buf);
        arena.push(5).unwrap();
        let mark = arena.mark();
        arena.push(7).unwrap();
        arena.push_slice::<u32>(2).unwrap();
        arena.release(mark).unwrap();
        assert_eq!(arena.used(), 5);
        // a mark above the current top cannot be released to
        assert!(arena.release(9).is_err());
        assert_eq!(arena.used(), 5);
    }

    #[test]
    fn exhaustion_is_an_error() {
        let mut buf = [0u8; 16];
        let mut arena = Arena::new(&mut buf);
        arena.push(12).unwrap();
        assert_eq!(
            arena.push(5),
            Err(ArenaError::Exhausted {
                requested: 5,
                remaining: 4
            })
        );
        // a failed push leaves the arena unchanged
        assert_eq!(arena.used(), 12);
        assert!(arena.push(4).is_ok());
        assert_eq!(arena.remaining(), 0);
    }

    #[test]
    fn pop_underflow_is_an_error() {
        let mut buf = [0u8; 16];
        let mut arena = Arena::new(&mut buf);
        arena.push(3).unwrap();
        assert_eq!(
            arena.pop(4),
            Err(ArenaError::Underflow {
                requested: 4,
                used: 3
            })
        );
        assert_eq!(arena.used(), 3);
    }

    #[test]
    fn push_zero_clears_reused_memory() {
        let mut buf = [0u8; 16];
        let mut arena = Arena::new(&mut buf);
        let span = arena.push_bytes(&[0xAA; 8]).unwrap();
        assert_eq!(arena.bytes(span), &[0xAA; 8]);
        arena.pop(8).unwrap();
        let span = arena.push_zero(8).unwrap();
        assert_eq!(arena.bytes(span), &[0; 8]);
    }

    #[test]
    fn typed_slices_are_aligned() {
        let mut buf = [0u8; 64];
        let mut arena = Arena::new(&mut buf);
        arena.push(1).unwrap();
        let handle = arena.push_slice::<u32>(4).unwrap();
        assert_eq!(handle.len(), 4);
        arena.slice_mut(handle).copy_from_slice(&[1, 2, 3, 4]);
        let values = arena.slice(handle);
        assert_eq!(values, &[1, 2, 3, 4]);
        assert_eq!(values.as_ptr() as usize % align_of::<u32>(), 0);
        assert_eq!(arena.view().get(handle, 2), Some(3));
        assert_eq!(arena.view().get(handle, 4), None);
    }

    #[test]
    fn stale_handles_resolve_to_empty() {
        let mut buf = [0u8; 32];
        let mut arena = Arena::new(&mut buf);
        let handle = arena.push_slice::<u16>(3).unwrap();
        assert_eq!(arena.slice(handle).len(), 3);
        arena.reset();
        assert!(arena.slice(handle).is_empty());
    }

    #[test]
    fn subarena_nesting() {
        let mut buf = [0u8; 64];
        let mut arena = Arena::new(&mut buf);
        let header = arena.push_bytes(b"head").unwrap();
        let (kept, child_used) = {
            let (view, mut child) = arena.subarena(32).unwrap();
            // data allocated before the split is visible while the child is alive
            assert_eq!(view.bytes(header), b"head");
            let kept = child.push_bytes(b"child").unwrap();
            let scratch = child.push(10).unwrap();
            assert_eq!(kept.start(), 4);
            assert_eq!(scratch.start(), 9);
            child.pop(10).unwrap();
            // the child cannot grow past its own region
            assert!(child.push(28).is_err());
            (kept, child.used())
        };
        assert_eq!(arena.used(), 36);
        // shrink to what the child kept
        arena.pop(32 - child_used).unwrap();
        assert_eq!(arena.used(), 9);
        assert_eq!(arena.bytes(kept), b"child");
    }

    #[test]
    fn scoped_frees_everything() {
        let mut buf = [0u8; 64];
        let mut arena = Arena::new(&mut buf);
        arena.push(8).unwrap();
        let remaining = arena.remaining();
        let len = arena
            .scoped(remaining, |_, scratch| {
                let handle = scratch.push_slice::<i32>(6).unwrap();
                scratch.slice_mut(handle)[5] = -7;
                scratch.slice(handle).iter().sum::<i32>()
            })
            .unwrap();
        assert_eq!(len, -7);
        assert_eq!(arena.used(), 8);
        assert!(arena.scoped(remaining + 1, |_, _| ()).is_err());
    }
}
