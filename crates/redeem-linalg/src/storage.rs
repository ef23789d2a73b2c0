//! Shared `f64` buffers with tracked zero-copy views.
//!
//! A [`Storage`] is either the owner of a block of memory or a view into a
//! window of a block owned by someone else. Every view registers itself on
//! the block it aliases, and an owner refuses to be released while any such
//! view is still alive.
//!
//! The block is a slice of `Cell<f64>`, so the owner and all of its views can
//! read and write the same memory through shared references. A write through
//! any alias is visible through every other alias immediately. `Rc` and
//! `Cell` make the type `!Send` and `!Sync`: buffers never cross threads.
use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

use crate::error::{LinalgError, ReleaseError, Result};

struct Block {
    cells: Box<[Cell<f64>]>,
    live_views: Cell<usize>,
}

/// An owning buffer or a view into one.
pub struct Storage {
    block: Rc<Block>,
    offset: usize,
    len: usize,
    is_owner: bool,
}

impl Storage {
    /// Allocate an owning buffer of `len` zero-filled values.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::Allocation`] if the memory cannot be reserved.
    pub fn allocate(len: usize) -> Result<Self> {
        let mut cells: Vec<Cell<f64>> = Vec::new();
        cells
            .try_reserve_exact(len)
            .map_err(|_| LinalgError::Allocation { len })?;
        cells.resize_with(len, || Cell::new(0.0));

        log::trace!("allocated buffer of {} values", len);
        Ok(Self {
            block: Rc::new(Block {
                cells: cells.into_boxed_slice(),
                live_views: Cell::new(0),
            }),
            offset: 0,
            len,
            is_owner: true,
        })
    }

    /// Allocate an owning buffer holding a copy of `data`.
    pub fn from_slice(data: &[f64]) -> Result<Self> {
        let storage = Self::allocate(data.len())?;
        for (cell, &value) in storage.cells().iter().zip(data) {
            cell.set(value);
        }
        Ok(storage)
    }

    /// Create a view of `len` values starting `offset` values into `self`.
    ///
    /// The view aliases the same memory as `self`. Views of views resolve to
    /// the block's owner: whatever the depth of the chain, each view counts
    /// once against the root owner.
    ///
    /// # Errors
    ///
    /// Returns [`LinalgError::Index`] if `offset + len` exceeds `self.len()`.
    pub fn view(&self, offset: usize, len: usize) -> Result<Self> {
        let end = offset.checked_add(len).ok_or(LinalgError::Index {
            index: usize::MAX,
            bound: self.len,
        })?;
        if end > self.len {
            return Err(LinalgError::Index {
                index: end,
                bound: self.len,
            });
        }

        let live = self.block.live_views.get() + 1;
        self.block.live_views.set(live);
        log::debug!(
            "created view [{}, {}) over buffer of {} values ({} live views)",
            self.offset + offset,
            self.offset + end,
            self.block.cells.len(),
            live
        );

        Ok(Self {
            block: Rc::clone(&self.block),
            offset: self.offset + offset,
            len,
            is_owner: false,
        })
    }

    /// Release this storage.
    ///
    /// Releasing a view never frees memory; it only unregisters the view from
    /// its owner. Releasing an owner frees the buffer, but only once all of
    /// its views have been released.
    ///
    /// # Errors
    ///
    /// Fails with [`LinalgError::NonZeroReference`] when an owner still has
    /// live views. The storage is handed back inside the error.
    pub fn release(self) -> std::result::Result<(), ReleaseError<Self>> {
        if self.is_owner {
            let live_views = self.block.live_views.get();
            if live_views != 0 {
                return Err(ReleaseError::new(
                    self,
                    LinalgError::NonZeroReference { live_views },
                ));
            }
        }
        drop(self);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_owner(&self) -> bool {
        self.is_owner
    }

    pub fn is_view(&self) -> bool {
        !self.is_owner
    }

    /// Number of live views registered on this owner, `None` for a view.
    pub fn live_view_count(&self) -> Option<usize> {
        self.is_owner.then(|| self.block.live_views.get())
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.cells().get(index).map(Cell::get)
    }

    pub fn set(&self, index: usize, value: f64) -> Result<()> {
        let cell = self.cells().get(index).ok_or(LinalgError::Index {
            index,
            bound: self.len,
        })?;
        cell.set(value);
        Ok(())
    }

    pub fn fill(&self, value: f64) {
        self.cells().iter().for_each(|cell| cell.set(value));
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells().iter().map(Cell::get)
    }

    pub fn to_vec(&self) -> Vec<f64> {
        self.iter().collect()
    }

    /// True if both storages alias the same underlying block.
    pub fn shares_block_with(&self, other: &Storage) -> bool {
        Rc::ptr_eq(&self.block, &other.block)
    }

    /// True if both storages alias at least one common value.
    pub fn overlaps(&self, other: &Storage) -> bool {
        self.shares_block_with(other)
            && self.offset < other.offset + other.len
            && other.offset < self.offset + self.len
    }

    /// Allocate an owning copy of this storage's values.
    pub fn snapshot(&self) -> Result<Storage> {
        let copy = Self::allocate(self.len)?;
        for (d, s) in copy.cells().iter().zip(self.cells()) {
            d.set(s.get());
        }
        Ok(copy)
    }

    /// Snapshot of `self` if writing `dst` front to back would overwrite
    /// values of `self` before they are read. Identical windows and disjoint
    /// storages need no copy.
    pub(crate) fn snapshot_if_shifted(&self, dst: &Storage) -> Result<Option<Storage>> {
        if dst.overlaps(self) && dst.offset != self.offset {
            return self.snapshot().map(Some);
        }
        Ok(None)
    }

    #[inline]
    pub(crate) fn cells(&self) -> &[Cell<f64>] {
        &self.block.cells[self.offset..self.offset + self.len]
    }
}

impl Drop for Storage {
    fn drop(&mut self) {
        let live = self.block.live_views.get();
        if self.is_owner {
            if live != 0 {
                log::warn!(
                    "buffer owner dropped with {} live views; memory is kept until they are released",
                    live
                );
            } else {
                log::trace!("released buffer of {} values", self.len);
            }
        } else {
            self.block.live_views.set(live.saturating_sub(1));
            log::trace!("released view of {} values", self.len);
        }
    }
}

impl fmt::Debug for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Storage")
            .field("is_owner", &self.is_owner)
            .field("offset", &self.offset)
            .field("len", &self.len)
            .field("live_views", &self.block.live_views.get())
            .finish()
    }
}
