use alloc::vec::Vec;

use crate::fenwick::Fenwick;

/// Sparse per-index size cache with prefix-sum offset queries.
///
/// The logical collection may span billions of indices, so the store never
/// allocates per index. Only *measured* entries are kept (a sorted index
/// vector, the parallel raw sizes, and a Fenwick tree over those sizes);
/// every unmeasured index contributes the estimated size, which is the
/// integer running average of all measurements (or the configured default
/// before anything has been measured). Treating unmeasured runs as uniform
/// blocks is what keeps offset queries `O(log m)` in the measured count `m`,
/// independent of the collection size.
///
/// All arithmetic is integral (u128 intermediates where products can
/// overflow), so cumulative offsets are exactly monotone in the index.
#[derive(Clone, Debug)]
pub struct SizeStore {
    size: u64,
    default_size: u32,
    indices: Vec<u64>, // sorted measured indices
    sizes: Vec<u32>,   // parallel raw measured sizes
    sums: Fenwick,
}

impl SizeStore {
    pub fn new(size: u64, default_size: u32) -> Self {
        Self {
            size,
            default_size: default_size.max(1),
            indices: Vec::new(),
            sizes: Vec::new(),
            sums: Fenwick::default(),
        }
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    /// Updates the logical item count.
    ///
    /// Growing never fabricates measurements; shrinking discards every
    /// measured entry at or beyond the new size.
    pub fn set_size(&mut self, size: u64) {
        if size < self.size {
            let keep = self.indices.partition_point(|&i| i < size);
            if keep < self.indices.len() {
                vdebug!(
                    dropped = self.indices.len() - keep,
                    size,
                    "size store truncate"
                );
                self.indices.truncate(keep);
                self.sizes.truncate(keep);
                self.sums.truncate(keep);
            }
        }
        self.size = size;
    }

    pub fn measured_len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_measured(&self, index: u64) -> bool {
        self.rank_of(index.saturating_add(1)) > self.rank_of(index)
    }

    /// Records a measured size for `index`. Returns whether anything changed.
    ///
    /// Out-of-range indices are ignored. Inserting a measurement for a new
    /// index rebuilds the Fenwick tree; prefer [`SizeStore::record_many`]
    /// when a render pass measures a whole window.
    pub fn record(&mut self, index: u64, px: u32) -> bool {
        if index >= self.size {
            return false;
        }
        let pos = self.indices.partition_point(|&i| i < index);
        if self.indices.get(pos) == Some(&index) {
            let cur = self.sizes[pos];
            if cur == px {
                return false;
            }
            self.sizes[pos] = px;
            self.sums.add(pos, px as i64 - cur as i64);
            return true;
        }
        self.indices.insert(pos, index);
        self.sizes.insert(pos, px);
        self.sums = Fenwick::from_sizes(&self.sizes);
        true
    }

    /// Records a batch of measurements with a single Fenwick rebuild.
    pub fn record_many(&mut self, measurements: impl IntoIterator<Item = (u64, u32)>) -> bool {
        let mut inserted = false;
        let mut adjusted = false;
        for (index, px) in measurements {
            if index >= self.size {
                continue;
            }
            let pos = self.indices.partition_point(|&i| i < index);
            if self.indices.get(pos) == Some(&index) {
                let cur = self.sizes[pos];
                if cur != px {
                    self.sizes[pos] = px;
                    if !inserted {
                        self.sums.add(pos, px as i64 - cur as i64);
                    }
                    adjusted = true;
                }
                continue;
            }
            self.indices.insert(pos, index);
            self.sizes.insert(pos, px);
            inserted = true;
        }
        if inserted {
            self.sums = Fenwick::from_sizes(&self.sizes);
        }
        inserted || adjusted
    }

    /// The size assumed for unmeasured indices: the integer running average
    /// of all measurements, or the configured default before any exist.
    pub fn estimated_size(&self) -> u32 {
        let count = self.sizes.len() as u64;
        if count == 0 {
            return self.default_size;
        }
        let total = self.sums.total();
        let avg = (total.saturating_add(count / 2)) / count;
        avg.clamp(1, u32::MAX as u64) as u32
    }

    /// Measured size for `index`, or the estimate when unmeasured.
    pub fn size_of(&self, index: u64) -> u32 {
        let pos = self.indices.partition_point(|&i| i < index);
        if self.indices.get(pos) == Some(&index) {
            self.sizes[pos]
        } else {
            self.estimated_size()
        }
    }

    /// Virtual start offset of `index`: the sum of all sizes below it.
    ///
    /// `index` may equal `size`, in which case this is the total virtual
    /// size. Measured entries contribute their exact size; the unmeasured
    /// remainder contributes `unmeasured * measured_total / measured_count`
    /// (computed in u128 so the division only rounds once).
    pub fn cumulative_offset(&self, index: u64) -> u64 {
        let index = index.min(self.size);
        let rank = self.rank_of(index);
        let measured = self.sums.prefix_sum(rank);
        let unmeasured = index - rank as u64;
        measured.saturating_add(self.estimate_block(unmeasured))
    }

    pub fn total_virtual_size(&self) -> u64 {
        self.cumulative_offset(self.size)
    }

    /// Maps a virtual offset back to the index whose extent contains it.
    ///
    /// Returns the last index for offsets at or beyond the total size, and 0
    /// for an empty store. Binary search over the index space; each probe is
    /// a prefix query, so the whole lookup is `O(log size * log m)`.
    pub fn index_at_offset(&self, offset: u64) -> u64 {
        if self.size == 0 {
            return 0;
        }
        // Invariant: the answer is the number of indices i with
        // cumulative_offset(i + 1) <= offset.
        let mut lo = 0u64;
        let mut hi = self.size;
        while lo < hi {
            let mid = lo + (hi - lo) / 2;
            if self.cumulative_offset(mid + 1) <= offset {
                lo = mid + 1;
            } else {
                hi = mid;
            }
        }
        lo.min(self.size - 1)
    }

    fn rank_of(&self, index: u64) -> usize {
        self.indices.partition_point(|&i| i < index)
    }

    fn estimate_block(&self, run: u64) -> u64 {
        let count = self.sizes.len() as u64;
        if count == 0 {
            return (run as u128 * self.default_size as u128).min(u64::MAX as u128) as u64;
        }
        let total = self.sums.total() as u128;
        ((run as u128 * total) / count as u128).min(u64::MAX as u128) as u64
    }
}
