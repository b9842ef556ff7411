//! Row-wise domain decomposition.
//!
//! The global `N x N` grid is split into contiguous bands of rows, one band
//! per rank. Ranks only talk to the ranks owning the bands directly above
//! and below them.
//!
//! Local row indices follow the subgrid layout: local row 0 is the halo
//! above, local rows `1..=count` are owned, local row `count + 1` is the
//! halo below.

/// Rank that assembles the gathered result.
pub const COORDINATOR: usize = 0;

/// A contiguous band of global rows `[start, start + count)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RowRange {
    pub start: usize,
    pub count: usize,
}

impl RowRange {
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn contains(&self, global_row: usize) -> bool {
        global_row >= self.start && global_row < self.end()
    }

    /// Owned local rows are `1..=count`.
    pub fn local_to_global(&self, local_row: usize) -> usize {
        debug_assert!(local_row >= 1 && local_row <= self.count);
        self.start + local_row - 1
    }

    pub fn global_to_local(&self, global_row: usize) -> Option<usize> {
        self.contains(global_row)
            .then(|| global_row - self.start + 1)
    }
}

/// Even split of `total_rows` rows over `ranks` ranks.
///
/// The first `total_rows % ranks` ranks get one extra row. Rank 0 therefore
/// always owns global row 0, and `last_owner()` always owns global row
/// `total_rows - 1`; the interior compute ranges rely on exactly that.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPartition {
    total_rows: usize,
    ranks: usize,
}

impl RowPartition {
    pub fn new(total_rows: usize, ranks: usize) -> Self {
        assert!(ranks > 0, "a partition needs at least one rank");
        assert!(total_rows > 0, "a partition needs at least one row");
        RowPartition { total_rows, ranks }
    }

    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    pub fn ranks(&self) -> usize {
        self.ranks
    }

    pub fn count(&self, rank: usize) -> usize {
        debug_assert!(rank < self.ranks);
        let base = self.total_rows / self.ranks;
        let remainder = self.total_rows % self.ranks;
        base + usize::from(rank < remainder)
    }

    pub fn start(&self, rank: usize) -> usize {
        debug_assert!(rank < self.ranks);
        let base = self.total_rows / self.ranks;
        let remainder = self.total_rows % self.ranks;
        rank * base + rank.min(remainder)
    }

    pub fn range(&self, rank: usize) -> RowRange {
        RowRange {
            start: self.start(rank),
            count: self.count(rank),
        }
    }

    pub fn ranges(&self) -> impl Iterator<Item = RowRange> + '_ {
        (0..self.ranks).map(|rank| self.range(rank))
    }

    /// Rank owning the final global row.
    /// Equal to `ranks - 1` unless there are more ranks than rows,
    /// in which case the trailing ranks own nothing.
    pub fn last_owner(&self) -> usize {
        self.ranks.min(self.total_rows) - 1
    }

    /// Ranks that own at least one row.
    pub fn is_active(&self, rank: usize) -> bool {
        rank <= self.last_owner()
    }

    pub fn owner_of(&self, global_row: usize) -> usize {
        debug_assert!(global_row < self.total_rows);
        let base = self.total_rows / self.ranks;
        let remainder = self.total_rows % self.ranks;
        let split = remainder * (base + 1);
        if global_row < split {
            global_row / (base + 1)
        } else {
            remainder + (global_row - split) / base
        }
    }

    /// Element counts and displacements for gathering `cols` wide rows in
    /// rank order.
    pub fn gather_layout(&self, cols: usize) -> GatherLayout {
        let counts: Vec<usize> = self.ranges().map(|r| r.count * cols).collect();
        let displacements = counts
            .iter()
            .scan(0, |acc, &c| {
                let old = *acc;
                *acc += c;
                Some(old)
            })
            .collect();
        GatherLayout {
            counts,
            displacements,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatherLayout {
    pub counts: Vec<usize>,
    pub displacements: Vec<usize>,
}

impl GatherLayout {
    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Local rows a rank runs the stencil over, inclusive on both ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComputeRange {
    first: usize,
    last: usize,
}

impl ComputeRange {
    pub const EMPTY: ComputeRange = ComputeRange { first: 1, last: 0 };

    pub fn new(partition: &RowPartition, rank: usize) -> Self {
        if !partition.is_active(rank) {
            return ComputeRange::EMPTY;
        }
        let count = partition.count(rank);
        // Global row 0 sits in local row 1 of rank 0 and global row N - 1
        // in local row `count` of the last owner. Both are fixed boundaries.
        let first = if rank == 0 { 2 } else { 1 };
        let last = if rank == partition.last_owner() {
            count - 1
        } else {
            count
        };
        if first > last {
            ComputeRange::EMPTY
        } else {
            ComputeRange { first, last }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.first > self.last
    }

    pub fn bounds(&self) -> Option<(usize, usize)> {
        (!self.is_empty()).then_some((self.first, self.last))
    }

    pub fn len(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            self.last - self.first + 1
        }
    }

    pub fn iter(&self) -> std::ops::RangeInclusive<usize> {
        self.first..=self.last
    }
}

/// A rank's place in the 1-D chain of row owners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessTopology {
    rank: usize,
    size: usize,
    above: Option<usize>,
    below: Option<usize>,
}

impl ProcessTopology {
    pub fn new(partition: &RowPartition, rank: usize) -> Self {
        let size = partition.ranks();
        debug_assert!(rank < size);
        let (above, below) = if partition.is_active(rank) {
            let above = rank.checked_sub(1);
            let below = (rank < partition.last_owner()).then_some(rank + 1);
            (above, below)
        } else {
            (None, None)
        };
        ProcessTopology {
            rank,
            size,
            above,
            below,
        }
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn above(&self) -> Option<usize> {
        self.above
    }

    pub fn below(&self) -> Option<usize> {
        self.below
    }

    pub fn is_coordinator(&self) -> bool {
        self.rank == COORDINATOR
    }
}

/// Everything one rank derives from the partition at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalLayout {
    pub rows: RowRange,
    pub compute: ComputeRange,
    pub topology: ProcessTopology,
}

impl LocalLayout {
    pub fn new(partition: &RowPartition, rank: usize) -> Self {
        LocalLayout {
            rows: partition.range(rank),
            compute: ComputeRange::new(partition, rank),
            topology: ProcessTopology::new(partition, rank),
        }
    }

    /// Rows in the local subgrid, owned rows plus both halos.
    pub fn local_rows(&self) -> usize {
        self.rows.count + 2
    }
}
