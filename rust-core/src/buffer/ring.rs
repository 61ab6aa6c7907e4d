//! Multi-cursor circular sample buffer
//!
//! Fixed-capacity ring holding the most recent samples. One writer advances the
//! head; any number of readers hold [`Cursor`] values and drain at their own pace.

/// Read position into a [`CircularSampleBuffer`]
///
/// Positions are absolute stream offsets, so a cursor stays meaningful after the
/// data it points at has been overwritten. Cursors own nothing; the buffer is the
/// sole owner of storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Cursor {
    position: i64,
}

impl Cursor {
    /// Absolute stream position (may be negative for cursors placed before the
    /// first sample ever written)
    pub fn position(&self) -> i64 {
        self.position
    }
}

/// Policy applied when `copy_range` cannot satisfy the requested length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyPolicy {
    /// Always return exactly `length` samples, zero-filling gaps
    ZeroPad,
    /// Return whatever is retained, possibly fewer than `length`
    AvailableOnly,
    /// Return nothing unless `length` retained samples are available
    EmptyIfInsufficient,
}

/// Fixed-capacity FIFO-overwrite ring buffer
pub struct CircularSampleBuffer<T> {
    /// Physical storage, indexed by `position % capacity`
    storage: Vec<T>,

    /// Absolute position of the next write
    head: i64,

    /// Absolute position of the oldest retained sample (the default tail)
    tail: i64,
}

impl<T: Copy + Default> CircularSampleBuffer<T> {
    /// Create new buffer retaining at most `capacity` samples
    ///
    /// A zero capacity yields a pass-through buffer: every insert hands its
    /// value straight back and nothing is retained.
    pub fn new(capacity: usize) -> Self {
        Self {
            storage: vec![T::default(); capacity],
            head: 0,
            tail: 0,
        }
    }

    /// Maximum number of retained samples
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Number of retained samples
    pub fn len(&self) -> usize {
        (self.head - self.tail) as usize
    }

    /// Check if buffer holds no samples
    pub fn is_empty(&self) -> bool {
        self.head == self.tail
    }

    /// Check if the next insert will evict
    pub fn is_full(&self) -> bool {
        self.len() == self.capacity()
    }

    #[inline]
    fn slot(&self, position: i64) -> usize {
        position.rem_euclid(self.storage.len() as i64) as usize
    }

    /// Insert one sample
    ///
    /// # Returns
    /// The evicted oldest sample when the buffer was already full
    pub fn insert(&mut self, value: T) -> Option<T> {
        if self.storage.is_empty() {
            return Some(value);
        }

        let evicted = if self.is_full() {
            let old = self.storage[self.slot(self.tail)];
            self.tail += 1;
            Some(old)
        } else {
            None
        };

        let idx = self.slot(self.head);
        self.storage[idx] = value;
        self.head += 1;

        evicted
    }

    /// Insert a block of samples
    ///
    /// Equivalent to repeated `insert`, but only the last `capacity` values are
    /// ever copied, so the cost is bounded by the retained length.
    pub fn insert_bulk(&mut self, values: &[T]) {
        let capacity = self.capacity();
        if values.is_empty() {
            return;
        }
        if capacity == 0 {
            self.head += values.len() as i64;
            self.tail = self.head;
            return;
        }

        let skipped = values.len().saturating_sub(capacity);
        let kept = &values[skipped..];
        let start = self.head + skipped as i64;

        // At most two contiguous runs: up to the physical end, then from slot 0
        let first_slot = self.slot(start);
        let first_len = kept.len().min(capacity - first_slot);
        self.storage[first_slot..first_slot + first_len].copy_from_slice(&kept[..first_len]);
        let rest = &kept[first_len..];
        self.storage[..rest.len()].copy_from_slice(rest);

        self.head += values.len() as i64;
        self.tail = self.tail.max(self.head - capacity as i64);
    }

    /// Drop all retained samples (existing cursors see zero available)
    pub fn clear(&mut self) {
        self.tail = self.head;
    }

    /// Fill the buffer to capacity with a constant
    pub fn fill(&mut self, value: T) {
        self.storage.fill(value);
        self.tail = self.head;
        self.head += self.storage.len() as i64;
    }

    /// Cursor at the oldest retained sample
    pub fn cursor(&self) -> Cursor {
        Cursor { position: self.tail }
    }

    /// Cursor at the write head (nothing available yet)
    pub fn head_cursor(&self) -> Cursor {
        Cursor { position: self.head }
    }

    /// Cursor `count` samples behind the write head
    ///
    /// The position may lie before the retained data; `copy_range` zero-pads
    /// that part on the left under [`CopyPolicy::ZeroPad`].
    pub fn cursor_back(&self, count: usize) -> Cursor {
        Cursor {
            position: self.head - count as i64,
        }
    }

    /// Check if part of the data ahead of `cursor` has already been evicted
    pub fn is_stale(&self, cursor: Cursor) -> bool {
        cursor.position < self.tail
    }

    /// Retained start position for a cursor, clamped into `[tail, head]`
    #[inline]
    fn effective_start(&self, cursor: Cursor) -> i64 {
        cursor.position.clamp(self.tail, self.head)
    }

    /// Number of retained samples ahead of `cursor`
    pub fn count_from(&self, cursor: Cursor) -> usize {
        (self.head - self.effective_start(cursor)) as usize
    }

    /// Move a cursor forward by `min(skip, count_from(cursor))`
    ///
    /// A stale cursor is first brought up to the oldest retained sample.
    pub fn advance_cursor(&self, cursor: Cursor, skip: usize) -> Cursor {
        let start = self.effective_start(cursor);
        let step = skip.min(self.count_from(cursor)) as i64;
        Cursor {
            position: start + step,
        }
    }

    /// Copy `length` samples starting at `cursor`
    ///
    /// Positions older than the retained data count as missing and are
    /// zero-filled on the left under [`CopyPolicy::ZeroPad`]; a short tail is
    /// zero-filled on the right.
    pub fn copy_range(&self, cursor: Cursor, length: usize, policy: CopyPolicy) -> Vec<T> {
        let start = self.effective_start(cursor);
        let available = self.count_from(cursor);

        match policy {
            CopyPolicy::ZeroPad => {
                let left = self.leading_gap(cursor).min(length);
                let take = available.min(length - left);

                let mut out = Vec::with_capacity(length);
                out.resize(left, T::default());
                self.extend_from(&mut out, start, take);
                out.resize(length, T::default());
                out
            }
            CopyPolicy::AvailableOnly => {
                let mut out = Vec::with_capacity(available.min(length));
                self.extend_from(&mut out, start, available.min(length));
                out
            }
            CopyPolicy::EmptyIfInsufficient => {
                if available < length {
                    return Vec::new();
                }
                let mut out = Vec::with_capacity(length);
                self.extend_from(&mut out, start, length);
                out
            }
        }
    }

    /// Copy up to `length` samples and return the advanced cursor
    pub fn read(&self, cursor: Cursor, length: usize, policy: CopyPolicy) -> (Vec<T>, Cursor) {
        let data = self.copy_range(cursor, length, policy);
        let consumed = match policy {
            CopyPolicy::ZeroPad => self
                .count_from(cursor)
                .min(length - self.leading_gap(cursor).min(length)),
            _ => data.len(),
        };
        (data, self.advance_cursor(cursor, consumed))
    }

    /// Number of positions ahead of `cursor` that are older than the retained data
    #[inline]
    fn leading_gap(&self, cursor: Cursor) -> usize {
        (self.tail - cursor.position).max(0) as usize
    }

    /// Retained sample by age (0 = oldest)
    pub fn get(&self, index: usize) -> Option<T> {
        if index >= self.len() {
            return None;
        }
        Some(self.storage[self.slot(self.tail + index as i64)])
    }

    /// Copy out all retained samples, oldest first
    pub fn to_vec(&self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.len());
        self.extend_from(&mut out, self.tail, self.len());
        out
    }

    /// Append `count` retained samples starting at absolute `start`
    fn extend_from(&self, out: &mut Vec<T>, start: i64, count: usize) {
        if count == 0 {
            return;
        }
        let capacity = self.capacity();
        let first_slot = self.slot(start);
        let first_len = count.min(capacity - first_slot);
        out.extend_from_slice(&self.storage[first_slot..first_slot + first_len]);
        out.extend_from_slice(&self.storage[..count - first_len]);
    }
}
