use primitives::{Image, Sample};

use super::bitmap::BitmapIndex;

/// Owns one tile's geometry-independent state: the rank table (tile-local
/// pixel index -> sort position), the value table (sort position ->
/// original value) and the [`BitmapIndex`] tracking which ranks currently
/// lie inside the kernel window.
///
/// All coordinates passed to [`TileState::add`] / [`TileState::remove`] are
/// tile-local.
pub(crate) struct TileState<T: Sample> {
  bx: usize,
  by: usize,
  rank: Vec<usize>,
  value: Vec<T>,
  bitmap: BitmapIndex,
}

impl<T: Sample> TileState<T> {
  /// Build the tile state for the tile rectangle `(tile_x0, tile_y0)` of
  /// size `bx x by` within `image`.
  ///
  /// Enumerates tile pixels in row-major local order, then produces a
  /// stable ascending sort by value: `Vec::sort_by` is stable, and the
  /// input is already in increasing tile-local-index order, so equal
  /// values keep that order, giving a deterministic tie-break between
  /// equal-valued pixels without an explicit secondary key.
  pub(crate) fn new(image: &Image<T>, tile_x0: usize, tile_y0: usize, bx: usize, by: usize) -> Self {
    let n = bx * by;
    let mut entries: Vec<(T, usize)> = Vec::with_capacity(n);
    for jy in 0..by {
      for ix in 0..bx {
        let local = jy * bx + ix;
        let value = image.get(tile_x0 + ix, tile_y0 + jy);
        entries.push((value, local));
      }
    }
    entries.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("pixel values must be totally ordered (no NaN)"));

    let mut rank = vec![0usize; n];
    let mut value = Vec::with_capacity(n);
    for (r, (v, local)) in entries.into_iter().enumerate() {
      rank[local] = r;
      value.push(v);
    }

    TileState {
      bx,
      by,
      rank,
      value,
      bitmap: BitmapIndex::new(n),
    }
  }

  /// Insert tile-local cell `(ix, jy)` into the window. No-op if the cell
  /// falls outside the tile (the kernel extends past the tile/image edge).
  pub(crate) fn add(&mut self, ix: isize, jy: isize) {
    if let Some(local) = self.local_index(ix, jy) {
      self.bitmap.toggle_add(self.rank[local]);
    }
  }

  /// Remove tile-local cell `(ix, jy)` from the window. Symmetric to
  /// [`TileState::add`].
  pub(crate) fn remove(&mut self, ix: isize, jy: isize) {
    if let Some(local) = self.local_index(ix, jy) {
      self.bitmap.toggle_remove(self.rank[local]);
    }
  }

  fn local_index(&self, ix: isize, jy: isize) -> Option<usize> {
    if ix < 0 || jy < 0 || ix as usize >= self.bx || jy as usize >= self.by {
      return None;
    }
    Some(jy as usize * self.bx + ix as usize)
  }

  /// Median of the cells currently inside the window.
  ///
  /// `s == 0` must not arise under a correct traversal of the tile's
  /// interior; it indicates a programming error upstream.
  pub(crate) fn median(&mut self) -> T {
    let s = self.bitmap.cardinality();
    debug_assert!(s > 0, "median() called with an empty window");
    let r1 = self.bitmap.select((s - 1) / 2);
    if s % 2 == 1 {
      self.value[r1]
    } else {
      let r2 = self.bitmap.select(s / 2);
      T::average_pair(self.value[r1], self.value[r2])
    }
  }

  #[cfg(test)]
  pub(crate) fn cardinality(&self) -> u64 {
    self.bitmap.cardinality()
  }
}
