use primitives::{Image, Sample};

use super::tile::TileState;

/// Drive a kernel-shaped window across one tile's interior, emitting a
/// median per interior pixel while touching the [`TileState`] by the
/// minimum delta between consecutive pixels.
///
/// Walks columns left to right; within a column, sweeps rows downward on
/// even columns and upward on odd columns (a "serpentine" / boustrophedon
/// path), so consecutive pixels always differ by exactly one row or one
/// column of the window.
///
/// All coordinates here are tile-local. `hx`/`hy` are the kernel
/// half-extents. `(loc_x0, loc_y0)`..`(loc_x1, loc_y1)` is the interior
/// rectangle in tile-local coordinates (inclusive). Returns a row-major
/// buffer of `(loc_x1 - loc_x0 + 1) * (loc_y1 - loc_y0 + 1)` medians, one
/// per interior pixel, in interior-local row-major order (not traversal
/// order) so the caller can merge it into the output image with a plain
/// index computation.
pub(crate) fn traverse_tile<T: Sample>(
  image: &Image<T>, hy: usize, hx: usize, tile_x0: usize, tile_y0: usize, bx: usize, by: usize, loc_x0: usize,
  loc_y0: usize, loc_x1: usize, loc_y1: usize,
) -> Vec<T> {
  let mut tile = TileState::new(image, tile_x0, tile_y0, bx, by);

  let hx = hx as isize;
  let hy = hy as isize;
  let x0 = loc_x0 as isize;
  let y0 = loc_y0 as isize;
  let x1 = loc_x1 as isize;
  let y1 = loc_y1 as isize;

  let interior_w = (loc_x1 - loc_x0 + 1) as usize;
  let interior_h = (loc_y1 - loc_y0 + 1) as usize;
  let mut out = vec![T::default(); interior_w * interior_h];

  // Prime step: insert the first column's kernel region except its
  // rightmost column; the column loop's first iteration adds that column.
  for ix in (x0 - hx)..(x0 + hx) {
    for jy in (y0 - hy)..=(y0 + hy) {
      tile.add(ix, jy);
    }
  }

  let mut col_offset = 0isize;
  let mut x = x0;
  while x <= x1 {
    // Column advance: remove the column sliding out, add the one sliding in.
    let remove_col = x - hx - 1;
    let add_col = x + hx;
    for jy in (y0 - hy)..=(y0 + hy) {
      tile.remove(remove_col, jy);
      tile.add(add_col, jy);
    }

    let downward = col_offset % 2 == 0;
    if downward {
      let mut row_offset = 0isize;
      let mut y = y0;
      while y <= y1 {
        out[row_offset as usize * interior_w + col_offset as usize] = tile.median();
        if y != y1 {
          for ix in (x - hx)..=(x + hx) {
            tile.remove(ix, y - hy);
            tile.add(ix, y + hy + 1);
          }
        }
        row_offset += 1;
        y += 1;
      }
    } else {
      let mut row_offset = y1 - y0;
      let mut y = y1;
      while y >= y0 {
        out[row_offset as usize * interior_w + col_offset as usize] = tile.median();
        if y != y0 {
          for ix in (x - hx)..=(x + hx) {
            tile.remove(ix, y + hy);
            tile.add(ix, y - hy - 1);
          }
        }
        row_offset -= 1;
        y -= 1;
      }
    }

    col_offset += 1;
    x += 1;
  }

  out
}
