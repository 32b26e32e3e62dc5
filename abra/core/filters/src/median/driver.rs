use rayon::prelude::*;

use primitives::{Image, Sample};

use super::traversal::traverse_tile;

/// An axis-aligned, inclusive-bounds rectangle in image coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rect {
  pub(crate) x0: usize,
  pub(crate) y0: usize,
  pub(crate) x1: usize,
  pub(crate) y1: usize,
}

impl Rect {
  fn width(&self) -> usize {
    self.x1 - self.x0 + 1
  }

  fn height(&self) -> usize {
    self.y1 - self.y0 + 1
  }
}

/// Partition a `width x height` image into non-overlapping interior
/// rectangles sized for parallel dispatch.
///
/// `parallelism` is the desired worker count (`P`); it only shapes the
/// target tile size, it does not bound how many tiles are produced or how
/// many threads execute them.
pub(crate) fn partition_interiors(width: usize, height: usize, parallelism: usize) -> Vec<Rect> {
  if width <= 64 && height <= 64 {
    return vec![Rect {
      x0: 0,
      y0: 0,
      x1: width - 1,
      y1: height - 1,
    }];
  }

  let p = parallelism.max(1);
  let target_tiles = (4usize).max(3 * p);
  let d = (target_tiles as f64).sqrt().floor().max(1.0) as usize;

  let mut bx = (32usize).max(width.div_ceil(d));
  let mut by = (32usize).max(height.div_ceil(d));
  bx = bx.min((width / 2).max(64));
  by = by.min((height / 2).max(64));

  let mut interiors = Vec::new();
  let mut y0 = 0usize;
  while y0 < height {
    let y1 = (y0 + by - 1).min(height - 1);
    let mut x0 = 0usize;
    while x0 < width {
      let x1 = (x0 + bx - 1).min(width - 1);
      interiors.push(Rect { x0, y0, x1, y1 });
      x0 = x1 + 1;
    }
    y0 = y1 + 1;
  }
  interiors
}

/// Inflate `interior` by `(hx, hy)` and clip to the image bounds, producing
/// the rectangle of input pixels the interior's windows can ever read from.
fn tile_rect_for(interior: Rect, width: usize, height: usize, hx: usize, hy: usize) -> Rect {
  Rect {
    x0: interior.x0.saturating_sub(hx),
    y0: interior.y0.saturating_sub(hy),
    x1: (interior.x1 + hx).min(width - 1),
    y1: (interior.y1 + hy).min(height - 1),
  }
}

/// Run the full tile-parallel median filter, dispatching each tile's
/// traversal onto the current Rayon pool (global pool, or a scoped pool
/// installed by the caller via [`crate::median::median_filter_with_workers`]).
pub(crate) fn run<T: Sample>(image: &Image<T>, hy: usize, hx: usize) -> Image<T> {
  let (width, height) = image.dimensions();
  let parallelism = rayon::current_num_threads();
  let interiors = partition_interiors(width, height, parallelism);

  let tiles: Vec<(Rect, Vec<T>)> = interiors
    .into_par_iter()
    .map(|interior| {
      let tile_rect = tile_rect_for(interior, width, height, hx, hy);
      let bx = tile_rect.width();
      let by = tile_rect.height();
      let loc_x0 = interior.x0 - tile_rect.x0;
      let loc_y0 = interior.y0 - tile_rect.y0;
      let loc_x1 = interior.x1 - tile_rect.x0;
      let loc_y1 = interior.y1 - tile_rect.y0;
      let medians = traverse_tile(image, hy, hx, tile_rect.x0, tile_rect.y0, bx, by, loc_x0, loc_y0, loc_x1, loc_y1);
      (interior, medians)
    })
    .collect();

  let mut out = Image::new(width, height, T::default());
  for (interior, medians) in tiles {
    let interior_w = interior.width();
    for row in 0..interior.height() {
      let y = interior.y0 + row;
      for col in 0..interior_w {
        let x = interior.x0 + col;
        out.set(x, y, medians[row * interior_w + col]);
      }
    }
  }
  out
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn small_image_uses_a_single_tile() {
    let interiors = partition_interiors(64, 64, 8);
    assert_eq!(interiors.len(), 1);
    assert_eq!(interiors[0], Rect { x0: 0, y0: 0, x1: 63, y1: 63 });
  }

  #[test]
  fn interiors_partition_the_image_exactly_once() {
    let width = 300;
    let height = 180;
    let interiors = partition_interiors(width, height, 6);
    let mut covered = vec![false; width * height];
    for r in &interiors {
      assert!(r.x1 < width && r.y1 < height);
      for y in r.y0..=r.y1 {
        for x in r.x0..=r.x1 {
          let idx = y * width + x;
          assert!(!covered[idx], "pixel ({x}, {y}) covered by more than one tile");
          covered[idx] = true;
        }
      }
    }
    assert!(covered.iter().all(|&c| c), "every pixel must be covered by exactly one tile");
  }

  #[test]
  fn tile_rect_clips_to_image_bounds_at_corners() {
    let interior = Rect { x0: 0, y0: 0, x1: 9, y1: 9 };
    let tile = tile_rect_for(interior, 20, 20, 3, 3);
    assert_eq!(tile, Rect { x0: 0, y0: 0, x1: 12, y1: 12 });
  }

  #[test]
  fn identity_kernel_returns_the_input_unchanged() {
    let width = 4;
    let height = 4;
    let data: Vec<u8> = (1..=16).collect();
    let image = Image::from_vec(width, height, data.clone());
    let out = run(&image, 0, 0);
    assert_eq!(out.into_vec(), data);
  }

  /// Full-sort reference used only to cross-check the engine in tests.
  /// Never exposed publicly — it's here purely as a correctness oracle.
  fn reference_median_filter<T: Sample>(image: &Image<T>, hy: usize, hx: usize) -> Image<T> {
    let (width, height) = image.dimensions();
    let mut out = Image::new(width, height, T::default());
    for y in 0..height {
      for x in 0..width {
        let mut window = Vec::new();
        let y_lo = y.saturating_sub(hy);
        let y_hi = (y + hy).min(height - 1);
        let x_lo = x.saturating_sub(hx);
        let x_hi = (x + hx).min(width - 1);
        for wy in y_lo..=y_hi {
          for wx in x_lo..=x_hi {
            window.push(image.get(wx, wy));
          }
        }
        window.sort_by(|a, b| a.partial_cmp(b).unwrap());
        let s = window.len();
        let mid = (s - 1) / 2;
        let value = if s % 2 == 1 {
          window[mid]
        } else {
          T::average_pair(window[mid], window[mid + 1])
        };
        out.set(x, y, value);
      }
    }
    out
  }

  fn hash3(u: u32, v: u32, w: u32) -> u32 {
    let mut x = u.wrapping_mul(374761393) ^ v.wrapping_mul(668265263) ^ w.wrapping_mul(2246822519);
    x ^= x >> 13;
    x = x.wrapping_mul(1274126177);
    x ^ (x >> 16)
  }

  fn random_u8_image(width: usize, height: usize, seed: u32) -> Image<u8> {
    let data: Vec<u8> = (0..width * height)
      .map(|i| (hash3(i as u32, seed, 0x9E3779B9) % 256) as u8)
      .collect();
    Image::from_vec(width, height, data)
  }

  #[test]
  fn three_by_three_on_gradient_matches_reference() {
    let image = Image::from_vec(3, 3, vec![1u8, 2, 3, 4, 5, 6, 7, 8, 9]);
    let out = run(&image, 1, 1);
    let reference = reference_median_filter(&image, 1, 1);
    assert_eq!(out.into_vec(), reference.into_vec());
    // Corner (0,0): window is the 2x2 intersection {1, 2, 4, 5}; the two
    // middle values 2 and 4 round-half-up-average to 3.
    assert_eq!(out.get(0, 0), 3);
  }

  #[test]
  fn checkerboard_smoothing_preserves_the_pattern() {
    let mut data = vec![0u8; 25];
    for y in 0..5 {
      for x in 0..5 {
        data[y * 5 + x] = if (x + y) % 2 == 0 { 0 } else { 255 };
      }
    }
    let image = Image::from_vec(5, 5, data);
    let out = run(&image, 1, 1);
    for y in 1..=3usize {
      for x in 1..=3usize {
        let expected = if (x + y) % 2 == 0 { 0 } else { 255 };
        assert_eq!(out.get(x, y), expected, "mismatch at ({x}, {y})");
      }
    }
  }

  #[test]
  fn noise_spike_is_rejected() {
    let mut data = vec![100u8; 81];
    data[4 * 9 + 4] = 255;
    let image = Image::from_vec(9, 9, data);
    let out = run(&image, 1, 1);
    assert!(out.into_vec().iter().all(|&v| v == 100));
  }

  #[test]
  fn rectangular_kernel_matches_per_row_1d_median() {
    let width = 7;
    let height = 5;
    let image = random_u8_image(width, height, 42);
    let out = run(&image, 0, 2);
    let reference = reference_median_filter(&image, 0, 2);
    assert_eq!(out.into_vec(), reference.into_vec());
  }

  #[test]
  fn large_kernel_matches_reference_bit_exactly() {
    let width = 128;
    let height = 128;
    let image = random_u8_image(width, height, 1337);
    let out = run(&image, 7, 7);
    let reference = reference_median_filter(&image, 7, 7);
    assert_eq!(out.into_vec(), reference.into_vec());
  }

  #[test]
  fn property_random_small_images_match_reference() {
    let mut seed = 7u32;
    for trial in 0..40u32 {
      seed = hash3(seed, trial, 0xB5297A4D);
      let width = 1 + (hash3(seed, 1, 0) % 64) as usize;
      let height = 1 + (hash3(seed, 2, 0) % 64) as usize;
      let hx = (hash3(seed, 3, 0) % 6) as usize;
      let hy = (hash3(seed, 4, 0) % 6) as usize;
      let image = random_u8_image(width, height, seed);
      let out = run(&image, hy, hx);
      let reference = reference_median_filter(&image, hy, hx);
      assert_eq!(
        out.into_vec(),
        reference.into_vec(),
        "trial {trial}: {width}x{height} hy={hy} hx={hx}"
      );
    }
  }
}
