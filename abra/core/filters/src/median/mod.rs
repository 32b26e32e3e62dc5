mod bitmap;
mod driver;
mod tile;
mod traversal;

use primitives::{Image, Sample};

/// Apply a two-dimensional median filter to `p_input`, writing the result
/// into `p_output`.
///
/// - `p_input`/`p_output`: dense, row-major, single-channel buffers of
///   `p_height * p_width` elements each; must not alias.
/// - `p_hy`/`p_hx`: kernel half-extents (full size `(2*p_hy+1) x
///   (2*p_hx+1)`); pixels near the image edge use a shrunken window — the
///   intersection of the kernel with the image — rather than padding or
///   reflection.
///
/// Uses the Rayon global thread pool. To pin the worker count, use
/// [`median_filter_with_workers`].
///
/// Panics if `p_input.len()` or `p_output.len()` doesn't equal `p_height *
/// p_width`, or if pixel values are not totally ordered (e.g. a `NaN` in a
/// `f32` image) — these are caller preconditions, not recoverable errors.
pub fn median_filter<T: Sample>(
  p_input: &[T], p_output: &mut [T], p_height: usize, p_width: usize, p_hy: usize, p_hx: usize,
) {
  assert_eq!(p_input.len(), p_height * p_width, "median_filter: input length does not match height * width");
  assert_eq!(p_output.len(), p_input.len(), "median_filter: output length does not match input length");

  let image = Image::from_vec(p_width, p_height, p_input.to_vec());
  let result = driver::run(&image, p_hy, p_hx);
  p_output.copy_from_slice(result.data());
}

/// Same as [`median_filter`], but runs the tile-parallel traversal on a
/// scoped Rayon pool pinned to `p_workers` threads, rather than the global
/// pool. Affects performance only.
pub fn median_filter_with_workers<T: Sample>(
  p_input: &[T], p_output: &mut [T], p_height: usize, p_width: usize, p_hy: usize, p_hx: usize, p_workers: usize,
) {
  assert_eq!(p_input.len(), p_height * p_width, "median_filter: input length does not match height * width");
  assert_eq!(p_output.len(), p_input.len(), "median_filter: output length does not match input length");

  let pool = rayon::ThreadPoolBuilder::new()
    .num_threads(p_workers)
    .build()
    .expect("failed to build a scoped Rayon thread pool");

  let image = Image::from_vec(p_width, p_height, p_input.to_vec());
  let result = pool.install(|| driver::run(&image, p_hy, p_hx));
  p_output.copy_from_slice(result.data());
}
