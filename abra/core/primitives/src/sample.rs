/// A scalar pixel value the median engine can rank and average.
///
/// Even-cardinality windows need an averaging rule, and floating and
/// 8-bit images each want a different one (plain midpoint vs.
/// round-half-up). Expressing that as a trait method keeps the
/// rank/bitmap machinery in `filters::median` fully generic over the two
/// supported scalar types instead of matching on a type tag inline.
pub trait Sample: Copy + Default + PartialOrd + Send + Sync + 'static {
  /// Average of two samples for an even-cardinality median window.
  fn average_pair(a: Self, b: Self) -> Self;
}

impl Sample for f32 {
  fn average_pair(a: Self, b: Self) -> Self {
    (a + b) / 2.0
  }
}

impl Sample for u8 {
  fn average_pair(a: Self, b: Self) -> Self {
    // Round-half-up.
    ((a as u16 + b as u16 + 1) / 2) as u8
  }
}
