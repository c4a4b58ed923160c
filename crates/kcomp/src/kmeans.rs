pub mod lloyds;
pub mod plus_plus_init;

// References:
// - Least squares quantization in PCM (S. Lloyd)
// - k-means++: The Advantages of Careful Seeding (D. Arthur, S. Vassilvitskii)
//   https://theory.stanford.edu/~sergei/papers/kMeansPP-soda.pdf

/// Mapping value of a point that no assignment pass has visited yet.
pub const UNASSIGNED: usize = usize::MAX;
