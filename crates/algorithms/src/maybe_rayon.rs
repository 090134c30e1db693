/// Switch between rayon and sequential iteration.
///
/// With the `parallel` feature the row loops and the per-region loop run on
/// rayon's pool. Without it, `into_par_iter()` degrades to `into_iter()` and
/// the rest of the chain (`.map()`, `.flat_map()`, `.collect()`) resolves to
/// the standard `Iterator` methods.
#[cfg(feature = "parallel")]
pub use rayon::prelude::*;

#[cfg(not(feature = "parallel"))]
mod sequential {
    pub trait IntoParallelIterator {
        type Iter;
        type Item;
        fn into_par_iter(self) -> Self::Iter;
    }

    impl<I: IntoIterator> IntoParallelIterator for I {
        type Iter = I::IntoIter;
        type Item = I::Item;
        fn into_par_iter(self) -> Self::Iter {
            self.into_iter()
        }
    }
}

#[cfg(not(feature = "parallel"))]
pub use sequential::*;
