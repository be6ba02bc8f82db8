//! Flat element buffers.
//!
//! A [`Dense`] buffer owns the elements; the [`Range`](crate::range::Range)
//! held next to it in [`Tensor`](crate::Tensor) gives them their shape.

mod dense;

pub use dense::Dense;
