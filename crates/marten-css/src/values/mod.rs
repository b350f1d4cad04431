//! Typed CSS value primitives: lengths, colors, and `calc()` trees.

pub mod calc;
pub mod color;
pub mod length;

pub use calc::CalcExpr;
pub use color::{SystemColorResolver, WebColor};
pub use length::{Length, LengthUnit};
