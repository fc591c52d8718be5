pub mod layout;
pub mod scaler;

pub use layout::{Anchor, anchor_offset, center_offset, fit_within};
pub use scaler::{ImagePair, ScaledImage, SourceImage, scale};
