//! Random-access datasets of sample pairs.

mod csv;
mod dataset_;
mod image_list;

pub use self::csv::*;
pub use dataset_::*;
pub use image_list::*;
