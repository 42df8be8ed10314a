mod findable;
mod finder;

pub use findable::{Findable, First, Last};
pub use finder::{DocumentsExt, Finder};
