/// Parameter sources and the readers that turn them into blobs.
mod params;
mod source;

pub use params::{load_vector, load_weights};
pub use source::{FileSource, MemorySource, ParamSource};
