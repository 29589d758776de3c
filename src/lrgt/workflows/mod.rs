mod sv;

pub use sv::{analyze_chunk, Params};

#[cfg(test)]
pub(crate) use sv::tests;
