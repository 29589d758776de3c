pub mod align;
pub mod chunk;
pub mod genotype;
pub mod haplotype;
pub mod reads;
pub mod variant;
pub mod workflows;
pub mod writers;
