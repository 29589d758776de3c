mod aggregate;
mod evidence;
mod gt;
mod models;

pub use aggregate::VariantCall;
pub use evidence::AlleleSupport;
pub use gt::GenotypeCall;
pub use models::{apply_model, GtModel, ModelInput};
