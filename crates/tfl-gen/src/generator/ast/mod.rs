mod documentation;
mod endpoints;
mod models;
mod types;

pub use documentation::Documentation;
pub use endpoints::{ApiDescriptor, EndpointDescriptor, ParamDescriptor, ParamLocation};
pub use models::{EnumVariant, FieldDef, GeneratedModel, ModelKind};
pub use types::{Primitive, TypeDescriptor};
