pub mod refs;
pub mod spec;

pub(crate) use refs::{RefSite, collect_refs, parse_schema_ref_path, ref_target, rewrite_refs, rewrite_schema_refs, schema_ref};
