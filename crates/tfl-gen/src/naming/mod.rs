pub mod identifiers;
pub mod reserved;
