pub mod analyzer;
pub mod ast;
pub mod codegen;
pub mod converter;
pub mod document;
pub mod errors;
pub mod merger;
pub mod metrics;
pub mod orchestrator;
pub mod policy;
pub mod renamer;

#[cfg(test)]
mod tests;
