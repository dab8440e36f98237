//! The generation pipeline: rename, merge, deduplicate, build, analyze, emit.

use std::{
  collections::BTreeMap,
  path::{Path, PathBuf},
};

use anyhow::Context;

use super::{
  analyzer::{Analysis, analyze},
  ast::{ApiDescriptor, GeneratedModel},
  codegen::Emitter,
  converter::{EndpointBuilder, ModelBuilder},
  document::SchemaDocument,
  merger::{DEFAULT_MAX_DEDUP_PASSES, MergedSpec, SchemaMerger},
  metrics::GenerationStats,
  policy::RenamePolicy,
  renamer::{EntityRenamer, NameRegistry},
};

pub const DEFAULT_BASE_URL: &str = "https://api.tfl.gov.uk";

#[derive(Debug, Clone, PartialEq, Eq, bon::Builder)]
pub struct GeneratorConfig {
  #[builder(default = DEFAULT_MAX_DEDUP_PASSES)]
  pub max_dedup_passes: usize,
  /// Base URL baked into the generated clients.
  #[builder(into, default = DEFAULT_BASE_URL.to_string())]
  pub base_url: String,
}

impl Default for GeneratorConfig {
  fn default() -> Self {
    Self::builder().build()
  }
}

/// Models and endpoints after analysis, before emission.
#[derive(Debug, Clone)]
pub struct ResolvedModels {
  pub models: BTreeMap<String, GeneratedModel>,
  pub apis: Vec<ApiDescriptor>,
  pub analysis: Analysis,
  pub registry: NameRegistry,
  pub stats: GenerationStats,
}

#[derive(Debug, Clone)]
pub struct GeneratedOutput {
  /// File contents keyed by path relative to the output directory.
  pub files: BTreeMap<PathBuf, String>,
  pub registry: NameRegistry,
  pub stats: GenerationStats,
}

pub struct Orchestrator {
  documents: Vec<SchemaDocument>,
  policy: RenamePolicy,
  config: GeneratorConfig,
}

impl Orchestrator {
  pub fn new(documents: Vec<SchemaDocument>, policy: RenamePolicy, config: GeneratorConfig) -> Self {
    Self {
      documents,
      policy,
      config,
    }
  }

  /// Runs every stage up to and including cycle breaking and ordering.
  pub fn resolve(self) -> anyhow::Result<ResolvedModels> {
    let Self {
      mut documents,
      policy,
      config,
    } = self;
    let mut stats = GenerationStats {
      documents_loaded: documents.len(),
      ..GenerationStats::default()
    };

    let registry = rename_documents(&mut documents, &policy, &mut stats);
    let merged = merge_documents(documents, config.max_dedup_passes, &mut stats)?;

    let (mut set, mut mapper) = ModelBuilder::new(&merged.schemas)
      .build()
      .context("building models")?;
    let mut apis = EndpointBuilder::new(&merged, &mut set, &mut mapper)
      .build()
      .context("building endpoints")?;
    set.degrade_dangling_types(&mut apis);
    stats.record_warnings(set.warnings.drain(..));

    let mut models = set.models;
    let analysis = analyze(&mut models);

    stats.record_models(models.values());
    stats.endpoints_generated = apis.iter().map(|api| api.endpoints.len()).sum();
    stats.clients_generated = apis.len();
    stats.record_cycles(analysis.cycles.cycles.clone());
    stats.forward_refs = analysis.broken.fields_rewritten;
    stats.newtypes = analysis.broken.newtypes.clone();
    stats.record_warnings(analysis.warnings.iter().cloned());

    Ok(ResolvedModels {
      models,
      apis,
      analysis,
      registry,
      stats,
    })
  }

  /// Runs the whole pipeline and renders every output file in memory.
  pub fn generate(self) -> anyhow::Result<GeneratedOutput> {
    let base_url = self.config.base_url.clone();
    let ResolvedModels {
      models,
      apis,
      analysis,
      registry,
      mut stats,
    } = self.resolve()?;

    let files = Emitter::new(&models, &analysis.order, &apis, &analysis.graph, &base_url).emit()?;
    stats.files_written = files.len();

    Ok(GeneratedOutput { files, registry, stats })
  }
}

fn rename_documents(documents: &mut [SchemaDocument], policy: &RenamePolicy, stats: &mut GenerationStats) -> NameRegistry {
  let renamer = EntityRenamer::new(policy);
  let mut registry = NameRegistry::default();

  for document in documents {
    let report = renamer.rename(document, &mut registry);
    stats.schemas_renamed += report.moved;
    stats.refs_rewritten += report.refs_rewritten;
    if let Some(warning) = report.warning {
      stats.record_warning(warning);
    }
  }
  registry
}

fn merge_documents(
  documents: Vec<SchemaDocument>,
  max_passes: usize,
  stats: &mut GenerationStats,
) -> anyhow::Result<MergedSpec> {
  let merger = SchemaMerger::builder().max_passes(max_passes).build();
  let (mut merged, warnings) = merger.merge(documents);
  stats.record_warnings(warnings);

  let report = merger.deduplicate(&mut merged)?;
  stats.duplicates_removed = report.removed;
  stats.dedup_passes = report.passes;
  stats.refs_rewritten += report.refs_rewritten;

  SchemaMerger::verify_references(&merged)?;
  Ok(merged)
}

/// Writes `files` under `output`, creating directories as needed. Returns the number of files written.
pub async fn write_files(output: &Path, files: &BTreeMap<PathBuf, String>) -> anyhow::Result<usize> {
  for (relative, contents) in files {
    let path = output.join(relative);
    if let Some(parent) = path.parent() {
      tokio::fs::create_dir_all(parent)
        .await
        .with_context(|| format!("creating {}", parent.display()))?;
    }
    tokio::fs::write(&path, contents)
      .await
      .with_context(|| format!("writing {}", path.display()))?;
  }
  Ok(files.len())
}
