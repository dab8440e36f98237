use std::{
  ffi::OsStr,
  path::{Path, PathBuf},
};

use anyhow::Context;
use fmmap::tokio::{AsyncMmapFile, AsyncMmapFileExt};

use crate::generator::document::SchemaDocument;

const SPEC_EXTENSION: &str = "json";

pub struct SpecLoader {
  file: AsyncMmapFile,
  path: PathBuf,
}

impl SpecLoader {
  pub async fn open(path: &Path) -> anyhow::Result<Self> {
    let file = AsyncMmapFile::open(path)
      .await
      .with_context(|| format!("opening {}", path.display()))?;

    Ok(Self {
      file,
      path: path.to_path_buf(),
    })
  }

  pub fn parse_value(&self) -> anyhow::Result<serde_json::Value> {
    serde_json::from_slice(self.file.as_slice()).with_context(|| format!("parsing {}", self.path.display()))
  }

  pub fn parse(&self) -> anyhow::Result<oas3::Spec> {
    serde_json::from_slice::<oas3::OpenApiV3Spec>(self.file.as_slice())
      .with_context(|| format!("parsing {} as OpenAPI", self.path.display()))
  }

  pub fn file_name(&self) -> String {
    self
      .path
      .file_name()
      .and_then(OsStr::to_str)
      .unwrap_or_default()
      .to_string()
  }
}

/// Lists the `*.json` documents in `dir`, sorted by file name so every run sees the same order.
pub async fn list_spec_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
  let mut entries = tokio::fs::read_dir(dir)
    .await
    .with_context(|| format!("reading input directory {}", dir.display()))?;

  let mut files = vec![];
  while let Some(entry) = entries.next_entry().await? {
    let path = entry.path();
    if path.is_file() && path.extension().and_then(OsStr::to_str) == Some(SPEC_EXTENSION) {
      files.push(path);
    }
  }
  files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

  if files.is_empty() {
    anyhow::bail!("no *.{SPEC_EXTENSION} OpenAPI documents found in {}", dir.display());
  }
  Ok(files)
}

pub async fn load_documents(dir: &Path) -> anyhow::Result<Vec<SchemaDocument>> {
  let mut documents = vec![];
  for path in list_spec_files(dir).await? {
    let loader = SpecLoader::open(&path).await?;
    documents.push(SchemaDocument::new(loader.file_name(), loader.parse_value()?)?);
  }
  Ok(documents)
}

pub async fn load_specs(dir: &Path) -> anyhow::Result<Vec<(String, oas3::Spec)>> {
  let mut specs = vec![];
  for path in list_spec_files(dir).await? {
    let loader = SpecLoader::open(&path).await?;
    specs.push((loader.file_name(), loader.parse()?));
  }
  Ok(specs)
}
