use std::path::PathBuf;

use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::{
  generator::{
    metrics::{GenerationStats, GenerationWarning},
    orchestrator::{GeneratorConfig, Orchestrator, write_files},
    policy::RenamePolicy,
    renamer::NameRegistry,
  },
  ui::{Colors, GenerateCommand},
  utils::spec::load_documents,
};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

#[derive(Debug, Clone)]
pub struct GenerateConfig {
  pub input: PathBuf,
  pub output: PathBuf,
  pub policy: Option<PathBuf>,
  pub generator: GeneratorConfig,
  pub verbose: bool,
  pub quiet: bool,
}

impl GenerateConfig {
  pub fn from_command(command: GenerateCommand) -> Self {
    let GenerateCommand {
      input,
      output,
      policy,
      base_url,
      max_dedup_passes,
      verbose,
      quiet,
    } = command;

    let generator = GeneratorConfig::builder()
      .maybe_base_url(base_url)
      .maybe_max_dedup_passes(max_dedup_passes)
      .build();

    Self {
      input,
      output,
      policy,
      generator,
      verbose,
      quiet,
    }
  }
}

struct GenerateLogger<'a> {
  config: &'a GenerateConfig,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  fn new(config: &'a GenerateConfig, colors: &'a Colors) -> Self {
    Self { config, colors }
  }

  fn info(&self, message: &str) {
    if !self.config.quiet {
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        message.with(self.colors.primary())
      );
    }
  }

  fn stat(&self, label: &str, value: impl ToString) {
    if !self.config.quiet {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.to_string().with(self.colors.value())
      );
    }
  }

  fn log_loading(&self) {
    self.info(&format!("Loading OpenAPI documents from: {}", self.config.input.display()));
  }

  fn log_policy(&self, policy: &RenamePolicy) {
    let source = self
      .config
      .policy
      .as_ref()
      .map_or_else(|| "built-in".to_string(), |path| path.display().to_string());
    self.info(&format!("Rename policy {} ({source})", policy.version));
    if self.config.verbose {
      self.stat("Policy entries:", policy.entry_count());
    }
  }

  fn log_generating(&self) {
    self.info("Resolving schemas and generating modules...");
  }

  fn print_statistics(&self, stats: &GenerationStats, registry: &NameRegistry) {
    if self.config.quiet {
      return;
    }

    self.stat("Documents loaded:", stats.documents_loaded);
    self.stat("Schemas renamed:", stats.schemas_renamed);
    if self.config.verbose {
      if !registry.is_empty() {
        self.stat("", format!("{} registry entries", registry.len()));
      }
      self.stat("", format!("{} refs rewritten", stats.refs_rewritten));
    }
    self.stat(
      "Duplicates removed:",
      format!("{} in {} passes", stats.duplicates_removed, stats.dedup_passes),
    );

    self.stat("Models generated:", stats.models_generated);
    self.stat("", format!("{} records", stats.records_generated));
    self.stat("", format!("{} list aliases", stats.list_aliases_generated));
    self.stat("", format!("{} enums", stats.enums_generated));
    self.stat("", format!("{} open maps", stats.open_models_generated));
    self.stat("", format!("{} scalars", stats.scalars_generated));
    self.stat("Clients generated:", stats.clients_generated);
    self.stat("Endpoints generated:", stats.endpoints_generated);

    self.print_cycles(stats);
    if !stats.warnings.is_empty() {
      self.stat("Warnings:", stats.warnings.len());
    }
    self.print_warnings(stats);
  }

  fn print_cycles(&self, stats: &GenerationStats) {
    if stats.cycles_detected == 0 {
      return;
    }

    self.stat("Cycles:", stats.cycles_detected);
    self.stat("Forward refs:", stats.forward_refs);
    if !stats.newtypes.is_empty() {
      self.stat("Alias newtypes:", stats.newtypes.join(", "));
    }

    if self.config.verbose {
      for (i, cycle) in stats.cycle_details.iter().enumerate() {
        println!(
          "              {}: {}",
          format!("Cycle {}", i + 1).with(self.colors.accent()),
          cycle.join(" -> ").with(self.colors.info())
        );
      }
    }
  }

  /// Warnings shown at the current verbosity, with their tag. Skipped items always show.
  fn visible_warnings<'s>(&self, stats: &'s GenerationStats) -> Vec<(&'static str, &'s GenerationWarning)> {
    if self.config.quiet {
      return vec![];
    }
    stats
      .warnings
      .iter()
      .filter(|warning| warning.is_skipped_item() || self.config.verbose)
      .map(|warning| (if warning.is_skipped_item() { "Skipped:" } else { "Warning:" }, warning))
      .collect()
  }

  fn print_warnings(&self, stats: &GenerationStats) {
    let warnings = self.visible_warnings(stats);
    if warnings.is_empty() {
      return;
    }

    eprintln!();
    for (tag, warning) in warnings {
      eprintln!(
        "{} {}",
        tag.with(self.colors.accent()),
        warning.to_string().with(self.colors.primary())
      );
    }
  }

  fn log_writing(&self) {
    self.info(&format!("Writing to: {}", self.config.output.display()));
  }

  fn log_success(&self, files: usize) {
    if !self.config.quiet {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        format!("Successfully generated {files} files").with(self.colors.success())
      );
    }
  }
}

pub async fn generate_code(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(&config, colors);

  let policy = RenamePolicy::resolve(config.policy.as_deref()).await?;
  logger.log_policy(&policy);

  logger.log_loading();
  let documents = load_documents(&config.input).await?;

  logger.log_generating();
  let output = Orchestrator::new(documents, policy, config.generator.clone()).generate()?;
  logger.print_statistics(&output.stats, &output.registry);

  logger.log_writing();
  let written = write_files(&config.output, &output.files).await?;
  logger.log_success(written);
  Ok(())
}
