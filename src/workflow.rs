use std::path::{Path, PathBuf};
use std::time::Instant;
use chrono::{DateTime, Local};
use indicatif::{ProgressBar, ProgressStyle};
use tokio::fs;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::{Result, RpyError};
use crate::language::TargetLanguage;
use crate::script::{Rewrite, Transducer, TranslationStats};
use crate::translate::safe::SafePolicy;
use crate::translate::{SafeTranslator, Translator, TranslatorFactory};

/// Extension of the script files picked up in batch mode
pub const SCRIPT_EXTENSION: &str = "rpy";

pub struct Workflow {
    config: Config,
    translator: SafeTranslator,
}

impl Workflow {
    pub fn new(config: Config) -> Result<Self> {
        let backend = TranslatorFactory::create_translator(&config.translate)?;
        Ok(Self::with_translator(config, backend))
    }

    /// Build a workflow around an already constructed backend
    pub fn with_translator(config: Config, backend: Box<dyn Translator>) -> Self {
        let translator = SafeTranslator::new(backend, SafePolicy::from(&config.translate));
        Self { config, translator }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Translate a single script file.
    ///
    /// A missing input is reported and yields empty statistics; nothing is written.
    pub async fn process_file<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_path: P,
        output_path: Q,
        target: TargetLanguage,
        rewrite_directive: bool,
    ) -> Result<TranslationStats> {
        let input_path = input_path.as_ref();
        let output_path = output_path.as_ref();
        let started = Instant::now();

        if !input_path.is_file() {
            warn!("File {} not found!", input_path.display());
            return Ok(TranslationStats::default());
        }

        info!("Translating {} -> {} ({})", input_path.display(), output_path.display(), target);

        let content = fs::read_to_string(input_path).await?;
        let transducer = Transducer::new(target, rewrite_directive);

        let mut output = String::with_capacity(content.len() * 2);
        let mut stats = TranslationStats::default();

        for raw in content.split_inclusive('\n') {
            let terminated = raw.ends_with('\n');
            let line = raw.trim_end_matches('\n').trim_end_matches('\r');

            let rewrite = transducer.rewrite_line(line, &self.translator).await;
            stats += rewrite.stats();

            match rewrite {
                Rewrite::Kept(text) => {
                    output.push_str(&text);
                    if terminated {
                        output.push('\n');
                    }
                }
                Rewrite::Translated { comment, replacement, .. } => {
                    output.push_str(&comment);
                    output.push('\n');
                    output.push_str(&replacement);
                    output.push('\n');
                }
            }
        }

        if let Some(parent) = output_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }
        fs::write(output_path, output).await?;

        info!(
            "Finished {} in {:.2}s: {} lines, {} source chars, {} translated chars",
            input_path.display(),
            started.elapsed().as_secs_f64(),
            stats.translated_lines,
            stats.source_chars,
            stats.translated_chars
        );

        Ok(stats)
    }

    /// Translate every `.rpy` file directly inside `input_dir` into
    /// `output_root/<language>/`.
    pub async fn process_directory<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        input_dir: P,
        output_root: Q,
        target: TargetLanguage,
        rewrite_directive: bool,
    ) -> Result<TranslationStats> {
        let input_dir = input_dir.as_ref();
        info!("Processing directory: {}", input_dir.display());

        if !input_dir.is_dir() {
            return Err(RpyError::Config(format!(
                "Input path is not a directory: {}",
                input_dir.display()
            )));
        }

        let output_dir = output_root.as_ref().join(target.identifier());
        fs::create_dir_all(&output_dir).await?;

        let scripts = find_scripts(input_dir);
        info!("Found {} script files to translate", scripts.len());

        let pb = ProgressBar::new(scripts.len() as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} {msg}")
                .map_err(|e| RpyError::Config(format!("Invalid progress template: {}", e)))?
                .progress_chars("#>-"),
        );

        let mut total = TranslationStats::default();
        for script in scripts {
            let Some(file_name) = script.file_name() else {
                continue;
            };
            pb.set_message(file_name.to_string_lossy().to_string());

            let output_path = output_dir.join(file_name);
            match self.process_file(&script, &output_path, target, rewrite_directive).await {
                Ok(stats) => total += stats,
                Err(e) => warn!("Failed to translate {}: {}", script.display(), e),
            }
            pb.inc(1);
        }
        pb.finish_with_message("done");
        debug!("{} distinct strings sent for translation", self.translator.cached_entries().await);

        Ok(total)
    }

    /// Output path for single-file mode, inside the configured output directory
    pub fn single_output_path(&self, target: TargetLanguage) -> PathBuf {
        self.config.output.directory.join(single_output_name(target, Local::now()))
    }
}

/// `translated_<language>_<YYYYmmdd_HHMMSS>.rpy`
pub fn single_output_name(target: TargetLanguage, now: DateTime<Local>) -> String {
    format!(
        "translated_{}_{}.{}",
        target.identifier(),
        now.format("%Y%m%d_%H%M%S"),
        SCRIPT_EXTENSION
    )
}

/// Script files directly inside `dir`, sorted by name
pub fn find_scripts(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| {
            e.path()
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == SCRIPT_EXTENSION)
        })
        .map(|e| e.into_path())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_single_output_name() {
        let now = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(
            single_output_name(TargetLanguage::French, now),
            "translated_french_20240309_070501.rpy"
        );
        assert_eq!(
            single_output_name(TargetLanguage::ChineseSimplified, now),
            "translated_zh-CN_20240309_070501.rpy"
        );
    }

    #[test]
    fn test_find_scripts_is_flat_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.rpy"), "").unwrap();
        std::fs::write(dir.path().join("a.rpy"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::write(dir.path().join("script.rpyc"), "").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        std::fs::write(dir.path().join("nested").join("c.rpy"), "").unwrap();

        let names: Vec<String> = find_scripts(dir.path())
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.rpy", "b.rpy"]);
    }
}
