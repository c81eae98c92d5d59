use std::path::PathBuf;

use tracing::{info, warn};

use crate::{
    compilation::{
        plan::{assemble, RenderJob},
        render::{RenderStage, RenderedCompilation},
        selection::select_clips,
    },
    config::Config,
    error::{PlanError, Result},
    video::ClipInventory,
};

/// Immutable parameters for one compilation run
///
/// Built from the explicit configuration plus the caller-supplied collection
/// and bracket paths, then logged once at the start of the run.
#[derive(Debug, Clone)]
pub struct CompilationRequest {
    pub source_collection: String,
    pub target_duration: f64,
    pub transition: f64,
    pub max_clips: usize,
    pub intro: Option<PathBuf>,
    pub outro: Option<PathBuf>,
}

/// How a compilation run ended
///
/// Disabled runs and runs with nothing to compile are successful no-ops, not
/// errors; the caller decides how loudly to report them.
#[derive(Debug)]
pub enum CompilationOutcome {
    /// The output file was written
    Completed(RenderedCompilation),

    /// Compilation is switched off in the configuration
    Disabled,

    /// No candidate clips and no bracket clips; nothing to render
    NothingToCompile,
}

/// Main engine that orchestrates the compilation pipeline
///
/// The engine follows a fixed sequence:
/// 1. Inventory - discover candidate clips and probe their metadata
/// 2. Selection - order by recency, cap the clip count, account durations
/// 3. Assembly - attach optional intro/outro bracket clips
/// 4. Concatenation - apply transitions, join, normalize on failure
/// 5. Render - write the final file to its deterministic path
pub struct CompilationEngine {
    config: Config,
}

impl CompilationEngine {
    /// Create a new engine with the given configuration
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Run the full pipeline for one collection
    ///
    /// # Arguments
    ///
    /// * `collection` - sub-folder of the results root to compile from
    /// * `intro` - optional clip played before the main clips
    /// * `outro` - optional clip played after the main clips
    pub async fn compile(
        &self,
        collection: &str,
        intro: Option<PathBuf>,
        outro: Option<PathBuf>,
    ) -> Result<CompilationOutcome> {
        if !self.config.compilation.enabled {
            info!("Compilation is disabled in the configuration; nothing to do");
            return Ok(CompilationOutcome::Disabled);
        }

        let request = CompilationRequest {
            source_collection: collection.to_string(),
            target_duration: self.config.compilation.target_duration,
            transition: self.config.compilation.transition,
            max_clips: self.config.compilation.max_clips,
            intro,
            outro,
        };

        info!("🎬 Starting compilation");
        info!("   Collection: {}", request.source_collection);
        info!("   Target duration: {:.0}s", request.target_duration);
        info!("   Transition: {:.1}s", request.transition);
        info!("   Max clips: {}", request.max_clips);

        let source_dir = self
            .config
            .source
            .results_root
            .join(&request.source_collection);

        // Step 1: Inventory
        info!("📼 Step 1: Discovering clips in {:?}...", source_dir);
        let inventory = ClipInventory::new(self.config.encode.probe_threads)
            .scan(&source_dir)
            .await?;

        if inventory.is_empty() && request.intro.is_none() && request.outro.is_none() {
            info!("No clips found in {:?}; nothing to compile", source_dir);
            return Ok(CompilationOutcome::NothingToCompile);
        }

        // Step 2: Selection
        info!("🗂️  Step 2: Selecting clips...");
        let selection = select_clips(inventory, request.max_clips);

        if selection.is_empty() {
            return Err(PlanError::NoContent { path: source_dir }.into());
        }

        if let Some(missing) = selection.shortfall(request.target_duration) {
            warn!(
                "Selected clips total {:.1}s, {:.1}s short of the {:.0}s target; compiling what is there",
                selection.total_duration, missing, request.target_duration
            );
        }

        info!(
            "   ✅ Selected {} clip(s), {:.1}s total",
            selection.len(),
            selection.total_duration
        );

        // Step 3: Assembly
        info!("🧩 Step 3: Assembling compilation plan...");
        let plan = assemble(
            selection.clips,
            request.intro.as_deref(),
            request.outro.as_deref(),
        )
        .await?;
        info!(
            "   ✅ Plan ready: {} clip(s), {:.1}s planned",
            plan.len(),
            plan.total_duration()
        );

        // Steps 4 and 5: Concatenation and render
        info!("🎞️  Step 4: Rendering final compilation...");
        let render_stage = RenderStage::new(&self.config.compilation.output_folder);
        let output_path = render_stage.output_path(plan.main.len(), request.target_duration);
        let job = RenderJob {
            plan,
            output_path,
            encode: self.config.encode.params(),
        };

        let rendered = render_stage.render(job, request.transition).await?;

        info!("🎉 Compilation complete! Output saved to: {:?}", rendered.path);
        Ok(CompilationOutcome::Completed(rendered))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_for(root: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.source.results_root = root.join("results");
        config.compilation.output_folder = root.join("compilations");
        config
    }

    #[tokio::test]
    async fn test_disabled_compilation_is_a_noop() {
        let dir = tempdir().unwrap();
        let mut config = config_for(dir.path());
        config.compilation.enabled = false;

        let engine = CompilationEngine::new(config);
        let outcome = engine.compile("askreddit", None, None).await.unwrap();
        assert!(matches!(outcome, CompilationOutcome::Disabled));
    }

    #[tokio::test]
    async fn test_missing_source_directory_fails() {
        let dir = tempdir().unwrap();
        let engine = CompilationEngine::new(config_for(dir.path()));

        let result = engine.compile("askreddit", None, None).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_empty_collection_without_brackets_is_success() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        std::fs::create_dir_all(config.source.results_root.join("askreddit")).unwrap();

        let engine = CompilationEngine::new(config);
        let outcome = engine.compile("askreddit", None, None).await.unwrap();
        assert!(matches!(outcome, CompilationOutcome::NothingToCompile));

        // nothing was written
        assert!(!dir.path().join("compilations").exists());
    }

    #[tokio::test]
    async fn test_empty_collection_with_intro_is_no_content() {
        let dir = tempdir().unwrap();
        let config = config_for(dir.path());
        std::fs::create_dir_all(config.source.results_root.join("askreddit")).unwrap();

        let engine = CompilationEngine::new(config);
        let result = engine
            .compile("askreddit", Some(dir.path().join("intro.mp4")), None)
            .await;
        assert!(result.is_err());
    }
}
