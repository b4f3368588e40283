//! Slide composition.
//!
//! Builds one solid-colour slide per script unit (title card first, then one
//! slide per bullet), captions each slide with `drawtext`, concatenates them,
//! attaches the narration and trims the result to
//! `min(visual_duration, audio_duration)`. Everything is rendered and encoded
//! by a single FFmpeg invocation.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use reel_models::{CompositionPlan, RenderSettings, Script, Slide};

use crate::caption::{max_chars_per_line, wrap_caption};
use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::filters::{color_source, drawtext, silence_source, slide_graph};
use crate::probe::probe_duration;

/// Inputs of one composition.
#[derive(Debug, Clone, Copy)]
pub struct CompositionRequest<'a> {
    pub script: &'a Script,
    /// Narration audio; `None` renders a silent track
    pub narration: Option<&'a Path>,
    /// Scratch directory for caption files
    pub workdir: &'a Path,
    /// Encoded video destination
    pub output: &'a Path,
}

/// A composed and encoded video.
#[derive(Debug, Clone)]
pub struct ComposedVideo {
    pub path: PathBuf,
    pub plan: CompositionPlan,
}

/// Capability that turns a script and its narration into a video file.
#[async_trait]
pub trait VideoComposer: Send + Sync {
    async fn compose(&self, request: CompositionRequest<'_>) -> MediaResult<ComposedVideo>;
}

/// Composer backed by the FFmpeg CLI.
pub struct FfmpegComposer {
    settings: RenderSettings,
    timeout_secs: Option<u64>,
}

impl FfmpegComposer {
    /// Create a composer with the given settings.
    pub fn new(settings: RenderSettings) -> Self {
        Self {
            settings,
            timeout_secs: None,
        }
    }

    /// Kill FFmpeg if encoding takes longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Plan the composition, probing the narration length.
    pub async fn plan(&self, script: &Script, narration: Option<&Path>) -> MediaResult<CompositionPlan> {
        let slides = Slide::sequence(script, &self.settings);

        match narration {
            Some(path) => {
                let audio_duration = probe_duration(path).await?;
                Ok(CompositionPlan::narrated(slides, audio_duration))
            }
            None => Ok(CompositionPlan::silent(slides)),
        }
    }

    /// Write one wrapped caption file per slide into `workdir`.
    pub async fn write_captions(
        &self,
        plan: &CompositionPlan,
        workdir: &Path,
    ) -> MediaResult<Vec<PathBuf>> {
        let mut files = Vec::with_capacity(plan.slides.len());

        for (i, slide) in plan.slides.iter().enumerate() {
            let style = slide.kind.style(&self.settings);
            let width = max_chars_per_line(self.settings.width, style.font_size);
            let text = wrap_caption(&slide.caption, width).join("\n");

            let path = workdir.join(format!("slide_{:03}.txt", i));
            tokio::fs::write(&path, text).await?;
            files.push(path);
        }

        Ok(files)
    }

    /// Build the single FFmpeg command for a plan.
    ///
    /// Inputs `0..n` are the slide colour sources and input `n` is the audio.
    pub fn build_command(
        &self,
        plan: &CompositionPlan,
        caption_files: &[PathBuf],
        narration: Option<&Path>,
        output: &Path,
    ) -> MediaResult<FfmpegCommand> {
        if plan.slides.is_empty() {
            return Err(MediaError::invalid_composition("no slides to compose"));
        }
        if caption_files.len() != plan.slides.len() {
            return Err(MediaError::invalid_composition(format!(
                "{} caption files for {} slides",
                caption_files.len(),
                plan.slides.len()
            )));
        }
        if plan.output_duration <= 0.0 {
            return Err(MediaError::invalid_composition("narration has zero length"));
        }

        let mut cmd = plan.slides.iter().fold(FfmpegCommand::new(output), |cmd, slide| {
            let style = slide.kind.style(&self.settings);
            cmd.lavfi_input(color_source(style, &self.settings, slide.duration), None)
        });

        let audio_index = cmd.input_count();
        cmd = if plan.silent {
            cmd.lavfi_input(silence_source(), Some(plan.visual_duration))
        } else {
            let narration = narration.ok_or_else(|| {
                MediaError::invalid_composition("narrated plan without narration audio")
            })?;
            cmd.input(narration)
        };

        let captions: Vec<String> = plan
            .slides
            .iter()
            .zip(caption_files)
            .map(|(slide, file)| {
                drawtext(
                    file,
                    slide.kind.style(&self.settings),
                    self.settings.font_file.as_deref(),
                )
            })
            .collect();

        Ok(cmd
            .filter_complex(slide_graph(&captions))
            .map("[vout]")
            .map(format!("{}:a", audio_index))
            .duration(plan.output_duration)
            .output_args(self.settings.to_ffmpeg_args())
            .output_args(["-movflags", "+faststart"]))
    }
}

#[async_trait]
impl VideoComposer for FfmpegComposer {
    async fn compose(&self, request: CompositionRequest<'_>) -> MediaResult<ComposedVideo> {
        let plan = self.plan(request.script, request.narration).await?;

        info!(
            "Composing {} slides: visual {:.1}s, audio {:.1}s, output {:.1}s{}",
            plan.slides.len(),
            plan.visual_duration,
            plan.audio_duration,
            plan.output_duration,
            if plan.is_trimmed() { " (trimmed at narration end)" } else { "" }
        );

        let caption_files = self.write_captions(&plan, request.workdir).await?;
        let cmd = self.build_command(&plan, &caption_files, request.narration, request.output)?;

        let runner = match self.timeout_secs {
            Some(secs) => FfmpegRunner::new().with_timeout(secs),
            None => FfmpegRunner::new(),
        };

        let total = plan.output_duration;
        let last_logged = Arc::new(AtomicU8::new(0));
        runner
            .run_with_progress(&cmd, move |progress| {
                let step = (progress.percentage(total) as u8 / 10) * 10;
                if step > last_logged.load(Ordering::Relaxed) {
                    last_logged.store(step, Ordering::Relaxed);
                    match progress.eta_seconds(total) {
                        Some(eta) => debug!("Encoding progress: {}% (~{:.0}s left)", step, eta),
                        None => debug!("Encoding progress: {}%", step),
                    }
                }
            })
            .await?;

        if !request.output.exists() {
            return Err(MediaError::FileNotFound(request.output.to_path_buf()));
        }

        info!("Composed video written to {}", request.output.display());
        Ok(ComposedVideo {
            path: request.output.to_path_buf(),
            plan,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn script(bullets: &[&str]) -> Script {
        Script::new("Daily facts", bullets.iter().map(|b| b.to_string()).collect())
    }

    fn captions(n: usize) -> Vec<PathBuf> {
        (0..n).map(|i| PathBuf::from(format!("/work/slide_{:03}.txt", i))).collect()
    }

    #[test]
    fn test_command_trims_to_narration() {
        let composer = FfmpegComposer::new(RenderSettings::default());
        let script = script(&["one", "two", "three"]);
        let plan = CompositionPlan::narrated(Slide::sequence(&script, composer.settings()), 40.0);

        let cmd = composer
            .build_command(&plan, &captions(4), Some(Path::new("/work/narration.mp3")), Path::new("/work/out.mp4"))
            .unwrap();
        let args = cmd.build_args();

        assert_eq!(cmd.input_count(), 5);
        assert!(args.contains(&"/work/narration.mp3".to_string()));
        assert!(args.contains(&"4:a".to_string()));
        assert!(args.contains(&"[vout]".to_string()));
        let t = args.iter().rposition(|a| a == "-t").unwrap();
        assert_eq!(args[t + 1], "40.000");
        assert!(args.iter().any(|a| a.contains("concat=n=4:v=1:a=0[vout]")));
        assert!(args.iter().any(|a| a.starts_with("color=c=0x1E1E1E")));
        assert_eq!(args.iter().filter(|a| a.starts_with("color=c=0x14143C")).count(), 3);
    }

    #[test]
    fn test_silent_command_for_title_only() {
        let composer = FfmpegComposer::new(RenderSettings::default());
        let plan = CompositionPlan::silent(Slide::sequence(&script(&[]), composer.settings()));

        let cmd = composer
            .build_command(&plan, &captions(1), None, Path::new("/work/out.mp4"))
            .unwrap();
        let args = cmd.build_args();

        assert_eq!(cmd.input_count(), 2);
        assert!(args.iter().any(|a| a.starts_with("anullsrc")));
        assert!(args.contains(&"1:a".to_string()));
        assert!(args.contains(&"5.000".to_string()));
    }

    #[test]
    fn test_rejects_mismatched_captions() {
        let composer = FfmpegComposer::new(RenderSettings::default());
        let plan = CompositionPlan::silent(Slide::sequence(&script(&["a"]), composer.settings()));

        let result = composer.build_command(&plan, &captions(1), None, Path::new("out.mp4"));
        assert!(matches!(result, Err(MediaError::InvalidComposition(_))));
    }

    #[test]
    fn test_rejects_zero_length_narration() {
        let composer = FfmpegComposer::new(RenderSettings::default());
        let plan = CompositionPlan::narrated(Slide::sequence(&script(&["a"]), composer.settings()), 0.0);

        let result = composer.build_command(
            &plan,
            &captions(2),
            Some(Path::new("narration.mp3")),
            Path::new("out.mp4"),
        );
        assert!(matches!(result, Err(MediaError::InvalidComposition(_))));
    }

    #[tokio::test]
    async fn test_write_captions_wraps_text() {
        let dir = tempfile::tempdir().unwrap();
        let composer = FfmpegComposer::new(RenderSettings::default());
        let script = script(&[
            "Octopuses have three hearts and blue blood, which helps them survive the cold deep sea",
        ]);
        let plan = CompositionPlan::silent(Slide::sequence(&script, composer.settings()));

        let files = composer.write_captions(&plan, dir.path()).await.unwrap();
        assert_eq!(files.len(), 2);

        let title = tokio::fs::read_to_string(&files[0]).await.unwrap();
        assert_eq!(title, "Daily facts");

        let bullet = tokio::fs::read_to_string(&files[1]).await.unwrap();
        assert!(bullet.lines().count() > 1);
        assert!(bullet.lines().all(|l| l.chars().count() <= 41));
    }

    #[tokio::test]
    async fn test_percent_caption_is_drawn_literally() {
        let dir = tempfile::tempdir().unwrap();
        let composer = FfmpegComposer::new(RenderSettings::default());
        let script = script(&["About 70% of Earth is ocean"]);
        let plan = CompositionPlan::silent(Slide::sequence(&script, composer.settings()));

        let files = composer.write_captions(&plan, dir.path()).await.unwrap();
        let bullet = tokio::fs::read_to_string(&files[1]).await.unwrap();
        assert_eq!(bullet, "About 70% of Earth is ocean");

        let cmd = composer
            .build_command(&plan, &files, None, &dir.path().join("out.mp4"))
            .unwrap();
        let graph = cmd
            .build_args()
            .into_iter()
            .find(|a| a.contains("concat="))
            .unwrap();

        assert_eq!(graph.matches("drawtext=").count(), 2);
        assert_eq!(graph.matches(":expansion=none:").count(), 2);
    }

    #[tokio::test]
    async fn test_plan_without_narration_is_silent() {
        let composer = FfmpegComposer::new(RenderSettings::default());
        let plan = composer.plan(&script(&[]), None).await.unwrap();
        assert!(plan.silent);
        assert_eq!(plan.slides.len(), 1);
    }
}
