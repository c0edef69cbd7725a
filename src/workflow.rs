use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::{Result, LegendaError};
use crate::language::Language;
use crate::library::{find_containers, SubtitlePaths};
use crate::media::ContainerTools;
use crate::progress::batch_bar;
use crate::report::{BatchSummary, DeferredSink, FileOutcome};
use crate::subtitle::{read_document, write_document, Block, SubtitleDocument};
use crate::tracks::{select_track, Selection};
use crate::translate::TranslationClient;

/// Per-container pipeline: select, extract, translate, write
pub struct Workflow {
    config: Config,
    source: Language,
    target: Language,
    tools: Box<dyn ContainerTools>,
    translator: TranslationClient,
    deferred: Box<dyn DeferredSink>,
    show_progress: bool,
}

impl Workflow {
    pub fn new(
        config: Config,
        tools: Box<dyn ContainerTools>,
        translator: TranslationClient,
        deferred: Box<dyn DeferredSink>,
    ) -> Self {
        let source = Language::from_code(&config.translate.source_language);
        let target = Language::from_code(&config.translate.target_language);

        Self {
            config,
            source,
            target,
            tools,
            translator,
            deferred,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn tools(&self) -> &dyn ContainerTools {
        self.tools.as_ref()
    }

    pub fn source_language(&self) -> &Language {
        &self.source
    }

    pub fn target_language(&self) -> &Language {
        &self.target
    }

    /// Scan the library roots and process every container found
    pub async fn process_library(&self, roots: &[PathBuf]) -> BatchSummary {
        self.translator
            .log_diagnostics(self.source.code(), self.target.code())
            .await;

        let containers = find_containers(roots, &self.config.library.extensions);
        info!("Total container files found: {}", containers.len());

        self.process_files(&containers).await
    }

    /// Process containers in order; one failure never stops the rest
    pub async fn process_files(&self, containers: &[PathBuf]) -> BatchSummary {
        let progress = batch_bar(containers.len() as u64, self.show_progress);

        let mut summary = BatchSummary::default();
        for container in containers {
            let outcome = self.process_file(container).await;
            summary.record(&outcome);
            progress.inc(1);
        }
        progress.finish_and_clear();

        info!("Batch finished: {}", summary);
        summary
    }

    /// Run the pipeline for one container. Errors are logged and reported as
    /// [`FileOutcome::Failed`].
    pub async fn process_file(&self, container: &Path) -> FileOutcome {
        info!("Processing file: {}", container.display());

        match self.run_pipeline(container).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Failed to process {}: {}", container.display(), e);
                FileOutcome::Failed(e.to_string())
            }
        }
    }

    async fn run_pipeline(&self, container: &Path) -> Result<FileOutcome> {
        let paths = SubtitlePaths::for_container(container, self.source.code(), self.target.code());

        if paths.target.exists() {
            info!("Translated subtitle already exists: {}", paths.target.display());
            return Ok(FileOutcome::TargetExists);
        }

        if paths.source.exists() {
            info!("Source subtitle already extracted: {}", paths.source.display());
        } else if let Some(outcome) = self.extract_source(container, &paths.source).await? {
            return Ok(outcome);
        }

        info!("Translating subtitle: {}", paths.source.display());
        let cues = self.translate_file(&paths.source, &paths.target).await?;
        info!("Subtitle translated: {}", paths.target.display());

        Ok(FileOutcome::Translated { cues })
    }

    /// Select and extract the source track. `Some` is a terminal outcome.
    async fn extract_source(&self, container: &Path, destination: &Path) -> Result<Option<FileOutcome>> {
        let tracks = self.tools.subtitle_tracks(container).await;
        if tracks.is_empty() {
            warn!("No subtitle tracks found in {}", container.display());
            return Ok(Some(FileOutcome::NoSubtitleTracks));
        }

        for track in &tracks {
            info!("Evaluating track {}", track);
        }

        match select_track(&tracks, &self.source, &self.target) {
            Selection::AlreadySatisfied => {
                info!("Container already has a {} subtitle: {}", self.target.code(), container.display());
                Ok(Some(FileOutcome::AlreadySatisfied))
            }
            Selection::NoSource => {
                info!("No {} subtitle found: {}", self.source.code(), container.display());
                Ok(Some(FileOutcome::NoSourceTrack))
            }
            Selection::DeferImageBased(image_tracks) => {
                info!("Only image-based {} subtitles ({} tracks): {}",
                      self.source.code(), image_tracks.len(), container.display());
                self.deferred.record(container)?;
                Ok(Some(FileOutcome::DeferredImageBased))
            }
            Selection::Extract(track) => {
                info!("Extracting {} subtitle: {} (track {})",
                      self.source.code(), container.display(), track.id);
                self.tools
                    .extract_track(container, track.id, destination)
                    .await
                    .map_err(|e| LegendaError::Media(format!("Extraction failed: {}", e)))?;
                Ok(None)
            }
        }
    }

    /// Translate a subtitle file block by block and write the result.
    ///
    /// Returns the number of cues sent for translation.
    pub async fn translate_file(&self, input: &Path, output: &Path) -> Result<usize> {
        let document = read_document(input).await?;
        let translated = self.translate_document(&document).await;
        write_document(&translated, output).await?;
        Ok(translated.cue_count())
    }

    /// New document with every cue's text translated; opaque blocks are kept
    pub async fn translate_document(&self, document: &SubtitleDocument) -> SubtitleDocument {
        let delay = Duration::from_millis(self.config.translate.request_delay_ms);
        let mut blocks = Vec::with_capacity(document.blocks.len());
        let mut first_request = true;

        for block in &document.blocks {
            match block {
                Block::Cue(cue) => {
                    if !first_request && !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    first_request = false;

                    let text = self
                        .translator
                        .translate(&cue.text(), self.source.code(), self.target.code())
                        .await;
                    blocks.push(Block::Cue(cue.with_text(&text)));
                }
                Block::Opaque(_) => blocks.push(block.clone()),
            }
        }

        SubtitleDocument { blocks }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::media::MockContainerTools;
    use crate::report::MemorySink;
    use crate::tracks::TrackDescriptor;
    use crate::translate::{SupportedLanguage, TranslationService};

    const SOURCE_SRT: &str = "1\n00:00:01,000 --> 00:00:02,000\nHello <i>world</i>\n\n2\n00:00:03,000 --> 00:00:04,000\nBye";

    /// Uppercases whatever it receives and counts the calls
    struct UppercaseService {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl TranslationService for UppercaseService {
        async fn translate_raw(&self, text: &str, _source: &str, _target: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(text.to_uppercase())
        }

        async fn supported_languages(&self) -> Result<Vec<SupportedLanguage>> {
            Ok(Vec::new())
        }
    }

    struct Harness {
        workflow: Workflow,
        calls: Arc<AtomicUsize>,
        deferred: Arc<MemorySink>,
    }

    /// Forwards to a shared `MemorySink` so tests can inspect it afterwards
    struct SharedSink(Arc<MemorySink>);

    impl DeferredSink for SharedSink {
        fn record(&self, container: &Path) -> Result<()> {
            self.0.record(container)
        }
    }

    fn harness(tools: MockContainerTools) -> Harness {
        harness_with_delay(tools, 0)
    }

    fn harness_with_delay(tools: MockContainerTools, request_delay_ms: u64) -> Harness {
        let mut config = Config::default();
        config.translate.request_delay_ms = request_delay_ms;

        let calls = Arc::new(AtomicUsize::new(0));
        let deferred = Arc::new(MemorySink::new());
        let translator = TranslationClient::new(Box::new(UppercaseService { calls: calls.clone() }));
        let workflow = Workflow::new(
            config,
            Box::new(tools),
            translator,
            Box::new(SharedSink(deferred.clone())),
        );

        Harness { workflow, calls, deferred }
    }

    fn track(id: u64, language: &str, codec: &str) -> TrackDescriptor {
        TrackDescriptor {
            id,
            codec: codec.to_string(),
            language: Some(language.to_string()),
            name: None,
        }
    }

    #[tokio::test]
    async fn test_translate_document_preserves_markup_and_layout() {
        let h = harness(MockContainerTools::new());
        let document = SubtitleDocument::decode(SOURCE_SRT);
        assert_eq!(document.blocks.len(), 2);

        let translated = h.workflow.translate_document(&document).await;
        assert_eq!(
            translated.encode(),
            "1\n00:00:01,000 --> 00:00:02,000\nHELLO <i>WORLD</i>\n\n2\n00:00:03,000 --> 00:00:04,000\nBYE"
        );
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_opaque_blocks_are_not_translated() {
        let h = harness(MockContainerTools::new());
        let document = SubtitleDocument::decode("note\n\n1\n00:00:01,000 --> 00:00:02,000\nhi");

        let translated = h.workflow.translate_document(&document).await;
        assert_eq!(translated.encode(), "note\n\n1\n00:00:01,000 --> 00:00:02,000\nHI");
        assert_eq!(h.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_only_between_consecutive_requests() {
        let h = harness_with_delay(MockContainerTools::new(), 250);
        let document = SubtitleDocument::decode(
            "1\n00:00:01,000 --> 00:00:02,000\nOne\n\nnote\n\n\
             2\n00:00:03,000 --> 00:00:04,000\nTwo\n\n\
             3\n00:00:05,000 --> 00:00:06,000\nThree",
        );
        assert_eq!(document.cue_count(), 3);

        let started = tokio::time::Instant::now();
        let translated = h.workflow.translate_document(&document).await;
        let elapsed = started.elapsed();

        assert_eq!(translated.cue_count(), 3);
        assert_eq!(h.calls.load(Ordering::SeqCst), 3);
        // two gaps between three requests; nothing before the first or for the note
        assert!(elapsed >= Duration::from_millis(500), "elapsed {:?}", elapsed);
        assert!(elapsed < Duration::from_millis(750), "elapsed {:?}", elapsed);
    }

    #[tokio::test]
    async fn test_existing_source_skips_extraction_and_rerun_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("Film.mkv");
        std::fs::write(&container, b"").unwrap();
        std::fs::write(dir.path().join("Film.en.srt"), SOURCE_SRT).unwrap();

        let mut tools = MockContainerTools::new();
        tools.expect_subtitle_tracks().never();
        tools.expect_extract_track().never();
        let h = harness(tools);

        let first = h.workflow.process_file(&container).await;
        assert_eq!(first, FileOutcome::Translated { cues: 2 });
        let target = dir.path().join("Film.pt-BR.srt");
        assert!(std::fs::read_to_string(&target).unwrap().contains("HELLO <i>WORLD</i>"));

        let modified = std::fs::metadata(&target).unwrap().modified().unwrap();
        let second = h.workflow.process_file(&container).await;
        assert_eq!(second, FileOutcome::TargetExists);
        assert_eq!(std::fs::metadata(&target).unwrap().modified().unwrap(), modified);
        assert_eq!(h.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_extracts_first_text_track_then_translates() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("Show.S01E01.mkv");
        std::fs::write(&container, b"").unwrap();

        let mut tools = MockContainerTools::new();
        tools.expect_subtitle_tracks().times(1).returning(|_| {
            vec![
                track(0, "fr", "SubRip/SRT"),
                track(1, "eng", "HDMV PGS"),
                track(2, "eng", "SubRip/SRT"),
            ]
        });
        tools
            .expect_extract_track()
            .withf(|_, track_id, _| *track_id == 2)
            .times(1)
            .returning(|_, _, destination| {
                std::fs::write(destination, SOURCE_SRT)?;
                Ok(())
            });
        let h = harness(tools);

        let outcome = h.workflow.process_file(&container).await;
        assert_eq!(outcome, FileOutcome::Translated { cues: 2 });
        assert!(dir.path().join("Show.S01E01.en.srt").exists());
        assert!(dir.path().join("Show.S01E01.pt-BR.srt").exists());
    }

    #[tokio::test]
    async fn test_selection_outcomes_are_terminal() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("Film.mkv");

        let cases = vec![
            (vec![track(0, "en", "SubRip/SRT"), track(1, "pt-BR", "SubRip/SRT")], FileOutcome::AlreadySatisfied),
            (vec![track(0, "fr", "SubRip/SRT")], FileOutcome::NoSourceTrack),
            (Vec::new(), FileOutcome::NoSubtitleTracks),
        ];

        for (tracks, expected) in cases {
            let mut tools = MockContainerTools::new();
            tools.expect_subtitle_tracks().returning(move |_| tracks.clone());
            tools.expect_extract_track().never();
            let h = harness(tools);

            assert_eq!(h.workflow.process_file(&container).await, expected);
            assert!(h.deferred.entries().is_empty());
            assert_eq!(h.calls.load(Ordering::SeqCst), 0);
        }
    }

    #[tokio::test]
    async fn test_image_only_source_is_deferred() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("Film.mkv");

        let mut tools = MockContainerTools::new();
        tools
            .expect_subtitle_tracks()
            .returning(|_| vec![track(3, "en", "HDMV PGS")]);
        tools.expect_extract_track().never();
        let h = harness(tools);

        assert_eq!(h.workflow.process_file(&container).await, FileOutcome::DeferredImageBased);
        assert_eq!(h.deferred.entries(), vec![container.clone()]);
    }

    #[tokio::test]
    async fn test_extraction_failure_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let broken = dir.path().join("A.mkv");
        let fine = dir.path().join("B.mkv");
        std::fs::write(dir.path().join("B.en.srt"), SOURCE_SRT).unwrap();

        let mut tools = MockContainerTools::new();
        tools
            .expect_subtitle_tracks()
            .times(1)
            .returning(|_| vec![track(2, "en", "SubRip/SRT")]);
        tools
            .expect_extract_track()
            .times(1)
            .returning(|_, _, _| Err(LegendaError::Media("mkvextract exited with 2".to_string())));
        let h = harness(tools);

        let summary = h.workflow.process_files(&[broken.clone(), fine.clone()]).await;
        assert_eq!(summary.total(), 2);
        assert_eq!(summary.count("failed"), 1);
        assert_eq!(summary.count("translated"), 1);
        assert!(!dir.path().join("A.pt-BR.srt").exists());
        assert!(dir.path().join("B.pt-BR.srt").exists());
    }

    #[tokio::test]
    async fn test_process_library_twice_writes_nothing_new() {
        let temp = assert_fs::TempDir::new().unwrap();
        let root = temp.path().join("movies");
        std::fs::create_dir_all(root.join("Film")).unwrap();
        std::fs::write(root.join("Film/Film.mkv"), b"").unwrap();
        std::fs::write(root.join("Film/Film.en.srt"), SOURCE_SRT).unwrap();

        let mut tools = MockContainerTools::new();
        tools.expect_subtitle_tracks().never();
        let h = harness(tools);

        let first = h.workflow.process_library(&[root.clone()]).await;
        assert_eq!(first.count("translated"), 1);
        // one probe request plus two cues
        assert_eq!(h.calls.load(Ordering::SeqCst), 3);

        let second = h.workflow.process_library(&[root.clone()]).await;
        assert_eq!(second.count("target exists"), 1);
        assert_eq!(h.calls.load(Ordering::SeqCst), 4);
    }

    #[tokio::test]
    async fn test_unreadable_source_fails_file() {
        let dir = tempfile::tempdir().unwrap();
        let container = dir.path().join("Film.mkv");
        // a directory where the subtitle file should be
        std::fs::create_dir_all(dir.path().join("Film.en.srt")).unwrap();

        let h = harness(MockContainerTools::new());
        assert!(matches!(h.workflow.process_file(&container).await, FileOutcome::Failed(_)));
    }
}
