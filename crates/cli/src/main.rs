mod settings;

use std::io::Write;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use crossbeam_channel::RecvTimeoutError;

use transcribe_core::presentation::job_list_view::JobListView;
use transcribe_core::presentation::results_view::ResultsView;
use transcribe_core::presentation::text_renderer::TextRenderer;
use transcribe_core::query::infrastructure::poll_worker::PollWorker;
use transcribe_core::query::job_poller::{JobPoller, PollPolicy, PollState};
use transcribe_core::query::query_cache::QueryCache;
use transcribe_core::query::transcription_queries::TranscriptionQueries;
use transcribe_core::transcription::domain::job::JobStatus;
use transcribe_core::transcription::domain::transcription_api::{
    ExportFormat, ProgressFn, UploadOptions,
};
use transcribe_core::transcription::infrastructure::http_transcription_api::{
    HttpApiConfig, HttpTranscriptionApi,
};
use transcribe_core::workflow::edit_segments_use_case::{EditSegmentsUseCase, SegmentEdit};
use transcribe_core::workflow::export_use_case::{default_export_path, ExportUseCase};
use transcribe_core::workflow::upload_request::upload_options;
use transcribe_core::workflow::upload_use_case::UploadUseCase;

use settings::{Settings, API_URL_ENV};

/// Upload audio or video for transcription and read the results.
#[derive(Parser)]
#[command(name = "transcribe", version)]
struct Cli {
    /// Base URL of the transcription service.
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Disable ANSI colors.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args)]
struct SubmitArgs {
    /// Language hint (en, es, fr, de).
    #[arg(long)]
    language: Option<String>,

    /// Attribute segments to speakers.
    #[arg(long)]
    detect_speakers: bool,

    /// Return after submitting instead of following the job.
    #[arg(long)]
    no_watch: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a local audio or video file.
    Upload {
        file: PathBuf,
        #[command(flatten)]
        submit: SubmitArgs,
    },
    /// Submit a remote media URL.
    UploadUrl {
        url: String,
        #[command(flatten)]
        submit: SubmitArgs,
    },
    /// List all transcriptions.
    List,
    /// Show a transcription, following it until it finishes.
    Show {
        id: String,
        /// Render the current state once and exit.
        #[arg(long)]
        once: bool,
    },
    /// Replace the text of completed segments.
    Edit {
        id: String,
        /// SEGMENT_ID=TEXT, repeatable.
        #[arg(long = "set", required = true)]
        edits: Vec<SegmentEdit>,
    },
    /// Download a transcript as txt, docx or srt.
    Export {
        id: String,
        #[arg(long)]
        format: ExportFormat,
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Delete a transcription.
    Delete { id: String },
}

struct App {
    queries: TranscriptionQueries,
    renderer: TextRenderer,
    settings: Settings,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let settings = load_settings();

    let env_url = std::env::var(API_URL_ENV).ok();
    let api_url = settings.resolve_api_url(cli.api_url.as_deref(), env_url.as_deref());

    let config = HttpApiConfig::new(&api_url).with_timeout(settings.request_timeout());
    let api = Arc::new(HttpTranscriptionApi::new(config)?);
    log::debug!("using transcription service at {}", api.base_url());
    let app = App {
        queries: TranscriptionQueries::new(api, Arc::new(QueryCache::new())),
        renderer: TextRenderer::new(settings.color && !cli.no_color),
        settings,
    };

    match cli.command {
        Command::Upload { file, submit } => {
            let options = app.submit_options(&submit)?;
            let renderer = app.renderer;
            let progress: ProgressFn = Box::new(move |percent| {
                eprint!("\r{}", renderer.render_upload_progress(percent));
                let _ = std::io::stderr().flush();
            });
            let id = UploadUseCase::new(app.queries.clone()).submit_file(
                &file,
                &options,
                Some(progress),
            )?;
            eprintln!();
            app.after_submit(&id, submit.no_watch)
        }
        Command::UploadUrl { url, submit } => {
            let options = app.submit_options(&submit)?;
            let id = UploadUseCase::new(app.queries.clone()).submit_url(&url, &options)?;
            app.after_submit(&id, submit.no_watch)
        }
        Command::List => {
            let view = JobListView::from_result(&app.queries.list_jobs());
            print!("{}", app.renderer.render_job_list(&view));
            match view {
                JobListView::Error { .. } => Err("could not load transcriptions".into()),
                _ => Ok(()),
            }
        }
        Command::Show { id, once } => app.show(&id, once),
        Command::Edit { id, edits } => {
            let job = EditSegmentsUseCase::new(app.queries.clone()).execute(&id, &edits)?;
            println!("Updated {} segment(s) of {}", edits.len(), job.file_name);
            Ok(())
        }
        Command::Export { id, format, output } => {
            let output = match output {
                Some(path) => path,
                None => {
                    let job = app.queries.fetch_job(&id)?;
                    default_export_path(&job.file_name, &id, format)
                }
            };
            let bytes = ExportUseCase::new(app.queries.clone()).execute(&id, format, &output)?;
            println!("Wrote {bytes} bytes to {}", output.display());
            Ok(())
        }
        Command::Delete { id } => {
            app.queries.delete_job(&id)?;
            println!("Deleted transcription {id}");
            Ok(())
        }
    }
}

fn load_settings() -> Settings {
    let settings = Settings::load();
    if Settings::config_path().is_some_and(|path| !path.exists()) {
        settings.save();
    }
    settings
}

impl App {
    fn submit_options(&self, submit: &SubmitArgs) -> Result<UploadOptions, Box<dyn std::error::Error>> {
        let language = submit.language.as_deref().unwrap_or(&self.settings.language);
        let detect_speakers = submit.detect_speakers || self.settings.detect_speakers;
        Ok(upload_options(Some(language), detect_speakers)?)
    }

    fn after_submit(&self, id: &str, no_watch: bool) -> Result<(), Box<dyn std::error::Error>> {
        println!("Submitted transcription {id}");
        if no_watch {
            return Ok(());
        }
        self.show(id, false)
    }

    /// Renders the job on every change until it reaches a final view.
    fn show(&self, id: &str, once: bool) -> Result<(), Box<dyn std::error::Error>> {
        let interval = self.settings.poll_interval();
        let poller = JobPoller::new(self.queries.clone(), Some(id), PollPolicy::new(interval));
        let worker = PollWorker::spawn(poller);
        let mut shown: Option<ResultsView> = None;

        loop {
            let state = match worker.updates().recv_timeout(interval) {
                Ok(state) => state,
                Err(RecvTimeoutError::Timeout) => {
                    // Pending jobs are not polled on a schedule; ask again.
                    if matches!(shown, Some(ResultsView::Pending { .. })) {
                        worker.refetch();
                    }
                    continue;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            let view = ResultsView::from_state(&state);
            if shown.as_ref() != Some(&view) {
                print!("{}", self.renderer.render_results(&view));
                let _ = std::io::stdout().flush();
            }

            if view == ResultsView::Loading {
                shown = Some(view);
                continue;
            }
            if once || view.is_final() {
                break;
            }
            if let PollState::Error { last, .. } = &state {
                let still_processing = last
                    .as_ref()
                    .is_some_and(|job| job.status == JobStatus::Processing);
                if !still_processing {
                    worker.stop();
                    return Err("could not load transcription".into());
                }
            }
            shown = Some(view);
        }

        worker.stop();
        Ok(())
    }
}
