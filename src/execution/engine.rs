//! Pipeline engine - runs research then write for one brief

use crate::{
    agent::{CapabilityClientConfig, GroqClient, SearchProvider, TavilyClient, TextGenerator},
    core::{
        audit_citations, config::ImageConfig, ArticleDraft, Brief, Credentials, ExecutionStatus,
        NewsroomConfig, PipelineState, Stage,
    },
    execution::{
        image::ImageLocator,
        research::{ResearchStep, DEFAULT_MAX_RESULTS},
        writer::WriterStep,
        PipelineError,
    },
};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Events that can occur during a pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionEvent {
    PipelineStarted {
        run_id: Uuid,
        topic: String,
    },
    StageStarted {
        run_id: Uuid,
        stage: Stage,
    },
    StageCompleted {
        run_id: Uuid,
        stage: Stage,
    },
    StageFailed {
        run_id: Uuid,
        stage: Stage,
        error: String,
    },
    PipelineCompleted {
        run_id: Uuid,
        status: ExecutionStatus,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Tunables for the research stage
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    pub max_results: usize,
    pub image: ImageConfig,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            max_results: DEFAULT_MAX_RESULTS,
            image: ImageConfig::default(),
        }
    }
}

impl PipelineOptions {
    pub fn from_config(config: &NewsroomConfig) -> Self {
        Self {
            max_results: config.search.max_results,
            image: config.image.clone(),
        }
    }
}

/// Engine with boxed capabilities, as shared by the HTTP server
pub type DynPipelineEngine = PipelineEngine<Arc<dyn SearchProvider>, Arc<dyn TextGenerator>>;

/// Runs `research -> write` with no branching
///
/// Capabilities are injected at construction; the engine holds no
/// per-run state, so one instance serves concurrent runs.
pub struct PipelineEngine<S, G> {
    research: ResearchStep<S>,
    writer: WriterStep<G>,
    event_handlers: Vec<EventHandler>,
}

impl<S: SearchProvider, G: TextGenerator> PipelineEngine<S, G> {
    pub fn new(search: S, generator: G, options: PipelineOptions) -> Self {
        Self {
            research: ResearchStep::new(
                search,
                ImageLocator::new(options.image),
                options.max_results,
            ),
            writer: WriterStep::new(generator),
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit_event(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    fn stage_failed(&self, run_id: Uuid, stage: Stage, err: PipelineError) -> PipelineError {
        error!("Run {} failed in {} stage: {}", run_id, stage, err);
        self.emit_event(ExecutionEvent::StageFailed {
            run_id,
            stage,
            error: err.to_string(),
        });
        self.emit_event(ExecutionEvent::PipelineCompleted {
            run_id,
            status: ExecutionStatus::Failed,
        });
        err
    }

    /// Run both stages for `brief`
    ///
    /// Either every field of the draft is filled or an error is returned.
    /// A research failure aborts the run before the writer is called.
    pub async fn invoke(&self, brief: Brief) -> Result<ArticleDraft, PipelineError> {
        brief.validate().map_err(PipelineError::InvalidBrief)?;

        let state = PipelineState::new(brief);
        let run_id = state.run_id();
        info!("Starting pipeline run {} for topic: {}", run_id, state.brief().topic);
        self.emit_event(ExecutionEvent::PipelineStarted {
            run_id,
            topic: state.brief().topic.clone(),
        });

        self.emit_event(ExecutionEvent::StageStarted {
            run_id,
            stage: Stage::Research,
        });
        let research = match self.research.research(&state.brief().topic).await {
            Ok(research) => research,
            Err(e) => return Err(self.stage_failed(run_id, Stage::Research, e)),
        };
        self.emit_event(ExecutionEvent::StageCompleted {
            run_id,
            stage: Stage::Research,
        });
        let state = state.with_research(research);

        self.emit_event(ExecutionEvent::StageStarted {
            run_id,
            stage: Stage::Write,
        });
        let article = match self.writer.write(&state).await {
            Ok(article) => article,
            Err(e) => return Err(self.stage_failed(run_id, Stage::Write, e)),
        };
        self.emit_event(ExecutionEvent::StageCompleted {
            run_id,
            stage: Stage::Write,
        });
        let state = state.with_article(article);

        let citations = audit_citations(state.article(), state.sources().len());
        if !citations.is_consistent() {
            warn!(
                "Run {} cites markers {:?} but has only {} sources",
                run_id,
                citations.out_of_range,
                state.sources().len()
            );
        }

        info!("Pipeline run {} completed", run_id);
        self.emit_event(ExecutionEvent::PipelineCompleted {
            run_id,
            status: ExecutionStatus::Completed,
        });

        Ok(state.into_output())
    }
}

impl PipelineEngine<TavilyClient, GroqClient> {
    /// Build the engine against the real HTTP capabilities
    pub fn from_config(
        config: &NewsroomConfig,
        credentials: &Credentials,
    ) -> Result<Self, PipelineError> {
        let (search, generator) = http_capabilities(config, credentials)?;
        Ok(Self::new(search, generator, PipelineOptions::from_config(config)))
    }
}

/// Construct the HTTP search and generation clients
pub fn http_capabilities(
    config: &NewsroomConfig,
    credentials: &Credentials,
) -> Result<(TavilyClient, GroqClient), PipelineError> {
    let to_config_error = |e: crate::agent::CapabilityError| {
        PipelineError::Configuration(crate::core::ConfigError::Invalid(e.to_string()))
    };

    let search = TavilyClient::new(CapabilityClientConfig::for_search(
        &config.search,
        credentials.search_api_key.clone(),
    ))
    .map_err(to_config_error)?;

    let generator = GroqClient::new(
        CapabilityClientConfig::for_llm(&config.llm, credentials.llm_api_key.clone()),
        &config.llm,
    )
    .map_err(to_config_error)?;

    Ok((search, generator))
}
