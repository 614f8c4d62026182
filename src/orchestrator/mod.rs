// Design orchestrator
//
// Drives one generation run end to end: normalize, generate, then iterate
// validate -> critique -> score -> refine until the weighted score crosses
// the convergence threshold or the iteration cap is hit. Cost and furniture
// run as post-passes. Every step emits progress events through the hub and
// keeps the job record current; cancellation is checked between steps.

mod assemble;

pub use assemble::assemble_plan;

use std::sync::Arc;

use crate::agents::{
    AgentError, AgentMetadata, CostAgent, CriticAgent, FurnitureAgent, InputAgent, RefinementAgent,
    SpatialAgent,
};
use crate::config::constants::DEFAULT_MAX_ITERATIONS;
use crate::geometry::AreaTotals;
use crate::jobs::{CompletedRun, JobStore};
use crate::llm::StructuredGenerator;
use crate::plan::{CostRange, FloorPlanGraph, IterationRecord, ProjectConfig, ValidationReport};
use crate::progress::{ProgressEvent, ProgressHub};
use crate::scoring::{score_plan, DEFAULT_THRESHOLD};
use crate::validators::{validate_regulatory, validate_vastu};

/// Orchestrator tunables, overridable from the environment.
#[derive(Debug, Clone, Copy)]
pub struct OrchestratorSettings {
    pub max_iterations: u32,
    pub score_threshold: f64,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            max_iterations: DEFAULT_MAX_ITERATIONS,
            score_threshold: DEFAULT_THRESHOLD,
        }
    }
}

pub struct Orchestrator {
    input: InputAgent,
    spatial: SpatialAgent,
    critic: CriticAgent,
    refinement: RefinementAgent,
    cost: CostAgent,
    furniture: FurnitureAgent,
    jobs: JobStore,
    hub: ProgressHub,
    settings: OrchestratorSettings,
}

impl Orchestrator {
    pub fn new(
        model: Arc<dyn StructuredGenerator>,
        jobs: JobStore,
        hub: ProgressHub,
        settings: OrchestratorSettings,
    ) -> Self {
        Self {
            input: InputAgent::new(Arc::clone(&model)),
            spatial: SpatialAgent::new(Arc::clone(&model)),
            critic: CriticAgent::new(Arc::clone(&model)),
            refinement: RefinementAgent::new(Arc::clone(&model)),
            cost: CostAgent::new(Arc::clone(&model)),
            furniture: FurnitureAgent::new(model),
            jobs,
            hub,
            settings,
        }
    }

    /// Run a full generation pass for an already-created job. Never panics;
    /// all failures end in a failed job record plus a terminal error event.
    pub async fn run(&self, job_id: &str, config: ProjectConfig) {
        self.jobs.set_running(job_id).await;

        match self.run_inner(job_id, &config).await {
            Ok(run) => {
                tracing::info!(job_id, score = run.final_score, "Generation run completed");
                let event = ProgressEvent::Completed {
                    final_plan: run.final_plan.clone(),
                    final_score: run.final_score,
                    converged: run.converged,
                    iteration_count: run.iteration_count,
                };
                self.jobs.complete(job_id, run).await;
                self.hub.finish(job_id, event).await;
            }
            Err(error) => {
                let message = error.to_string();
                tracing::error!(job_id, %message, "Generation run failed");
                self.jobs.fail(job_id, &message).await;
                self.hub.finish(job_id, ProgressEvent::Error { message }).await;
            }
        }
    }

    async fn run_inner(
        &self,
        job_id: &str,
        config: &ProjectConfig,
    ) -> Result<CompletedRun, AgentError> {
        let max_iterations = self.settings.max_iterations.max(1);
        let floor_count = config.floor_count();

        // Phase 1: normalize the configuration
        self.check_cancelled(job_id).await?;
        self.agent_started(job_id, "input", "normalizing").await;
        let input_out = self.input.execute(config).await?;
        self.agent_completed(job_id, &input_out.metadata).await;
        let spec = input_out.data;

        // Phase 2: initial plan
        self.check_cancelled(job_id).await?;
        self.agent_started(job_id, "spatial", "generating").await;
        let spatial_out = self.spatial.execute(&spec).await?;
        self.agent_completed(job_id, &spatial_out.metadata).await;
        let mut plan = spatial_out.data;

        // Phase 3: iteration loop
        let mut records: Vec<IterationRecord> = Vec::new();
        let mut converged = false;

        for iteration in 1..=max_iterations {
            self.check_cancelled(job_id).await?;
            self.jobs
                .update(job_id, |job| {
                    job.progress.phase = "validating".to_string();
                    job.progress.iteration = iteration;
                })
                .await;
            self.emit(
                job_id,
                ProgressEvent::IterationStart {
                    iteration,
                    max_iterations,
                },
            )
            .await;

            let (regulatory, cultural) = self.validate(job_id, &plan, &spec, floor_count).await;

            self.check_cancelled(job_id).await?;
            self.agent_started(job_id, "critic", "critiquing").await;
            let critic_out = self.critic.execute(&plan, &regulatory, &cultural).await?;
            self.agent_completed(job_id, &critic_out.metadata).await;
            let critique = critic_out.data;

            self.jobs
                .update(job_id, |job| job.progress.phase = "scoring".to_string())
                .await;
            let score = score_plan(
                regulatory.score,
                cultural.score,
                critique.spatial_efficiency,
                critique.overall_confidence,
                self.settings.score_threshold,
            );
            self.emit(
                job_id,
                ProgressEvent::ScoreUpdate {
                    iteration,
                    final_score: score.final_score,
                    breakdown: score.breakdown.clone(),
                    passes_threshold: score.passes_threshold,
                },
            )
            .await;

            let passes = score.passes_threshold;
            records.push(IterationRecord {
                iteration,
                plan: plan.clone(),
                regulatory,
                cultural,
                critique,
                score,
            });

            if passes {
                converged = true;
                break;
            }

            if iteration < max_iterations {
                self.check_cancelled(job_id).await?;
                self.agent_started(job_id, "refinement", "refining").await;
                let record = records.last().expect("iteration just recorded");
                let refined = self
                    .refinement
                    .execute(&plan, &spec, &record.regulatory, &record.cultural, &record.critique)
                    .await?;
                self.agent_completed(job_id, &refined.metadata).await;
                plan = refined.data;
            }
        }

        // Phase 4: cost estimation (recovered locally on failure)
        self.check_cancelled(job_id).await?;
        self.agent_started(job_id, "cost", "costing").await;
        let (bom, cost_range, cost_error) = match self.cost.execute(&plan, &spec).await {
            Ok(out) => {
                self.agent_completed(job_id, &out.metadata).await;
                (out.data.bom, out.data.total_cost_range, None)
            }
            Err(e) => {
                tracing::warn!(job_id, "Cost agent failed, continuing with empty BOM: {e}");
                (Vec::new(), CostRange::zero(), Some(e.to_string()))
            }
        };

        // Phase 5: furniture, best effort
        self.check_cancelled(job_id).await?;
        self.agent_started(job_id, "furniture", "furnishing").await;
        let furniture = match self.furniture.execute(&plan.rooms).await {
            Ok(out) => {
                self.agent_completed(job_id, &out.metadata).await;
                Some(out.data)
            }
            Err(e) => {
                tracing::warn!(job_id, "Furniture agent failed, plan ships unfurnished: {e}");
                None
            }
        };

        // Phase 6: assembly
        self.jobs
            .update(job_id, |job| job.progress.phase = "assembling".to_string())
            .await;
        let record = records.last().expect("at least one iteration always runs");
        let final_plan = assemble_plan(
            &plan,
            record,
            bom,
            cost_range,
            cost_error,
            furniture,
            floor_count,
        );

        Ok(CompletedRun {
            final_score: record.score.final_score,
            converged,
            iteration_count: records.len() as u32,
            final_plan,
        })
    }

    /// Run both deterministic validators and emit their violation updates.
    async fn validate(
        &self,
        job_id: &str,
        plan: &FloorPlanGraph,
        spec: &crate::plan::NormalizedSpec,
        floor_count: u32,
    ) -> (ValidationReport, ValidationReport) {
        let totals = AreaTotals {
            total: plan.total_area,
            built_up: plan.built_up_area,
            circulation: plan.circulation_area,
            setback: plan.setback_area,
            outdoor: plan.outdoor_area,
            coverage_ratio: plan.plot_coverage_ratio,
        };

        let regulatory = validate_regulatory(
            &plan.rooms,
            &spec.plot,
            &spec.municipal,
            &spec.municipal.setbacks,
            floor_count,
            &totals,
        );
        self.emit(
            job_id,
            ProgressEvent::ViolationUpdate {
                regulatory_violations: Some(regulatory.violations.clone()),
                regulatory_score: Some(regulatory.score),
                vastu_violations: None,
                vastu_score: None,
            },
        )
        .await;

        let cultural = validate_vastu(&plan.rooms, &spec.plot, spec.strictness);
        self.emit(
            job_id,
            ProgressEvent::ViolationUpdate {
                regulatory_violations: None,
                regulatory_score: None,
                vastu_violations: Some(cultural.violations.clone()),
                vastu_score: Some(cultural.score),
            },
        )
        .await;

        (regulatory, cultural)
    }

    async fn check_cancelled(&self, job_id: &str) -> Result<(), AgentError> {
        if self.jobs.is_cancel_requested(job_id).await {
            Err(AgentError::Cancelled)
        } else {
            Ok(())
        }
    }

    async fn emit(&self, job_id: &str, event: ProgressEvent) {
        self.hub.broadcast(job_id, event).await;
    }

    async fn agent_started(&self, job_id: &str, agent: &str, phase: &str) {
        let agent_name = agent.to_string();
        let phase_name = phase.to_string();
        self.jobs
            .update(job_id, move |job| {
                job.progress.phase = phase_name;
                job.progress.current_agent = Some(agent_name);
            })
            .await;
        self.emit(
            job_id,
            ProgressEvent::AgentStart {
                agent: agent.to_string(),
            },
        )
        .await;
    }

    async fn agent_completed(&self, job_id: &str, metadata: &AgentMetadata) {
        if metadata.was_rerouted() {
            self.emit(
                job_id,
                ProgressEvent::MoeRouting {
                    agent: metadata.agent.to_string(),
                    requested: metadata.requested_model.clone(),
                    used: metadata.model_used.clone(),
                },
            )
            .await;
        }
        self.emit(
            job_id,
            ProgressEvent::AgentComplete {
                agent: metadata.agent.to_string(),
                model: metadata.model_used.clone(),
                duration_ms: metadata.duration_ms,
                token_count: metadata.token_count,
            },
        )
        .await;
        self.jobs
            .update(job_id, |job| job.progress.current_agent = None)
            .await;
    }
}
