// PlanForge - Multi-agent floor plan generation service
// Library exports

pub mod agents; // LLM-backed generation agents (input, spatial, critic, refinement, cost, furniture)
pub mod config;
pub mod geometry; // Sectors, enrichment, name classification
pub mod jobs; // In-memory bounded job store
pub mod llm; // Structured-generation client with sanitization and fallback chain
pub mod municipal; // Static municipal regulation profiles
pub mod orchestrator; // The generate -> validate -> critique -> refine loop
pub mod plan; // Shared data model
pub mod progress; // Per-job event fan-out
pub mod router; // Agent role -> model configuration
pub mod scoring; // Weighted convergence scorer
pub mod server; // HTTP/SSE transport
pub mod validators; // Deterministic regulatory and Vastu validators
