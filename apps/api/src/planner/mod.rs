// Learning planner: validates the role/skills form, runs the two-stage
// gap-analysis → 30-day-plan chain, and memoizes the last plan per session.
// All model calls go through llm_client — no direct HTTP calls here.

pub mod chain;
pub mod export;
pub mod handlers;
pub mod memo;
pub mod prompts;
pub mod session;
pub mod skills;
pub mod template;
