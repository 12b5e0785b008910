//! Section-by-section replacement of named blocks.

use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tokio::fs;
use tracing::{debug, info, instrument, warn};

use crate::domain::models::{
    ExecutionState, OperationRequest, OutcomeDetails, Section, SectionResult, StrategyKind,
    StrategyOutcome,
};
use crate::domain::{ApplyError, Strategy};
use crate::services::structure::{find_sections, section_span};

/// Replaces each named block of the live file with its counterpart from the
/// proposed content.
///
/// Stops at the first section that cannot be replaced. Succeeds when at
/// least one section was replaced; `fully_applied` in the outcome tells
/// whether every discovered section made it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextScopedStrategy;

impl ContextScopedStrategy {
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Strategy for ContextScopedStrategy {
    fn kind(&self) -> StrategyKind {
        StrategyKind::ContextScoped
    }

    #[instrument(skip_all, fields(run_id = %state.run_id))]
    async fn attempt(
        &self,
        request: &OperationRequest,
        state: &mut ExecutionState,
    ) -> Result<StrategyOutcome> {
        let Some(new_content) = request.non_empty_content() else {
            return Ok(StrategyOutcome::failure(
                self.kind(),
                ApplyError::MissingContent.to_string(),
            ));
        };

        let sections = find_sections(new_content);
        if sections.is_empty() {
            warn!("Could not extract relevant context");
            return Ok(StrategyOutcome::failure(
                self.kind(),
                ApplyError::NoSections.to_string(),
            ));
        }
        info!(sections = sections.len(), "Identified relevant sections");

        let mut results = Vec::with_capacity(sections.len());
        for section in &sections {
            info!(kind = %section.kind, name = %section.name, "Processing section");

            let fragment = match section_span(new_content, section) {
                Ok(Some(span)) => &new_content[span],
                Ok(None) => {
                    debug!(name = %section.name, "No fragment located, skipping");
                    continue;
                }
                Err(err) => {
                    results.push(section_result(section, Err(ApplyError::from(err))));
                    break;
                }
            };

            let result = replace_section(&request.path, section, fragment).await;
            let failed = result.is_err();
            results.push(section_result(section, result));
            if failed {
                break;
            }
        }

        let sections_modified = results.iter().filter(|r| r.success).count();
        let details = OutcomeDetails::ContextScoped {
            sections_total: sections.len(),
            sections_attempted: results.len(),
            sections_modified,
            fully_applied: sections_modified == sections.len(),
            sections: results,
        };

        if sections_modified == 0 {
            return Ok(StrategyOutcome::failure(
                self.kind(),
                "Context-scoped replacement failed for all sections",
            )
            .with_details(details));
        }
        Ok(StrategyOutcome::success(self.kind()).with_details(details))
    }
}

fn section_result(section: &Section, result: Result<(), ApplyError>) -> SectionResult {
    let error = result.err().map(|err| {
        warn!(name = %section.name, error = %err, "Section replacement failed");
        err.to_string()
    });
    SectionResult {
        kind: section.kind.clone(),
        name: section.name.clone(),
        success: error.is_none(),
        error,
    }
}

/// Swap the section's span in the current file for `fragment`
async fn replace_section(path: &Path, section: &Section, fragment: &str) -> Result<(), ApplyError> {
    let current = fs::read_to_string(path)
        .await
        .map_err(|e| ApplyError::read(path, e))?;

    let span = section_span(&current, section)?
        .ok_or_else(|| ApplyError::SectionNotFound(section.name.clone()))?;

    let mut updated = String::with_capacity(current.len() + fragment.len());
    updated.push_str(&current[..span.start]);
    updated.push_str(fragment);
    updated.push_str(&current[span.end..]);

    fs::write(path, updated)
        .await
        .map_err(|e| ApplyError::write(path, e))
}
