use crate::call_site::CallSite;
use crate::config::WeaverConfig;
use crate::diagnostics::{Diagnostic, DiagnosticSink};
use crate::emit::{Emitter, GeneratedFile, dedupe};
use crate::error::Result;
use crate::model::Compilation;
use crate::validate::{Assessment, Validator, Verdict, check_configuration, check_marker_targets};
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct GeneratorOutput {
    pub file: Option<GeneratedFile>,
    /// Distinct rewritten call sites
    pub call_sites: Vec<CallSite>,
    pub diagnostics_reported: usize,
}

/// Whole-unit weaving driver
pub struct WeavingGenerator {
    config: WeaverConfig,
}

impl WeavingGenerator {
    pub fn new(config: WeaverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &WeaverConfig {
        &self.config
    }

    pub fn run(&self, compilation: &Compilation, sink: &dyn DiagnosticSink) -> Result<GeneratorOutput> {
        let Some(marker_base) = compilation.type_by_path(&self.config.marker_base) else {
            tracing::info!(marker_base = %self.config.marker_base, "marker base not in unit, nothing to weave");
            return Ok(GeneratorOutput {
                file: None,
                call_sites: Vec::new(),
                diagnostics_reported: 0,
            });
        };

        let mut reported = 0;
        let mut report = |diagnostic: Diagnostic| {
            tracing::warn!(
                code = diagnostic.classification.code(),
                location = %diagnostic.location,
                subject = %diagnostic.subject,
                "{}",
                diagnostic.classification
            );
            sink.report(diagnostic);
            reported += 1;
        };

        for diagnostic in check_marker_targets(compilation, marker_base) {
            report(diagnostic);
        }
        for diagnostic in check_configuration(compilation, &self.config.bounds) {
            report(diagnostic);
        }

        let validator = Validator::new(compilation, &self.config, marker_base);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.analysis_threads.max(1))
            .thread_name(|index| format!("aspectweave-analysis-{index}"))
            .build()?;

        // Results keep invocation order, which keeps call-site ids stable
        let assessments: Vec<Assessment> = pool.install(|| {
            compilation
                .invocations
                .par_iter()
                .map(|invocation| {
                    let assessment = validator.validate(invocation)?;
                    tracing::debug!(
                        location = %invocation.location,
                        method = %compilation.method_path(invocation.method),
                        verdict = verdict_name(&assessment.verdict),
                        "analysed invocation"
                    );
                    Ok(assessment)
                })
                .collect::<Result<Vec<_>>>()
        })?;

        let mut targets = Vec::new();
        for assessment in assessments {
            for note in assessment.notes {
                report(note);
            }
            match assessment.verdict {
                Verdict::Rewrite(site) => targets.push(site),
                Verdict::Unmodified(diagnostic) | Verdict::Skip(diagnostic) => report(diagnostic),
                Verdict::NotWoven => {}
            }
        }

        let file = Emitter::new(&self.config).emit(compilation, &targets)?;
        let call_sites: Vec<CallSite> = dedupe(&targets).into_iter().cloned().collect();

        tracing::info!(
            invocations = compilation.invocations.len(),
            rewritten = call_sites.len(),
            diagnostics = reported,
            methods_analysed = validator.cache().len(),
            "weaving finished"
        );

        Ok(GeneratorOutput {
            file,
            call_sites,
            diagnostics_reported: reported,
        })
    }
}

impl Default for WeavingGenerator {
    fn default() -> Self {
        Self::new(WeaverConfig::default())
    }
}

fn verdict_name(verdict: &Verdict) -> &'static str {
    match verdict {
        Verdict::Rewrite(_) => "rewrite",
        Verdict::Unmodified(_) => "unmodified",
        Verdict::Skip(_) => "skip",
        Verdict::NotWoven => "not_woven",
    }
}
