//! Outcomes of best-effort work attached to a primary operation.

use std::fmt::Display;
use std::future::Future;

use serde::Serialize;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SideEffectOutcome {
    pub name: &'static str,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Collects side-effect outcomes separately from the primary result.
/// Failures are logged and recorded, never propagated.
#[derive(Debug, Default, Clone, Serialize)]
pub struct SideEffects {
    outcomes: Vec<SideEffectOutcome>,
}

impl SideEffects {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn run<F, E>(&mut self, name: &'static str, effect: F)
    where
        F: Future<Output = Result<(), E>>,
        E: Display,
    {
        let outcome = match effect.await {
            Ok(()) => SideEffectOutcome {
                name,
                ok: true,
                error: None,
            },
            Err(e) => {
                warn!(side_effect = name, "best-effort side effect failed: {e}");
                SideEffectOutcome {
                    name,
                    ok: false,
                    error: Some(e.to_string()),
                }
            }
        };
        self.outcomes.push(outcome);
    }

    /// Records an effect that was deliberately not attempted.
    pub fn skip(&mut self, name: &'static str, reason: &str) {
        self.outcomes.push(SideEffectOutcome {
            name,
            ok: false,
            error: Some(format!("skipped: {reason}")),
        });
    }

    #[cfg(test)]
    pub fn outcomes(&self) -> &[SideEffectOutcome] {
        &self.outcomes
    }

    pub fn failures(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.ok).count()
    }
}
