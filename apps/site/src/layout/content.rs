//! Built-in promotional documents served as PDFs.

use std::collections::HashMap;

use anyhow::{Context, Result};

use crate::layout::document::{DocumentSpec, FrontMatter, Section};

const FOOTER: &str = "Gatehouse \u{2014} permits, policy and receipts for AI agents | gatehouse.dev";
const CLOSING: &str = "Want to go deeper? Request a design-partner slot at gatehouse.dev/apply \
                       or write to hello@gatehouse.dev.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Primer,
    Whitepaper,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 2] = [DocumentKind::Primer, DocumentKind::Whitepaper];

    /// File name used in `Content-Disposition`.
    pub fn filename(&self) -> &'static str {
        match self {
            DocumentKind::Primer => "gatehouse-primer.pdf",
            DocumentKind::Whitepaper => "gatehouse-whitepaper.pdf",
        }
    }

    pub fn spec(&self) -> DocumentSpec {
        match self {
            DocumentKind::Primer => primer(),
            DocumentKind::Whitepaper => whitepaper(),
        }
    }
}

/// Documents validated once at startup.
#[derive(Debug, Clone)]
pub struct DocumentLibrary {
    docs: HashMap<DocumentKind, DocumentSpec>,
}

impl DocumentLibrary {
    pub fn load() -> Result<Self> {
        let mut docs = HashMap::new();
        for kind in DocumentKind::ALL {
            let spec = kind.spec();
            spec.validate()
                .with_context(|| format!("built-in document {} is malformed", kind.filename()))?;
            docs.insert(kind, spec);
        }
        Ok(Self { docs })
    }

    pub fn get(&self, kind: DocumentKind) -> Option<&DocumentSpec> {
        self.docs.get(&kind)
    }

    #[cfg(test)]
    pub(crate) fn empty() -> Self {
        Self {
            docs: HashMap::new(),
        }
    }
}

fn primer() -> DocumentSpec {
    DocumentSpec {
        front: FrontMatter {
            title: "The Agent Permission Primer".into(),
            subtitle: "What changes when software agents act on production systems, and how to keep them inside the lines.".into(),
            footer: FOOTER.into(),
            closing: CLOSING.into(),
        },
        sections: vec![
            Section::new("Why agents need permits")
                .paragraph(
                    "Service accounts were designed for code that does the same thing every time. \
                     Agents plan their own steps, pick their own tools and improvise when a call \
                     fails. Long-lived credentials give that improvisation the full blast radius \
                     of whatever the account can reach.",
                )
                .paragraph(
                    "A permit is a narrow, short-lived grant tied to one task. It names the \
                     resources, the actions and the time window, and it expires on its own.",
                ),
            Section::new("Three building blocks")
                .bullet("Permits: scoped grants issued per task, never per agent.")
                .bullet("Policy: declarative rules evaluated before every privileged call.")
                .bullet("Receipts: signed records of each decision, replayable by auditors."),
            Section::new("A day in the life of a permit")
                .paragraph(
                    "An agent asks to rotate a database credential. Policy checks the requester, \
                     the environment and the change window, then issues a permit valid for ten \
                     minutes against one secret path. The agent performs the rotation, the permit \
                     lapses, and a receipt records who asked, what was allowed and what happened.",
                )
                .bullet("Request: the agent declares intent and the resources it needs.")
                .bullet("Decision: policy allows, narrows or denies the request.")
                .bullet("Execution: calls outside the permit are rejected at the gateway.")
                .bullet("Evidence: the receipt chain links the request to every call made under it."),
            Section::new("Getting started")
                .paragraph(
                    "Start with read-only permits for your highest-traffic agent, turn on receipts, \
                     and review a week of decisions before tightening policy. Most teams find a \
                     handful of rules cover the majority of requests.",
                ),
        ],
    }
}

fn whitepaper() -> DocumentSpec {
    DocumentSpec {
        front: FrontMatter {
            title: "Verifiable Authority for Autonomous Agents".into(),
            subtitle: "A technical overview of the Gatehouse permit model, policy engine and receipt ledger.".into(),
            footer: FOOTER.into(),
            closing: CLOSING.into(),
        },
        sections: vec![
            Section::new("Abstract").paragraph(
                "Autonomous agents increasingly hold credentials to systems where mistakes are \
                 expensive. We describe an authorization layer that replaces standing access with \
                 per-task permits, evaluates every privileged call against declarative policy, and \
                 emits tamper-evident receipts so that any decision can be independently verified \
                 after the fact.",
            ),
            Section::new("Threat model")
                .paragraph(
                    "We assume the agent may be manipulated through its inputs, may misinterpret \
                     instructions, and may retry aggressively. We do not assume the agent is \
                     malicious by construction, but we do not trust its account of what it did.",
                )
                .bullet("Prompt injection steering an agent toward unintended resources.")
                .bullet("Credential leakage through logs, traces or tool output.")
                .bullet("Privilege creep as agents accumulate scopes over time.")
                .bullet("Repudiation: no reliable record of which agent performed which action."),
            Section::new("Permit model")
                .paragraph(
                    "A permit binds a subject, a set of resource patterns, a set of actions and a \
                     validity window. Permits are issued by the policy engine, never minted by the \
                     agent, and are bound to the task identifier that requested them.",
                )
                .paragraph(
                    "Narrowing is monotonic: a permit can be exchanged for a strictly smaller one \
                     for delegation to a sub-agent, but never widened without a fresh decision.",
                ),
            Section::new("Policy evaluation")
                .paragraph(
                    "Policies are written as ordered rules over request attributes. Evaluation is \
                     deterministic and side-effect free, which makes decisions reproducible from \
                     the receipt alone.",
                )
                .bullet("Default deny: requests that match no rule are refused.")
                .bullet("Explicit conditions on environment, time window and requester identity.")
                .bullet("Human approval hooks for actions above a configurable risk threshold."),
            Section::new("Receipts")
                .paragraph(
                    "Every decision produces a receipt containing the request, the matched rule, \
                     the resulting permit and a hash of the previous receipt. The chain is signed \
                     at regular checkpoints so that any gap or reordering is detectable.",
                )
                .paragraph(
                    "Auditors replay the chain against the recorded policy version to confirm each \
                     decision without access to production systems or to the agents themselves.",
                ),
            Section::new("Deployment")
                .paragraph(
                    "The gateway runs as a sidecar or a shared service in front of the APIs agents \
                     call. Existing identity providers remain the source of truth for humans; \
                     Gatehouse only issues permits for machine actors.",
                )
                .bullet("Latency budget: policy decisions complete in single-digit milliseconds.")
                .bullet("Failure mode: if the decision service is unreachable, calls are denied.")
                .bullet("Retention: receipts are kept for a configurable period and exportable."),
        ],
    }
}
