//! Templates excluded from the smoke render pass.
//!
//! Some templates cannot render against the shared dummy context: they need a
//! logged-in request, a different context shape, or they are already exercised
//! elsewhere. Each exclusion carries the reason it was made, grouped into
//! partitions. The union of all partitions is the exclusion set; an identifier
//! listed twice, or under several reasons, is still excluded once.
//!
//! Entries do not have to exist on disk. [`SkipList::audit`] reports the ones
//! that do not, and the ones filed under more than one reason, so the list can
//! be kept tidy.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::core::TplcheckError;

/// Why a template is excluded from the smoke pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Parent templates rendered through their children
    Covered,
    /// Rendered in a second pass with a different `data` shape
    Defer,
    /// Need a logged-out request; currently unused
    LoggedOut,
    /// Need a logged-in request context
    LoggedIn,
    /// Need a context shape of their own
    Unusual,
    /// Exercised by a dedicated test
    Dedicated,
}

impl SkipReason {
    pub const ALL: [SkipReason; 6] = [
        SkipReason::Covered,
        SkipReason::Defer,
        SkipReason::LoggedOut,
        SkipReason::LoggedIn,
        SkipReason::Unusual,
        SkipReason::Dedicated,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            SkipReason::Covered => "covered",
            SkipReason::Defer => "defer",
            SkipReason::LoggedOut => "logged_out",
            SkipReason::LoggedIn => "logged_in",
            SkipReason::Unusual => "unusual",
            SkipReason::Dedicated => "dedicated",
        }
    }

    pub const fn description(self) -> &'static str {
        match self {
            SkipReason::Covered => "parent template, rendered through its children",
            SkipReason::Defer => "rendered separately with a list-shaped `data`",
            SkipReason::LoggedOut => "needs a logged-out request (seems unused)",
            SkipReason::LoggedIn => "needs a logged-in request context",
            SkipReason::Unusual => "needs a context shape of its own",
            SkipReason::Dedicated => "covered by a dedicated test",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SkipReason {
    type Err = TplcheckError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SkipReason::ALL.into_iter().find(|reason| reason.as_str() == s).ok_or_else(|| {
            TplcheckError::ConfigError {
                message: format!(
                    "Unknown skip reason '{}'. Expected one of: {}",
                    s,
                    SkipReason::ALL.map(SkipReason::as_str).join(", ")
                ),
            }
        })
    }
}

const COVERED: &[&str] = &["zerver/portico.html", "zerver/portico_signup.html"];

const DEFER: &[&str] = &["analytics/activity.html"];

const LOGGED_OUT: &[&str] = &["confirmation/confirm.html", "confirmation/confirm_mituser.html"];

const LOGGED_IN: &[&str] = &[
    "analytics/stats.html",
    "zerver/home.html",
    "zerver/invite_user.html",
    "zerver/keyboard_shortcuts.html",
    "zerver/left-sidebar.html",
    "zerver/logout.html",
    "zerver/markdown_help.html",
    "zerver/navbar.html",
    "zerver/right-sidebar.html",
    "zerver/search_operators.html",
    "zerver/stream_creation_prompt.html",
    "zerver/subscriptions.html",
    "zerver/tutorial_finale.html",
];

const UNUSUAL: &[&str] = &[
    "confirmation/mituser_confirmation_email_body.txt",
    "confirmation/mituser_confirmation_email_subject.txt",
    "confirmation/mituser_invite_email_body.txt",
    "confirmation/mituser_invite_email_subject.txt",
    "corporate/mit.html",
    "corporate/privacy.html",
    "corporate/terms-enterprise.html",
    "corporate/zephyr.html",
    "corporate/zephyr-mirror.html",
    "pipeline/css.jinja",
    "pipeline/inline_js.jinja",
    "pipeline/js.jinja",
    "zilencer/enterprise_tos_accept_body.txt",
    "zerver/zulipchat_migration_tos.html",
    "zilencer/enterprise_tos_accept_body.txt",
    "zerver/closed_realm.html",
    "zerver/topic_is_muted.html",
    "zerver/bankruptcy.html",
    "zerver/image-overlay.html",
    "zerver/invalid_realm.html",
    "zerver/compose.html",
    "zerver/debug.html",
    "zerver/base.html",
    "zerver/api_content.json",
];

const DEDICATED: &[&str] = &["tests/test_markdown.html", "zerver/terms.html"];

/// Skip partitions keyed by reason. Entries keep the order they were listed in,
/// repeats included.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList {
    partitions: BTreeMap<SkipReason, Vec<String>>,
}

impl SkipList {
    /// An empty list; every enumerated template renders.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in partitions.
    pub fn builtin() -> Self {
        let mut list = Self::new();
        for (reason, entries) in [
            (SkipReason::Covered, COVERED),
            (SkipReason::Defer, DEFER),
            (SkipReason::LoggedOut, LOGGED_OUT),
            (SkipReason::LoggedIn, LOGGED_IN),
            (SkipReason::Unusual, UNUSUAL),
            (SkipReason::Dedicated, DEDICATED),
        ] {
            list.extend(reason, entries.iter().copied());
        }
        list
    }

    /// Build from a `[skip]` table. Unknown reason names are a configuration error.
    pub fn from_partitions(partitions: &BTreeMap<String, Vec<String>>) -> Result<Self, TplcheckError> {
        let mut list = Self::new();
        for (name, entries) in partitions {
            let reason: SkipReason = name.parse()?;
            list.extend(reason, entries.iter().map(String::as_str));
        }
        Ok(list)
    }

    /// Append entries to a partition.
    pub fn extend<'a>(&mut self, reason: SkipReason, entries: impl IntoIterator<Item = &'a str>) {
        self.partitions
            .entry(reason)
            .or_default()
            .extend(entries.into_iter().map(str::to_string));
    }

    /// Entries of one partition as listed; empty when the partition is absent.
    pub fn partition(&self, reason: SkipReason) -> &[String] {
        self.partitions.get(&reason).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Union of all partitions.
    pub fn identifiers(&self) -> BTreeSet<String> {
        self.partitions.values().flatten().cloned().collect()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.partitions.values().any(|entries| entries.iter().any(|e| e == identifier))
    }

    /// Every reason an identifier is listed under, in partition order.
    pub fn reasons_for(&self, identifier: &str) -> Vec<SkipReason> {
        self.partitions
            .iter()
            .filter(|(_, entries)| entries.iter().any(|e| e == identifier))
            .map(|(reason, _)| *reason)
            .collect()
    }

    /// Keep the templates that are not excluded, in their original order.
    pub fn filter(&self, templates: &[String]) -> Vec<String> {
        let excluded = self.identifiers();
        templates.iter().filter(|t| !excluded.contains(*t)).cloned().collect()
    }

    /// Compare the list against the enumerated templates.
    pub fn audit(&self, enumerated: &[String]) -> SkipAudit {
        let known: BTreeSet<&str> = enumerated.iter().map(String::as_str).collect();
        let mut audit = SkipAudit::default();

        for (reason, entries) in &self.partitions {
            let mut seen = BTreeSet::new();
            for entry in entries {
                if !seen.insert(entry.as_str()) {
                    audit.repeated.push(SkipEntry {
                        reason: *reason,
                        template: entry.clone(),
                    });
                    continue;
                }
                if !known.contains(entry.as_str()) {
                    audit.stale.push(SkipEntry {
                        reason: *reason,
                        template: entry.clone(),
                    });
                }
            }
        }

        for identifier in self.identifiers() {
            let reasons = self.reasons_for(&identifier);
            if reasons.len() > 1 {
                audit.multi_reason.push(MultiReasonEntry {
                    template: identifier,
                    reasons,
                });
            }
        }

        audit
    }
}

/// A single skip-list entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkipEntry {
    pub reason: SkipReason,
    pub template: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MultiReasonEntry {
    pub template: String,
    pub reasons: Vec<SkipReason>,
}

/// Findings of [`SkipList::audit`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SkipAudit {
    /// Entries with no matching template on disk
    pub stale: Vec<SkipEntry>,
    /// Templates listed under more than one reason
    pub multi_reason: Vec<MultiReasonEntry>,
    /// Entries listed twice within the same partition (harmless)
    pub repeated: Vec<SkipEntry>,
}

impl SkipAudit {
    /// Stale and multi-reason entries are warnings; repeats are not.
    pub fn has_warnings(&self) -> bool {
        !self.stale.is_empty() || !self.multi_reason.is_empty()
    }

    pub fn warning_count(&self) -> usize {
        self.stale.len() + self.multi_reason.len()
    }
}

/// The built-in exclusion set.
pub fn build_skip_list() -> BTreeSet<String> {
    SkipList::builtin().identifiers()
}
