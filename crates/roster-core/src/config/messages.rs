//! Message templates for service escalation and job failures.
//!
//! Templates are plain strings with `{name}` placeholders. A service
//! template is looked up as `"<operation>.<Entity>"` first, then as
//! `"<operation>"`, then falls back to the built-in default. `{entity}`
//! and its plural `{entities}` are always available.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A service operation that can escalate a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceOperation {
    /// Add a record.
    Add,
    /// Replace a record.
    Update,
    /// Delete records.
    Delete,
    /// Fetch a single record.
    GetSingle,
    /// Fetch a list of records.
    GetList,
    /// Remove records past an age threshold.
    Purge,
    /// Import records from a file.
    Import,
}

impl ServiceOperation {
    /// Return the key used in the `[messages.service]` table.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::GetSingle => "get_single",
            Self::GetList => "get_list",
            Self::Purge => "purge",
            Self::Import => "import",
        }
    }

    fn default_template(&self) -> &'static str {
        match self {
            Self::Add => "Failed to add {entity}.",
            Self::Update => "Failed to update {entity} with Id {id}.",
            Self::Delete => "Failed to delete {entity}.",
            Self::GetSingle => "Failed to get {entity} by predicate.",
            Self::GetList => "Failed to get list of {entities} by condition.",
            Self::Purge => "Failed to delete {entities} older than {threshold}.",
            Self::Import => "Failed to import {entity} records.",
        }
    }
}

impl fmt::Display for ServiceOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configured message templates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageCatalog {
    /// Service templates keyed by operation or `operation.Entity`.
    #[serde(default)]
    pub service: HashMap<String, String>,
    /// Job failure prefixes keyed by job name.
    #[serde(default)]
    pub jobs: HashMap<String, String>,
}

impl MessageCatalog {
    /// Render the escalation message for `operation` on `entity`.
    ///
    /// `{entity}` and `{entities}` are always available; `params` supplies
    /// the rest.
    pub fn render(
        &self,
        operation: ServiceOperation,
        entity: &str,
        params: &[(&str, String)],
    ) -> String {
        let template = self
            .service
            .get(&format!("{}.{entity}", operation.as_str()))
            .or_else(|| self.service.get(operation.as_str()))
            .map(String::as_str)
            .unwrap_or_else(|| operation.default_template());

        let mut message = template
            .replace("{entities}", &plural(entity))
            .replace("{entity}", entity);
        for (name, value) in params {
            message = message.replace(&format!("{{{name}}}"), value);
        }
        message
    }

    /// The prefix put in front of a failed job's error message.
    pub fn job_prefix(&self, job: &str) -> String {
        if let Some(prefix) = self.jobs.get(job) {
            return prefix.clone();
        }
        match job {
            "purge_old_users" => "Failed to purge old users:".to_string(),
            "import_countries" => "Failed to import countries from file:".to_string(),
            other => format!("Job '{other}' failed:"),
        }
    }
}

/// English plural of an entity name.
fn plural(noun: &str) -> String {
    let consonant_y = noun.strip_suffix('y').filter(|stem| {
        stem.chars()
            .last()
            .is_some_and(|c| !"aeiouAEIOU".contains(c))
    });
    match consonant_y {
        Some(stem) => format!("{stem}ies"),
        None if ["s", "x", "z", "ch", "sh"].iter().any(|end| noun.ends_with(end)) => {
            format!("{noun}es")
        }
        None => format!("{noun}s"),
    }
}
