//! Per-task ordered model preference lists

use std::collections::HashMap;

use switchboard_config::SelectionConfig;

use crate::classify::TaskCategory;
use crate::error::RoutingError;

/// Ordered preference lists, best first, per task category
#[derive(Debug, Clone)]
pub struct AffinityTable {
    lists: HashMap<TaskCategory, Vec<String>>,
}

impl Default for AffinityTable {
    fn default() -> Self {
        let lists = TaskCategory::ALL
            .into_iter()
            .map(|category| {
                let ids = default_list(category).iter().map(|id| (*id).to_owned()).collect();
                (category, ids)
            })
            .collect();

        Self { lists }
    }
}

impl AffinityTable {
    /// Defaults with per-category overrides from configuration
    ///
    /// A configured list replaces the default list for that category.
    pub fn from_config(config: &SelectionConfig) -> Result<Self, RoutingError> {
        let mut table = Self::default();

        for (name, ids) in &config.affinity {
            let category: TaskCategory = name.parse()?;
            table.lists.insert(category, ids.clone());
        }

        Ok(table)
    }

    /// Zero-based rank of a model for a task, if listed
    pub fn rank(&self, task: TaskCategory, model_id: &str) -> Option<usize> {
        self.lists.get(&task)?.iter().position(|id| id == model_id)
    }

    pub fn list(&self, task: TaskCategory) -> &[String] {
        self.lists.get(&task).map(Vec::as_slice).unwrap_or(&[])
    }
}

fn default_list(category: TaskCategory) -> &'static [&'static str] {
    match category {
        TaskCategory::Chat => &[
            "gpt-4o-mini",
            "claude-3-5-haiku-20241022",
            "gemini-1.5-flash",
            "llama-3.3-70b-versatile",
        ],
        TaskCategory::ContentGeneration => &[
            "gpt-4o",
            "claude-3-5-sonnet-20241022",
            "gemini-1.5-pro",
            "mistral-large-latest",
        ],
        TaskCategory::Code => &[
            "claude-3-5-sonnet-20241022",
            "gpt-4o",
            "deepseek-chat",
            "gemini-1.5-pro",
            "llama-3.3-70b-versatile",
        ],
        TaskCategory::Analysis => &[
            "claude-3-5-sonnet-20241022",
            "gpt-4o",
            "gemini-1.5-pro",
            "mistral-large-latest",
        ],
        TaskCategory::Summarization => &[
            "gemini-1.5-flash",
            "claude-3-5-haiku-20241022",
            "gpt-4o-mini",
            "llama-3.1-8b-instant",
        ],
        TaskCategory::Translation => &[
            "gpt-4o",
            "gemini-1.5-pro",
            "mistral-large-latest",
            "claude-3-5-sonnet-20241022",
        ],
        TaskCategory::Creative => &[
            "claude-3-5-sonnet-20241022",
            "gpt-4o",
            "mistral-large-latest",
            "gemini-1.5-pro",
        ],
        TaskCategory::Reasoning => &[
            "gpt-4o",
            "claude-3-5-sonnet-20241022",
            "deepseek-chat",
            "gemini-1.5-pro",
        ],
    }
}
