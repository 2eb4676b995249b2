//! Status catalog loader.
//!
//! Data files describe statuses declaratively. Hooks cannot be written in
//! data, so a spec names a behavior for spend/tick math and may declare a
//! flat per-stack modifier; anything richer is registered in code.

use std::path::Path;

use duel_core::status::{
    ActivationMode, BehaviorConfig, BehaviorId, PhaseSet, Polarity, SpendRule,
};
use duel_core::{RulesError, SpendPhase, StatusDefinition, StatusId};
use serde::{Deserialize, Serialize};

use crate::catalog::per_stack_modifier;
use crate::loaders::{LoadResult, read_file};

/// Spend rule as written in data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpendSpec {
    #[serde(default = "default_cost")]
    pub cost: u32,
    pub phases: Vec<SpendPhase>,
    #[serde(default)]
    pub requires_roll: bool,
}

/// Flat per-stack passive modifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModifierSpec {
    pub damage_per_stack: i32,
    pub block_per_stack: i32,
}

/// One status as written in data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSpec {
    pub id: StatusId,
    pub name: String,
    #[serde(default = "default_polarity")]
    pub polarity: Polarity,
    #[serde(default = "default_activation")]
    pub activation: ActivationMode,
    #[serde(default)]
    pub behavior: Option<BehaviorId>,
    #[serde(default)]
    pub config: BehaviorConfig,
    #[serde(default)]
    pub spend: Option<SpendSpec>,
    #[serde(default)]
    pub modifier: Option<ModifierSpec>,
    #[serde(default)]
    pub cleanse_threshold: Option<u32>,
    #[serde(default)]
    pub max_stacks: Option<u32>,
    #[serde(default)]
    pub priority: Option<i32>,
}

fn default_cost() -> u32 {
    1
}

fn default_polarity() -> Polarity {
    Polarity::Positive
}

fn default_activation() -> ActivationMode {
    ActivationMode::Active
}

impl StatusSpec {
    /// Builds the definition, rejecting specs the runtime could never use.
    pub fn into_definition(self) -> Result<StatusDefinition, RulesError> {
        let invalid = |reason: &'static str| RulesError::InvalidDefinition {
            status: self.id.clone(),
            reason,
        };

        if self.max_stacks == Some(0) {
            return Err(invalid("max_stacks must be positive"));
        }
        if let Some(spend) = &self.spend {
            if spend.cost == 0 {
                return Err(invalid("spend cost must be positive"));
            }
            if spend.phases.is_empty() {
                return Err(invalid("spend rule allows no phase"));
            }
        }
        if self.behavior.is_none() && self.config != BehaviorConfig::None {
            return Err(invalid("behavior config given without a behavior"));
        }

        let mut definition = StatusDefinition::new(self.id.clone(), self.name.clone());
        definition.polarity = self.polarity;
        definition.activation = self.activation;
        if let Some(behavior) = self.behavior {
            definition = definition.with_behavior(behavior, self.config);
        }
        if let Some(spend) = self.spend {
            let phases = spend
                .phases
                .iter()
                .fold(PhaseSet::empty(), |set, &phase| set | phase.flag());
            let mut rule = SpendRule::new(spend.cost, phases);
            if spend.requires_roll {
                rule = rule.requiring_roll();
            }
            definition = definition.with_spend(rule);
        }
        if let Some(modifier) = self.modifier {
            definition = definition.with_modify(per_stack_modifier(
                self.name,
                modifier.damage_per_stack,
                modifier.block_per_stack,
            ));
        }
        if let Some(threshold) = self.cleanse_threshold {
            definition = definition.with_cleanse(threshold);
        }
        if let Some(max) = self.max_stacks {
            definition = definition.with_max_stacks(max);
        }
        if let Some(priority) = self.priority {
            definition = definition.with_priority(priority);
        }

        Ok(definition)
    }
}

/// Status catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusCatalog {
    pub statuses: Vec<StatusSpec>,
}

/// Loader for status catalogs from RON files.
pub struct StatusLoader;

impl StatusLoader {
    /// Load status definitions from a RON file.
    pub fn load(path: &Path) -> LoadResult<Vec<StatusDefinition>> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> LoadResult<Vec<StatusDefinition>> {
        let catalog: StatusCatalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse status catalog RON: {}", e))?;

        catalog
            .statuses
            .into_iter()
            .map(|spec| spec.into_definition().map_err(anyhow::Error::from))
            .collect()
    }
}
