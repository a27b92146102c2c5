//! Strain Parameters
//!
//! The per-run table of strain configurations and which of them are active.

use bevy_ecs::prelude::*;

use strain_events::{StrainIndex, MAX_STRAINS};

use crate::config::{Config, StrainConfig};

/// Strain parameters for the run, read by setup and the diffusion systems
#[derive(Resource, Debug, Clone)]
pub struct StrainTable {
    strains: Vec<StrainConfig>,
    active: usize,
}

impl StrainTable {
    /// Table from a validated configuration
    pub fn from_config(config: &Config) -> Self {
        Self::new(config.strains.clone(), config.model.active_strains)
    }

    pub fn new(strains: Vec<StrainConfig>, active: usize) -> Self {
        let active = active.min(strains.len());
        Self { strains, active }
    }

    /// Strains taking part in ticks, in index order
    pub fn active(&self) -> impl Iterator<Item = StrainIndex> {
        StrainIndex::range(self.active)
    }

    pub fn active_count(&self) -> usize {
        self.active
    }

    pub fn configured_count(&self) -> usize {
        self.strains.len()
    }

    pub fn get(&self, strain: StrainIndex) -> &StrainConfig {
        &self.strains[strain.index()]
    }

    pub fn opposite(&self, strain: StrainIndex) -> Option<StrainIndex> {
        self.strains.get(strain.index()).and_then(|s| s.opposite)
    }

    pub fn name(&self, strain: StrainIndex) -> &str {
        &self.strains[strain.index()].name
    }

    /// Starting skepticism for every strain slot; unconfigured slots start at 0.
    pub fn initial_skepticism(&self) -> [f64; MAX_STRAINS] {
        let mut levels = [0.0; MAX_STRAINS];
        for (slot, strain) in levels.iter_mut().zip(&self.strains) {
            *slot = strain.skeptical_level;
        }
        levels
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_from_default_config() {
        let table = StrainTable::from_config(&Config::default());
        assert_eq!(table.configured_count(), 3);
        assert_eq!(table.active_count(), 2);
        assert_eq!(table.active().collect::<Vec<_>>(), vec![StrainIndex(0), StrainIndex(1)]);
        assert_eq!(table.opposite(StrainIndex(0)), Some(StrainIndex(1)));
        assert_eq!(table.opposite(StrainIndex(2)), None);
        assert_eq!(table.name(StrainIndex(1)), "virus_1");
    }

    #[test]
    fn test_initial_skepticism_pads_missing_strains() {
        let mut strain = StrainConfig::named("only");
        strain.skeptical_level = 0.3;
        let table = StrainTable::new(vec![strain], 1);
        assert_eq!(table.initial_skepticism(), [0.3, 0.0, 0.0]);
    }
}
