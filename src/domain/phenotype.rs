// ============================================================
// Layer 3 — Phenotype Mapping
// ============================================================
// Bijection between the class ids emitted by the
// `phenotype_classification` task and human-readable labels.
// Stored next to the model weights (phenotypes.json) but never
// part of them.
//
// Example phenotypes.json:
//   { "id_to_phenotype": { "0": "HEALTHY", "1": "SICKLECELLAEMIA" } }

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{GenomeError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhenotypeMap {
    id_to_phenotype: BTreeMap<usize, String>,
}

impl PhenotypeMap {
    /// Assign ids 0..n to `names` in the given order.
    pub fn from_names<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_pairs(names.into_iter().enumerate().map(|(i, n)| (i, n.into())))
    }

    /// Build from explicit (id, name) pairs, rejecting duplicate ids
    /// or duplicate names so the mapping stays bijective.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, String)>) -> Result<Self> {
        let mut id_to_phenotype = BTreeMap::new();
        for (id, name) in pairs {
            if id_to_phenotype.values().any(|n: &String| n == &name) {
                return Err(GenomeError::InvalidInput(format!(
                    "phenotype '{name}' is mapped to more than one id"
                )));
            }
            if id_to_phenotype.insert(id, name).is_some() {
                return Err(GenomeError::InvalidInput(format!(
                    "phenotype id {id} is defined twice"
                )));
            }
        }
        Ok(Self { id_to_phenotype })
    }

    /// Re-check bijectivity after deserialisation.
    pub fn validate(&self) -> Result<()> {
        Self::from_pairs(self.id_to_phenotype.clone()).map(|_| ())
    }

    pub fn name(&self, id: usize) -> Option<&str> {
        self.id_to_phenotype.get(&id).map(String::as_str)
    }

    /// True when the ids are exactly `0..len`, i.e. every class
    /// index of a head this wide has a label.
    pub fn has_dense_ids(&self) -> bool {
        self.id_to_phenotype.keys().copied().eq(0..self.len())
    }

    /// All labels in ascending id order.
    pub fn labels(&self) -> Vec<String> {
        self.id_to_phenotype.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.id_to_phenotype.len()
    }

    pub fn is_empty(&self) -> bool {
        self.id_to_phenotype.is_empty()
    }
}
