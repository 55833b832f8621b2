//! Xenotype and gene assignment

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneSet {
    pub xenotype: String,
    /// Secondary, non-inheritable xenotype.
    pub double_xenotype: Option<String>,
    /// Inherited genes.
    pub endogenes: Vec<String>,
    /// Implanted genes.
    pub xenogenes: Vec<String>,
}

impl GeneSet {
    pub fn new(xenotype: &str) -> Self {
        GeneSet { xenotype: xenotype.to_string(), ..Default::default() }
    }

    pub fn has_gene(&self, gene: &str) -> bool {
        self.endogenes.iter().chain(self.xenogenes.iter()).any(|g| g == gene)
    }

    pub fn add_endogene(&mut self, gene: &str) {
        if !self.endogenes.iter().any(|g| g == gene) {
            self.endogenes.push(gene.to_string());
        }
    }

    pub fn add_xenogene(&mut self, gene: &str) {
        if !self.xenogenes.iter().any(|g| g == gene) {
            self.xenogenes.push(gene.to_string());
        }
    }

    pub fn all_genes(&self) -> impl Iterator<Item = &String> {
        self.endogenes.iter().chain(self.xenogenes.iter())
    }

    pub fn remove_where(&mut self, mut pred: impl FnMut(&str) -> bool) {
        self.endogenes.retain(|g| !pred(g));
        self.xenogenes.retain(|g| !pred(g));
    }

    pub fn is_xenotype(&self, name: &str) -> bool {
        self.xenotype == name || self.double_xenotype.as_deref() == Some(name)
    }
}
