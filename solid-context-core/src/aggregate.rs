//! Groups classified files by domain and type.
//!
//! [`HierarchicalOrganization`] owns the flat file list in discovery order;
//! the domain buckets only hold indices into it. Statistics are derived from
//! the buckets on demand, so they cannot drift from the grouping.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::contract::{ClassifiedFile, DocType, Domain};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DomainGroup {
    api: Vec<usize>,
    examples: Vec<usize>,
}

impl DomainGroup {
    pub fn api_indices(&self) -> &[usize] {
        &self.api
    }

    pub fn example_indices(&self) -> &[usize] {
        &self.examples
    }

    pub fn stats(&self) -> DomainStats {
        DomainStats {
            api: self.api.len(),
            examples: self.examples.len(),
            total: self.api.len() + self.examples.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DomainStats {
    pub api: usize,
    pub examples: usize,
    pub total: usize,
}

#[derive(Debug, Default)]
pub struct HierarchicalOrganization {
    files: Vec<ClassifiedFile>,
    domains: BTreeMap<Domain, DomainGroup>,
}

impl HierarchicalOrganization {
    /// All files, in input order.
    pub fn files(&self) -> &[ClassifiedFile] {
        &self.files
    }

    /// Domains with at least one file, in [`Domain`] declaration order.
    pub fn domains(&self) -> impl Iterator<Item = Domain> + '_ {
        self.domains.keys().copied()
    }

    pub fn group(&self, domain: Domain) -> Option<&DomainGroup> {
        self.domains.get(&domain)
    }

    pub fn api(&self, domain: Domain) -> impl Iterator<Item = &ClassifiedFile> + '_ {
        self.bucket(domain, DocType::Api)
    }

    pub fn examples(&self, domain: Domain) -> impl Iterator<Item = &ClassifiedFile> + '_ {
        self.bucket(domain, DocType::Examples)
    }

    pub fn bucket(
        &self,
        domain: Domain,
        doc_type: DocType,
    ) -> impl Iterator<Item = &ClassifiedFile> + '_ {
        let indices: &[usize] = match (self.domains.get(&domain), doc_type) {
            (Some(group), DocType::Api) => &group.api,
            (Some(group), DocType::Examples) => &group.examples,
            (None, _) => &[],
        };
        indices.iter().map(move |&i| &self.files[i])
    }

    /// Per-domain counts; domains without files are absent.
    pub fn stats(&self) -> BTreeMap<Domain, DomainStats> {
        self.domains
            .iter()
            .map(|(domain, group)| (*domain, group.stats()))
            .collect()
    }

    pub fn total_files(&self) -> usize {
        self.files.len()
    }
}

pub fn aggregate(files: Vec<ClassifiedFile>) -> HierarchicalOrganization {
    let mut domains: BTreeMap<Domain, DomainGroup> = BTreeMap::new();
    for (i, file) in files.iter().enumerate() {
        let group = domains.entry(file.classification.domain).or_default();
        match file.classification.doc_type {
            DocType::Api => group.api.push(i),
            DocType::Examples => group.examples.push(i),
        }
    }
    HierarchicalOrganization { files, domains }
}
