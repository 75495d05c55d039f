//! Genes referenced by reaction gene rules
use std::fmt::{Display, Formatter};

use derive_builder::Builder;

/// A gene of the model
#[derive(Builder, Clone, Debug, Eq, PartialEq)]
pub struct Gene {
    #[builder(setter(into))]
    pub id: String,
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Serialised JSON object
    #[builder(default = "None")]
    pub notes: Option<String>,
    /// Serialised JSON object
    #[builder(default = "None")]
    pub annotation: Option<String>,
}

impl Gene {
    /// Whether the gene is named in a gene reaction rule such as `"acsA and (cooS or cooF)"`
    pub fn in_rule(&self, rule: &str) -> bool {
        rule_genes(rule).any(|g| g == self.id)
    }
}

/// Gene ids of a gene reaction rule, in order of appearance
pub fn rule_genes(rule: &str) -> impl Iterator<Item = &str> {
    rule.split(|c: char| c.is_whitespace() || c == '(' || c == ')')
        .filter(|token| !token.is_empty())
        .filter(|token| !matches!(token.to_lowercase().as_str(), "and" | "or"))
}

impl Display for Gene {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.name {
            Some(name) if !name.is_empty() => write!(f, "{} ({})", self.id, name),
            _ => write!(f, "{}", self.id),
        }
    }
}

#[cfg(test)]
mod gene_tests {
    use super::*;

    #[test]
    fn genes_of_a_rule() {
        let genes: Vec<&str> = rule_genes("acsA and (cooS OR cooF)").collect();
        assert_eq!(genes, vec!["acsA", "cooS", "cooF"]);
        assert_eq!(rule_genes("").count(), 0);
    }

    #[test]
    fn gene_in_rule() {
        let gene = GeneBuilder::default()
            .id("cooS")
            .name(Some("CO dehydrogenase".to_string()))
            .build()
            .unwrap();
        assert!(gene.in_rule("acsA and cooS"));
        assert!(!gene.in_rule("cooSB"));
        assert_eq!(gene.to_string(), "cooS (CO dehydrogenase)");
    }
}
