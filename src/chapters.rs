use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::Context as _;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Policycenter,
    Claimcenter,
    Billingcenter,
    Common,
}

impl Product {
    pub fn as_str(self) -> &'static str {
        match self {
            Product::Policycenter => "policycenter",
            Product::Claimcenter => "claimcenter",
            Product::Billingcenter => "billingcenter",
            Product::Common => "common",
        }
    }

    /// Short code embedded in topic ids. `common` ids carry no code.
    pub fn id_code(self) -> Option<&'static str> {
        match self {
            Product::Policycenter => Some("pc"),
            Product::Claimcenter => Some("cc"),
            Product::Billingcenter => Some("bc"),
            Product::Common => None,
        }
    }

    /// Code of the matching row in the `products` table.
    pub fn sql_code(self) -> &'static str {
        match self {
            Product::Policycenter => "PC",
            Product::Claimcenter => "CC",
            Product::Billingcenter => "BC",
            Product::Common => "COMMON",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Product::Policycenter => "Policy Center",
            Product::Claimcenter => "Claim Center",
            Product::Billingcenter => "Billing Center",
            Product::Common => "Common",
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChapterTarget {
    pub product: Product,
    pub module: String,
}

const BUILTIN_CHAPTERS: &[(&str, Product, &str)] = &[
    ("Chapter 1 - Guidewire Cloud Overview", Product::Common, "001-guidewire-cloud"),
    ("Chapter 2 - Surepath Overview", Product::Common, "002-surepath"),
    (
        "Chapter 3 - InsuranceSuite Implementation Tools",
        Product::Common,
        "003-implementation-tools",
    ),
    ("Chapter 4 - Policy Center Introduction", Product::Policycenter, "01-introduction"),
    ("Chapter 5 - Claim Center Introduction", Product::Claimcenter, "01-introduction"),
    ("Chapter 6 - Billing Center Introduction", Product::Billingcenter, "01-introduction"),
    ("Chapter 7 - Rating Introduction", Product::Policycenter, "03-rating"),
    (
        "Chapter 8 - InsuranceSuite Developer Fundamentals",
        Product::Common,
        "004-developer-fundamentals",
    ),
    ("Chapter 9 - Policy center configuration", Product::Policycenter, "02-configuration"),
    ("Chapter 9 - PolicyCenter Configuration", Product::Policycenter, "02-configuration"),
    ("Chapter 10 - ClaimCenter Configuration", Product::Claimcenter, "02-configuration"),
    ("Chapter 12 - Rating Configuration", Product::Policycenter, "03-rating"),
    ("Chapter 13 - Introduction to Integration", Product::Common, "005-integration"),
    ("Chapter 14 - Advanced product Designer", Product::Policycenter, "04-apd"),
];

/// Maps raw chapter folder names onto their `(product, module)` slot.
///
/// Matching is exact and case-sensitive.
#[derive(Debug, Clone)]
pub struct ChapterMapping {
    entries: HashMap<String, ChapterTarget>,
}

impl ChapterMapping {
    pub fn builtin() -> Self {
        let entries = BUILTIN_CHAPTERS
            .iter()
            .map(|(name, product, module)| {
                (
                    (*name).to_owned(),
                    ChapterTarget {
                        product: *product,
                        module: (*module).to_owned(),
                    },
                )
            })
            .collect();
        Self { entries }
    }

    /// Reads a YAML map of `chapter name -> {product, module}`.
    pub fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let yaml = std::fs::read_to_string(path)
            .with_context(|| format!("read chapter table: {}", path.display()))?;
        Self::from_yaml_str(&yaml)
            .with_context(|| format!("parse chapter table: {}", path.display()))
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let entries: HashMap<String, ChapterTarget> =
            serde_yaml::from_str(yaml).context("deserialize chapter table")?;
        for (name, target) in &entries {
            if target.module.trim().is_empty() {
                anyhow::bail!("chapter table entry has empty module: {name}");
            }
        }
        Ok(Self { entries })
    }

    pub fn classify(&self, chapter_name: &str) -> Option<&ChapterTarget> {
        self.entries.get(chapter_name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
