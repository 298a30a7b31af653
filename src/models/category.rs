//! Supported arXiv taxonomy codes.

use serde::Serialize;

/// A taxonomy code and its display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArxivCategory {
    pub id: &'static str,
    pub name: &'static str,
}

/// Categories the feed can list
pub const ARXIV_CATEGORIES: &[ArxivCategory] = &[
    ArxivCategory { id: "cs.AI", name: "Artificial Intelligence" },
    ArxivCategory { id: "cs.LG", name: "Machine Learning" },
    ArxivCategory { id: "cs.CL", name: "Computation & Language" },
    ArxivCategory { id: "cs.CV", name: "Computer Vision" },
    ArxivCategory { id: "cs.NE", name: "Neural & Evolutionary" },
    ArxivCategory { id: "cs.RO", name: "Robotics" },
    ArxivCategory { id: "stat.ML", name: "Statistics ML" },
    ArxivCategory { id: "cs.SE", name: "Software Engineering" },
    ArxivCategory { id: "cs.CR", name: "Cryptography" },
    ArxivCategory { id: "cs.DC", name: "Distributed Computing" },
];

/// Category used when none is given
pub const DEFAULT_CATEGORY: &str = "cs.AI";

/// Look up a supported category by code (case-sensitive, like arXiv)
pub fn find_category(id: &str) -> Option<&'static ArxivCategory> {
    ARXIV_CATEGORIES.iter().find(|c| c.id == id)
}

/// Whether the code is in the supported list
pub fn is_supported_category(id: &str) -> bool {
    find_category(id).is_some()
}
