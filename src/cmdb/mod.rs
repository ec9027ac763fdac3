use anyhow::Result;
use clap::ValueEnum;

mod snapshot;

pub use snapshot::CmdbSnapshot;

/// Direction a relationship query walks from the root item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum TraversalMode {
    /// Follow references from parent to child.
    Forward,
    /// Walk referrers instead, answering "what depends on this item".
    Impact,
}

impl TraversalMode {
    pub fn label(self) -> &'static str {
        match self {
            Self::Forward => "forward references",
            Self::Impact => "downstream impact",
        }
    }
}

/// One configuration item reached by a traversal. `path` is the id chain
/// from the root up to and including this item.
#[derive(Clone, Debug)]
pub struct TraversalNode {
    pub ci_id: String,
    pub name: String,
    pub ci_class: String,
    pub depth: u32,
    pub path: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct Relationship {
    pub source_ci_id: String,
    pub target_ci_id: String,
}

/// The data service the graph view is built on. The explorer only ever
/// talks to the CMDB through this interface.
pub trait GraphSource {
    fn traversal(
        &self,
        root_id: &str,
        mode: TraversalMode,
        max_depth: u32,
    ) -> Result<Vec<TraversalNode>>;

    fn relationships(&self, root_id: &str) -> Result<Vec<Relationship>>;
}
