use std::collections::{HashMap, HashSet, VecDeque};
use std::fs;

use anyhow::{Context, Result, anyhow, bail};
use serde::Deserialize;
use tracing::debug;

use super::{GraphSource, Relationship, TraversalMode, TraversalNode};

#[derive(Debug, Deserialize)]
struct RawSnapshot {
    #[serde(default)]
    items: Vec<RawItem>,
    #[serde(default)]
    relationships: Vec<RawRelation>,
}

#[derive(Debug, Deserialize)]
struct RawItem {
    sys_id: String,
    #[serde(default)]
    name: String,
    #[serde(default, rename = "class")]
    ci_class: String,
}

#[derive(Debug, Deserialize)]
struct RawRelation {
    parent: String,
    child: String,
}

#[derive(Clone, Debug)]
pub struct CiRecord {
    pub id: String,
    pub name: String,
    pub ci_class: String,
}

/// An exported CMDB slice loaded from disk. Serves traversal queries from
/// in-memory adjacency lists; relationship direction is parent → child.
pub struct CmdbSnapshot {
    items: HashMap<String, CiRecord>,
    outgoing: HashMap<String, Vec<String>>,
    incoming: HashMap<String, Vec<String>>,
    relationships: Vec<Relationship>,
}

impl CmdbSnapshot {
    pub fn load(path: &str) -> Result<Self> {
        let raw = fs::read_to_string(path).with_context(|| format!("reading snapshot {path}"))?;
        Self::parse(&raw)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        let parsed: RawSnapshot = serde_json::from_str(raw).context("invalid snapshot JSON")?;
        if parsed.items.is_empty() {
            bail!("snapshot contains no configuration items");
        }

        let mut items = HashMap::with_capacity(parsed.items.len());
        for item in parsed.items {
            let name = if item.name.is_empty() {
                item.sys_id.clone()
            } else {
                item.name
            };
            let ci_class = if item.ci_class.is_empty() {
                "unclassified".to_owned()
            } else {
                item.ci_class
            };
            items.insert(
                item.sys_id.clone(),
                CiRecord {
                    id: item.sys_id,
                    name,
                    ci_class,
                },
            );
        }

        let mut outgoing: HashMap<String, Vec<String>> = HashMap::new();
        let mut incoming: HashMap<String, Vec<String>> = HashMap::new();
        let mut relationships = Vec::new();
        let mut dropped = 0usize;
        for relation in parsed.relationships {
            if !items.contains_key(&relation.parent) || !items.contains_key(&relation.child) {
                dropped += 1;
                continue;
            }

            outgoing
                .entry(relation.parent.clone())
                .or_default()
                .push(relation.child.clone());
            incoming
                .entry(relation.child.clone())
                .or_default()
                .push(relation.parent.clone());
            relationships.push(Relationship {
                source_ci_id: relation.parent,
                target_ci_id: relation.child,
            });
        }

        if dropped > 0 {
            debug!(dropped, "skipped relationships with unknown endpoints");
        }

        Ok(Self {
            items,
            outgoing,
            incoming,
            relationships,
        })
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }

    /// The item with the most outgoing relationships, ties broken by id, so
    /// a snapshot opened without an explicit root shows something useful.
    pub fn default_root(&self) -> Option<&str> {
        self.items
            .keys()
            .map(|id| (self.outgoing.get(id).map_or(0, Vec::len), id))
            .max_by(|a, b| a.0.cmp(&b.0).then_with(|| b.1.cmp(a.1)))
            .map(|(_, id)| id.as_str())
    }

    fn neighbors(&self, id: &str, mode: TraversalMode) -> &[String] {
        let table = match mode {
            TraversalMode::Forward => &self.outgoing,
            TraversalMode::Impact => &self.incoming,
        };
        table.get(id).map_or(&[], Vec::as_slice)
    }
}

fn path_from_root(parents: &HashMap<String, String>, id: &str) -> Vec<String> {
    let mut path = Vec::new();
    let mut cursor = id.to_owned();
    path.push(cursor.clone());

    while let Some(prev) = parents.get(&cursor) {
        cursor = prev.clone();
        path.push(cursor.clone());
    }

    path.reverse();
    path
}

impl GraphSource for CmdbSnapshot {
    fn traversal(
        &self,
        root_id: &str,
        mode: TraversalMode,
        max_depth: u32,
    ) -> Result<Vec<TraversalNode>> {
        let root = self
            .items
            .get(root_id)
            .ok_or_else(|| anyhow!("unknown root configuration item {root_id}"))?;

        let mut queue = VecDeque::new();
        let mut visited = HashSet::new();
        let mut parents: HashMap<String, String> = HashMap::new();
        let mut result = Vec::new();

        queue.push_back((root.id.clone(), 0u32));
        visited.insert(root.id.clone());

        while let Some((current, depth)) = queue.pop_front() {
            let Some(item) = self.items.get(&current) else {
                continue;
            };

            result.push(TraversalNode {
                ci_id: item.id.clone(),
                name: item.name.clone(),
                ci_class: item.ci_class.clone(),
                depth,
                path: path_from_root(&parents, &item.id),
            });

            if depth >= max_depth {
                continue;
            }

            for next in self.neighbors(&current, mode) {
                if visited.contains(next) {
                    continue;
                }

                visited.insert(next.clone());
                parents.insert(next.clone(), current.clone());
                queue.push_back((next.clone(), depth + 1));
            }
        }

        Ok(result)
    }

    fn relationships(&self, _root_id: &str) -> Result<Vec<Relationship>> {
        Ok(self.relationships.clone())
    }
}
