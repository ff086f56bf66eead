//! Region adjacency index.
//!
//! Two regions are adjacent when their polygons touch (share boundary points
//! while their interiors stay disjoint) or overlap (interiors intersect and
//! neither region contains the other). Identical geometries and strict
//! containment are not adjacency, so a region and a historical variant with
//! the same outline each relate to their surroundings independently.
//!
//! Candidate pairs come from an R-tree over region bounding boxes; every
//! candidate is then checked with a full DE-9IM relate, so the pre-filter only
//! saves work and never changes the result.

use std::collections::{BTreeSet, HashMap};

use geo::{BoundingRect, MultiPolygon, Relate};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::visit::Bfs;
use rstar::primitives::{GeomWithData, Rectangle};
use rstar::{RTree, RTreeObject};

use super::types::Region;

/// Bounding box entry in the candidate tree, tagged with the region's position.
type Envelope = GeomWithData<Rectangle<[f64; 2]>, usize>;

/// Touches-or-overlaps test between two region geometries.
pub fn touches_or_overlaps(a: &MultiPolygon<f64>, b: &MultiPolygon<f64>) -> bool {
    let matrix = a.relate(b);
    matrix.is_intersects() && !matrix.is_within() && !matrix.is_contains()
}

/// Symmetric adjacency between regions.
#[derive(Debug, Clone)]
pub struct AdjacencyIndex {
    /// Undirected region graph; node weights are region ids
    graph: UnGraph<String, ()>,

    /// Index: region id → NodeIndex
    node_index: HashMap<String, NodeIndex>,

    /// Cached neighbour lists, sorted and duplicate-free
    neighbours: HashMap<String, Vec<String>>,
}

impl AdjacencyIndex {
    /// Build the index from the full set of regions.
    pub fn build(regions: &[Region]) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut node_index = HashMap::with_capacity(regions.len());
        let nodes: Vec<NodeIndex> = regions
            .iter()
            .map(|region| {
                let idx = graph.add_node(region.region_id.clone());
                node_index.insert(region.region_id.clone(), idx);
                idx
            })
            .collect();

        let envelopes: Vec<Envelope> = regions
            .iter()
            .enumerate()
            .filter_map(|(i, region)| {
                let rect = region.geometry.bounding_rect()?;
                let corners = Rectangle::from_corners(
                    [rect.min().x, rect.min().y],
                    [rect.max().x, rect.max().y],
                );
                Some(GeomWithData::new(corners, i))
            })
            .collect();
        let tree = RTree::bulk_load(envelopes.clone());

        for entry in &envelopes {
            let i = entry.data;
            for candidate in tree.locate_in_envelope_intersecting(&entry.envelope()) {
                let j = candidate.data;
                // Each unordered pair once
                if j <= i {
                    continue;
                }
                if touches_or_overlaps(&regions[i].geometry, &regions[j].geometry) {
                    graph.update_edge(nodes[i], nodes[j], ());
                }
            }
        }

        let neighbours = node_index
            .iter()
            .map(|(region_id, &idx)| {
                let ids: BTreeSet<String> = graph
                    .neighbors(idx)
                    .filter(|&n| n != idx)
                    .map(|n| graph[n].clone())
                    .collect();
                (region_id.clone(), ids.into_iter().collect())
            })
            .collect();

        Self {
            graph,
            node_index,
            neighbours,
        }
    }

    /// Number of regions in the index.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Number of adjacent pairs.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn contains(&self, region_id: &str) -> bool {
        self.node_index.contains_key(region_id)
    }

    /// Sorted neighbours of a region. Unknown regions have none.
    pub fn neighbours_of(&self, region_id: &str) -> &[String] {
        self.neighbours
            .get(region_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Are two regions adjacent?
    pub fn are_adjacent(&self, a: &str, b: &str) -> bool {
        match (self.node_index.get(a), self.node_index.get(b)) {
            (Some(&a), Some(&b)) => a != b && self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Union of the neighbours of every given region, minus the given regions.
    ///
    /// The result is sorted and duplicate-free.
    pub fn adjacent_to<S: AsRef<str>>(&self, region_ids: &[S]) -> Vec<String> {
        let inputs: BTreeSet<&str> = region_ids.iter().map(AsRef::as_ref).collect();
        let adjacent: BTreeSet<&str> = inputs
            .iter()
            .flat_map(|id| self.neighbours_of(id))
            .map(String::as_str)
            .filter(|id| !inputs.contains(id))
            .collect();
        adjacent.into_iter().map(String::from).collect()
    }

    /// The connected component containing a region, sorted.
    pub fn component_of(&self, region_id: &str) -> Vec<String> {
        let Some(&start) = self.node_index.get(region_id) else {
            return vec![];
        };
        let mut members = BTreeSet::new();
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(node) = bfs.next(&self.graph) {
            members.insert(self.graph[node].clone());
        }
        members.into_iter().collect()
    }

    /// All connected components, each sorted, ordered by their first member.
    pub fn components(&self) -> Vec<Vec<String>> {
        let mut ids: Vec<&String> = self.node_index.keys().collect();
        ids.sort();

        let mut seen: BTreeSet<&str> = BTreeSet::new();
        let mut components = Vec::new();
        for id in ids {
            if seen.contains(id.as_str()) {
                continue;
            }
            let component = self.component_of(id);
            for member in &component {
                if let Some((key, _)) = self.node_index.get_key_value(member.as_str()) {
                    seen.insert(key.as_str());
                }
            }
            components.push(component);
        }
        components
    }
}
