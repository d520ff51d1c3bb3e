//! Index bookkeeping shared between pipeline stages.
//!
//! Internally every vertex index is 0-based. Mesh files and the external
//! retargeting tools count from 1, so every crossing goes through
//! [`to_one_based`] / [`from_one_based`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{MeshError, Result};

/// Which numbering an exported index sequence uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBase {
    /// Internal numbering, first vertex is 0.
    #[default]
    Zero,
    /// File / external-tool numbering, first vertex is 1.
    One,
}

impl IndexBase {
    /// Offset added to a 0-based index to express it in this base.
    #[inline]
    pub fn offset(self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }
}

/// Convert 0-based indices to 1-based.
pub fn to_one_based(indices: &[usize]) -> Vec<usize> {
    indices.iter().map(|&i| i + 1).collect()
}

/// Convert 1-based indices to 0-based, rejecting 0.
pub fn from_one_based(indices: &[usize]) -> Result<Vec<usize>> {
    indices
        .iter()
        .map(|&i| {
            i.checked_sub(1)
                .ok_or_else(|| MeshError::invalid_param("index", i, "1-based indices start at 1"))
        })
        .collect()
}

/// Number of quad-derived triangles at the head of a converted face list.
///
/// Produced by [`quad_to_triangles`](crate::algo::topology::quad_to_triangles)
/// and required by [`triangle_to_quad`](crate::algo::topology::triangle_to_quad)
/// to undo it. Always even.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ConversionBoundary(usize);

impl ConversionBoundary {
    /// Create a boundary, rejecting odd values.
    pub fn new(boundary: usize) -> Result<Self> {
        if boundary % 2 != 0 {
            return Err(MeshError::OddBoundary { boundary });
        }
        Ok(Self(boundary))
    }

    /// Boundary for a split of `quads` quads (two triangles each).
    #[inline]
    pub fn from_quad_count(quads: usize) -> Self {
        Self(quads * 2)
    }

    /// Number of generated triangles.
    #[inline]
    pub fn get(self) -> usize {
        self.0
    }

    /// Number of quads the generated triangles came from.
    #[inline]
    pub fn quad_count(self) -> usize {
        self.0 / 2
    }
}

impl<'de> Deserialize<'de> for ConversionBoundary {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = usize::deserialize(deserializer)?;
        ConversionBoundary::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for ConversionBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ordered correspondence from sub-mesh vertex positions to super-mesh vertices.
///
/// Entry `i` is the super-mesh index of sub-mesh vertex `i`. Entries are
/// distinct and in range for the super-mesh the map was built against; that
/// vertex count travels with the map so it cannot silently be applied to a
/// mesh of a different shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawIndexMap", into = "RawIndexMap")]
pub struct IndexMap {
    indices: Vec<usize>,
    super_vertex_count: usize,
}

#[derive(Serialize, Deserialize)]
struct RawIndexMap {
    super_vertex_count: usize,
    indices: Vec<usize>,
}

impl TryFrom<RawIndexMap> for IndexMap {
    type Error = MeshError;

    fn try_from(raw: RawIndexMap) -> Result<Self> {
        IndexMap::new(raw.indices, raw.super_vertex_count)
    }
}

impl From<IndexMap> for RawIndexMap {
    fn from(map: IndexMap) -> Self {
        RawIndexMap {
            super_vertex_count: map.super_vertex_count,
            indices: map.indices,
        }
    }
}

impl IndexMap {
    /// Build a map, validating range and distinctness.
    pub fn new(indices: Vec<usize>, super_vertex_count: usize) -> Result<Self> {
        let mut seen: HashMap<usize, usize> = HashMap::with_capacity(indices.len());
        for (pos, &index) in indices.iter().enumerate() {
            if index >= super_vertex_count {
                return Err(MeshError::IndexOutOfRange {
                    index,
                    len: super_vertex_count,
                });
            }
            if let Some(&first) = seen.get(&index) {
                return Err(MeshError::DuplicateCorrespondence {
                    first,
                    second: pos,
                    vertex: index,
                });
            }
            seen.insert(index, pos);
        }
        Ok(Self {
            indices,
            super_vertex_count,
        })
    }

    /// Super-mesh indices in sub-mesh order.
    #[inline]
    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    /// Number of sub-mesh vertices covered.
    #[inline]
    pub fn len(&self) -> usize {
        self.indices.len()
    }

    /// Whether the map is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Vertex count of the super-mesh this map was built against.
    #[inline]
    pub fn super_vertex_count(&self) -> usize {
        self.super_vertex_count
    }

    /// Fail unless `vertex_count` matches the super-mesh this map belongs to.
    pub fn check_super_mesh(&self, vertex_count: usize) -> Result<()> {
        if vertex_count != self.super_vertex_count {
            return Err(MeshError::shape(
                "super-mesh vertex count vs index map",
                self.super_vertex_count,
                vertex_count,
            ));
        }
        Ok(())
    }

    /// Indices expressed in the given base, for export.
    pub fn to_base(&self, base: IndexBase) -> Vec<usize> {
        self.indices.iter().map(|&i| i + base.offset()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_based_roundtrip() {
        let zero = vec![0, 4, 2];
        let one = to_one_based(&zero);
        assert_eq!(one, vec![1, 5, 3]);
        assert_eq!(from_one_based(&one).unwrap(), zero);
    }

    #[test]
    fn test_from_one_based_rejects_zero() {
        assert!(from_one_based(&[1, 0]).is_err());
    }

    #[test]
    fn test_boundary_rejects_odd() {
        assert!(ConversionBoundary::new(4).is_ok());
        assert!(matches!(
            ConversionBoundary::new(3),
            Err(MeshError::OddBoundary { boundary: 3 })
        ));
        assert_eq!(ConversionBoundary::new(6).unwrap().quad_count(), 3);
    }

    #[test]
    fn test_boundary_json() {
        let b = ConversionBoundary::new(8).unwrap();
        assert_eq!(serde_json::to_string(&b).unwrap(), "8");
        let back: ConversionBoundary = serde_json::from_str("8").unwrap();
        assert_eq!(back, b);
        assert!(serde_json::from_str::<ConversionBoundary>("7").is_err());
    }

    #[test]
    fn test_index_map_validation() {
        assert!(IndexMap::new(vec![0, 2], 3).is_ok());
        assert!(matches!(
            IndexMap::new(vec![0, 3], 3),
            Err(MeshError::IndexOutOfRange { index: 3, len: 3 })
        ));
        assert!(matches!(
            IndexMap::new(vec![1, 0, 1], 3),
            Err(MeshError::DuplicateCorrespondence { first: 0, second: 2, vertex: 1 })
        ));
    }

    #[test]
    fn test_index_map_super_mesh_check() {
        let map = IndexMap::new(vec![0, 2], 3).unwrap();
        assert!(map.check_super_mesh(3).is_ok());
        assert!(map.check_super_mesh(4).is_err());
        assert_eq!(map.to_base(IndexBase::One), vec![1, 3]);
    }

    #[test]
    fn test_index_map_json_validates() {
        let map = IndexMap::new(vec![2, 0], 3).unwrap();
        let json = serde_json::to_string(&map).unwrap();
        let back: IndexMap = serde_json::from_str(&json).unwrap();
        assert_eq!(back, map);

        let bad = r#"{"super_vertex_count":2,"indices":[0,5]}"#;
        assert!(serde_json::from_str::<IndexMap>(bad).is_err());
    }
}
