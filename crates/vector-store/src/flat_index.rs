use crate::error::{Result, VectorStoreError};

/// Append-only exact L2 index.
///
/// Vectors live in one contiguous buffer in insertion order, so a vector's
/// ordinal position is `offset / dimension`. Search is brute force.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    inner: Option<FlatVectors>,
}

#[derive(Debug, Clone, PartialEq)]
struct FlatVectors {
    dimension: usize,
    data: Vec<f32>,
}

impl VectorIndex {
    /// An index that has not been created yet
    #[must_use]
    pub const fn uninitialized() -> Self {
        Self { inner: None }
    }

    /// Allocate an empty index with a fixed dimension
    pub fn create(&mut self, dimension: usize) -> Result<()> {
        if let Some(existing) = &self.inner {
            return Err(VectorStoreError::AlreadyInitialized {
                dimension: existing.dimension,
            });
        }
        if dimension == 0 {
            return Err(VectorStoreError::InvalidDimension(dimension));
        }
        self.inner = Some(FlatVectors {
            dimension,
            data: Vec::new(),
        });
        log::info!("Created new index with dimension {dimension}");
        Ok(())
    }

    /// Rebuild an index from a flat row-major buffer
    pub(crate) fn from_flat(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 {
            return Err(VectorStoreError::InvalidDimension(dimension));
        }
        if data.len() % dimension != 0 {
            return Err(VectorStoreError::DecodeFailure(format!(
                "{} values is not a multiple of dimension {dimension}",
                data.len()
            )));
        }
        Ok(Self {
            inner: Some(FlatVectors { dimension, data }),
        })
    }

    #[must_use]
    pub const fn is_initialized(&self) -> bool {
        self.inner.is_some()
    }

    #[must_use]
    pub fn dimension(&self) -> Option<usize> {
        self.inner.as_ref().map(|flat| flat.dimension)
    }

    /// Number of stored vectors (0 when uninitialized)
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .as_ref()
            .map_or(0, |flat| flat.data.len() / flat.dimension)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Vector stored at `position`
    #[must_use]
    pub fn vector(&self, position: usize) -> Option<&[f32]> {
        let flat = self.inner.as_ref()?;
        let start = position.checked_mul(flat.dimension)?;
        flat.data.get(start..start.checked_add(flat.dimension)?)
    }

    /// Drop every vector at or after `count`
    pub(crate) fn truncate(&mut self, count: usize) {
        if let Some(flat) = self.inner.as_mut() {
            flat.data.truncate(count.saturating_mul(flat.dimension));
        }
    }

    pub(crate) fn as_flat(&self) -> Option<(usize, &[f32])> {
        self.inner
            .as_ref()
            .map(|flat| (flat.dimension, flat.data.as_slice()))
    }

    /// Append vectors in order and return the position of the first one.
    ///
    /// Either every vector is appended or none is.
    pub fn append(&mut self, vectors: &[Vec<f32>]) -> Result<usize> {
        let flat = self.inner.as_mut().ok_or(VectorStoreError::NotInitialized)?;
        if let Some(bad) = vectors.iter().find(|v| v.len() != flat.dimension) {
            return Err(VectorStoreError::DimensionMismatch {
                expected: flat.dimension,
                actual: bad.len(),
            });
        }

        let start = flat.data.len() / flat.dimension;
        flat.data.reserve(vectors.len() * flat.dimension);
        for vector in vectors {
            flat.data.extend_from_slice(vector);
        }
        Ok(start)
    }

    /// Exact k-nearest-neighbor search.
    /// Returns `(position, squared_distance)` ascending by distance, ties by position.
    /// `k = None` ranks every stored vector.
    pub fn search(&self, query: &[f32], k: Option<usize>) -> Result<Vec<(usize, f32)>> {
        let flat = self.inner.as_ref().ok_or(VectorStoreError::NotInitialized)?;
        if query.len() != flat.dimension {
            return Err(VectorStoreError::DimensionMismatch {
                expected: flat.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = flat
            .data
            .chunks_exact(flat.dimension)
            .enumerate()
            .map(|(position, vector)| (position, squared_l2(query, vector)))
            .collect();

        scored.sort_by(|a, b| a.1.total_cmp(&b.1).then(a.0.cmp(&b.0)));
        if let Some(k) = k {
            scored.truncate(k);
        }
        Ok(scored)
    }
}

/// Squared Euclidean distance. Callers guarantee equal lengths.
#[must_use]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
