//! Dense vector helpers for embedding profiles and similarity.
//!
//! Embeddings are stored as `f32`; sums and dot products accumulate in `f64`.

use crate::error::{AppError, AppResult};

/// Element-wise mean of `vectors`, all of which must have length `dim`
pub fn mean<V: AsRef<[f32]>>(vectors: &[V], dim: usize) -> AppResult<Vec<f32>> {
    if vectors.is_empty() {
        return Err(AppError::Computation(
            "cannot average an empty set of vectors".to_string(),
        ));
    }

    let mut sums = vec![0.0f64; dim];
    for vector in vectors {
        let vector = vector.as_ref();
        ensure_dim(vector, dim)?;
        for (sum, &x) in sums.iter_mut().zip(vector) {
            *sum += f64::from(x);
        }
    }

    let n = vectors.len() as f64;
    Ok(sums.into_iter().map(|s| (s / n) as f32).collect())
}

/// Cosine similarity in [-1, 1]; 0 when either vector has zero norm
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> AppResult<f64> {
    ensure_dim(b, a.len())?;

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}

/// True when every component is exactly zero
pub fn is_zero(vector: &[f32]) -> bool {
    vector.iter().all(|&x| x == 0.0)
}

/// True when no component is NaN or infinite
pub fn is_finite(vector: &[f32]) -> bool {
    vector.iter().all(|x| x.is_finite())
}

pub fn ensure_dim(vector: &[f32], dim: usize) -> AppResult<()> {
    if vector.len() != dim {
        return Err(AppError::DimensionMismatch {
            expected: dim,
            actual: vector.len(),
        });
    }
    Ok(())
}
