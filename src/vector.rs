//! This is the vector math module
//! Provide sparse dot product, squared norm and cosine similarity over count vectors

/// Sparse count vector: `(column, count)` pairs sorted by ascending column,
/// with no zero counts.
pub type SparseVector = Vec<(u32, u32)>;

/// Dot Product
/// dot_prod = sum(a[c] * b[c]) over columns present in both
/// Both inputs must be sorted by column
pub fn dot_product(left: &[(u32, u32)], right: &[(u32, u32)]) -> u64 {
    let mut l = left.iter().peekable();
    let mut r = right.iter().peekable();
    let mut dot_prod = 0u64;

    while let (Some(&&(lc, lv)), Some(&&(rc, rv))) = (l.peek(), r.peek()) {
        match lc.cmp(&rc) {
            std::cmp::Ordering::Less => {
                l.next();
            }
            std::cmp::Ordering::Greater => {
                r.next();
            }
            std::cmp::Ordering::Equal => {
                dot_prod += u64::from(lv) * u64::from(rv);
                l.next();
                r.next();
            }
        }
    }

    dot_prod
}

/// Squared L2 norm, exact in integers
pub fn squared_norm(vector: &[(u32, u32)]) -> u64 {
    vector.iter().map(|&(_, v)| u64::from(v) * u64::from(v)).sum()
}

/// Cosine similarity from an exact dot product and the two squared norms.
/// Defined as 0 when either vector is zero; clamped to [0, 1].
pub fn cosine_from_parts(dot: u64, left_sq: u64, right_sq: u64) -> f32 {
    if left_sq == 0 || right_sq == 0 {
        return 0.0;
    }

    let sim = dot as f64 / ((left_sq as f64).sqrt() * (right_sq as f64).sqrt());
    sim.clamp(0.0, 1.0) as f32
}

/// Expands a sparse vector into a dense one of length `dim`
pub fn to_dense(vector: &[(u32, u32)], dim: usize) -> Vec<u32> {
    let mut dense = vec![0; dim];
    for &(c, v) in vector {
        dense[c as usize] = v;
    }
    dense
}
