//! Contraction properties for GEMM-based contraction.
//!
//! Every axis of `A`, `B` and `C` carries an integer tag. A tag shared by
//! `A` and `B` is summed over; a tag shared by one operand and `C` is an
//! output axis. [`ContractionProperties`] turns that annotation into the
//! matrix problem `C(dleft, dright) = A(dleft, dmid) * B(dmid, dright)`
//! together with the axis permutations that bring each operand into GEMM
//! order.

use crate::error::TensorError;

/// Properties computed for a contraction `C = A * B`.
///
/// - `dleft` = product of A's uncontracted extents
/// - `dmid` = product of contracted extents
/// - `dright` = product of B's uncontracted extents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractionProperties {
    /// Contracted axis pairs `(axis in A, axis in B)`, in A's axis order.
    pub contracted_pairs: Vec<(usize, usize)>,

    /// Axes of A that survive into C, ordered by their position in C.
    pub uncontracted_a: Vec<usize>,

    /// Axes of B that survive into C, ordered by their position in C.
    pub uncontracted_b: Vec<usize>,

    /// Whether A must be permuted to reach GEMM order.
    pub permute_a: bool,

    /// Whether B must be permuted to reach GEMM order.
    pub permute_b: bool,

    /// Whether C's axis order differs from the GEMM output order.
    pub permute_c: bool,

    pub dleft: usize,
    pub dmid: usize,
    pub dright: usize,

    /// Reorders A to `[uncontracted..., contracted...]`.
    pub perm_a: Vec<usize>,

    /// Reorders B to `[contracted..., uncontracted...]`.
    pub perm_b: Vec<usize>,

    /// `perm_c[i]` is the axis of C that holds the i-th GEMM output axis.
    pub perm_c: Vec<usize>,

    /// Tags of the GEMM output axes: A's uncontracted, then B's.
    pub output_labels: Vec<i32>,

    /// Extents of C in C's own axis order.
    pub output_shape: Vec<usize>,
}

impl ContractionProperties {
    /// Analyze the contraction described by the three annotations.
    ///
    /// # Errors
    ///
    /// - `WrongNumberOfIndices` if an annotation's length differs from its
    ///   operand's rank
    /// - `InvalidAnnotation` for a tag repeated within one annotation, a tag
    ///   of C found in neither operand, a tag of A or B found neither in the
    ///   other operand nor in C, or a tag present in all three
    /// - `DimensionMismatch` if two contracted axes differ in extent
    ///
    /// # Example
    ///
    /// ```
    /// use itensor::contract::ContractionProperties;
    ///
    /// // C[i,k] = A[i,j] * B[j,k]
    /// let props = ContractionProperties::compute(
    ///     &[1, 2], &[2, 3],
    ///     &[2, 3], &[3, 4],
    ///     &[1, 3],
    /// ).unwrap();
    ///
    /// assert_eq!(props.dleft, 2);
    /// assert_eq!(props.dmid, 3);
    /// assert_eq!(props.dright, 4);
    /// assert!(props.is_simple_matmul());
    /// ```
    pub fn compute(
        ann_a: &[i32],
        shape_a: &[usize],
        ann_b: &[i32],
        shape_b: &[usize],
        ann_c: &[i32],
    ) -> Result<Self, TensorError> {
        check_length(ann_a, shape_a)?;
        check_length(ann_b, shape_b)?;
        check_unique(ann_a, "A")?;
        check_unique(ann_b, "B")?;
        check_unique(ann_c, "C")?;

        let mut contracted_pairs = Vec::new();
        let mut uncontracted_a = Vec::new();
        for (i, &tag) in ann_a.iter().enumerate() {
            match (position(ann_b, tag), position(ann_c, tag)) {
                (Some(_), Some(_)) => {
                    return Err(TensorError::annotation(format!(
                        "tag {tag} appears in A, B and C"
                    )));
                }
                (Some(j), None) => {
                    if shape_a[i] != shape_b[j] {
                        return Err(TensorError::DimensionMismatch {
                            left: shape_a[i],
                            right: shape_b[j],
                        });
                    }
                    contracted_pairs.push((i, j));
                }
                (None, Some(_)) => uncontracted_a.push(i),
                (None, None) => {
                    return Err(TensorError::annotation(format!(
                        "tag {tag} of A appears neither in B nor in C"
                    )));
                }
            }
        }

        let mut uncontracted_b = Vec::new();
        for (j, &tag) in ann_b.iter().enumerate() {
            if position(ann_a, tag).is_some() {
                continue;
            }
            if position(ann_c, tag).is_none() {
                return Err(TensorError::annotation(format!(
                    "tag {tag} of B appears neither in A nor in C"
                )));
            }
            uncontracted_b.push(j);
        }

        let mut output_shape = Vec::with_capacity(ann_c.len());
        for &tag in ann_c {
            let extent = match (position(ann_a, tag), position(ann_b, tag)) {
                (Some(i), _) => shape_a[i],
                (None, Some(j)) => shape_b[j],
                (None, None) => {
                    return Err(TensorError::annotation(format!(
                        "tag {tag} of C appears in neither A nor B"
                    )));
                }
            };
            output_shape.push(extent);
        }

        // Output axes follow C's order within each operand.
        uncontracted_a.sort_by_key(|&i| position(ann_c, ann_a[i]));
        uncontracted_b.sort_by_key(|&j| position(ann_c, ann_b[j]));

        let dleft: usize = uncontracted_a.iter().map(|&i| shape_a[i]).product();
        let dmid: usize = contracted_pairs.iter().map(|&(i, _)| shape_a[i]).product();
        let dright: usize = uncontracted_b.iter().map(|&j| shape_b[j]).product();

        let perm_a: Vec<usize> = uncontracted_a
            .iter()
            .copied()
            .chain(contracted_pairs.iter().map(|&(i, _)| i))
            .collect();
        let perm_b: Vec<usize> = contracted_pairs
            .iter()
            .map(|&(_, j)| j)
            .chain(uncontracted_b.iter().copied())
            .collect();

        let output_labels: Vec<i32> = uncontracted_a
            .iter()
            .map(|&i| ann_a[i])
            .chain(uncontracted_b.iter().map(|&j| ann_b[j]))
            .collect();
        let perm_c: Vec<usize> = output_labels
            .iter()
            .filter_map(|&tag| position(ann_c, tag))
            .collect();

        Ok(Self {
            permute_a: !is_identity_perm(&perm_a),
            permute_b: !is_identity_perm(&perm_b),
            permute_c: !is_identity_perm(&perm_c),
            contracted_pairs,
            uncontracted_a,
            uncontracted_b,
            dleft,
            dmid,
            dright,
            perm_a,
            perm_b,
            perm_c,
            output_labels,
            output_shape,
        })
    }

    /// Number of contracted axis pairs.
    pub fn ncont(&self) -> usize {
        self.contracted_pairs.len()
    }

    /// Check if this is a plain matrix multiplication (no permutation needed).
    pub fn is_simple_matmul(&self) -> bool {
        !self.permute_a && !self.permute_b && !self.permute_c
    }

    /// Check if this is an outer product (no contracted axes).
    pub fn is_outer_product(&self) -> bool {
        self.contracted_pairs.is_empty()
    }

    /// Check if this is a full contraction (scalar result).
    pub fn is_full_contraction(&self) -> bool {
        self.uncontracted_a.is_empty() && self.uncontracted_b.is_empty()
    }
}

fn position(tags: &[i32], tag: i32) -> Option<usize> {
    tags.iter().position(|&t| t == tag)
}

fn check_length(tags: &[i32], shape: &[usize]) -> Result<(), TensorError> {
    if tags.len() != shape.len() {
        return Err(TensorError::WrongNumberOfIndices {
            expected: shape.len(),
            actual: tags.len(),
        });
    }
    Ok(())
}

fn check_unique(tags: &[i32], operand: &str) -> Result<(), TensorError> {
    for (i, &tag) in tags.iter().enumerate() {
        if tags[..i].contains(&tag) {
            return Err(TensorError::annotation(format!(
                "tag {tag} repeated in annotation of {operand}"
            )));
        }
    }
    Ok(())
}

/// Check if a permutation is the identity permutation.
fn is_identity_perm(perm: &[usize]) -> bool {
    perm.iter().enumerate().all(|(i, &p)| i == p)
}
