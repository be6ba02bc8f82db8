//! Loop-based reference contraction.
//!
//! Walks every output coordinate and every contracted coordinate
//! explicitly. Slow, but independent of the GEMM lowering, which makes it
//! the baseline the optimized paths are checked against.

use crate::contract::properties::ContractionProperties;
use crate::error::TensorError;
use crate::range::Range;
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Contract two tensors with explicit loops.
///
/// Annotations follow [`contract`](crate::contract::contract): shared tags
/// of `ann_a` and `ann_b` are summed, the result's axes are `ann_c`.
///
/// # Examples
///
/// ```
/// use itensor::Tensor;
/// use itensor::contract::contract_naive;
///
/// let a = Tensor::<f64>::ones(&[2, 3]);
/// let b = Tensor::<f64>::ones(&[3, 4]);
/// let c = contract_naive(&a, &[1, -1], &b, &[-1, 2], &[1, 2]).unwrap();
/// assert_eq!(c.shape(), &[2, 4]);
/// assert_eq!(c.get(&[1, 3]), Some(&3.0));
/// ```
pub fn contract_naive<T: Scalar>(
    a: &Tensor<T>,
    ann_a: &[i32],
    b: &Tensor<T>,
    ann_b: &[i32],
    ann_c: &[i32],
) -> Result<Tensor<T>, TensorError> {
    let props = ContractionProperties::compute(ann_a, a.shape(), ann_b, b.shape(), ann_c)?;

    // Where each axis of A and B takes its coordinate from: an output axis
    // or a contracted axis.
    let source = |tag: i32| -> Axis {
        match ann_c.iter().position(|&t| t == tag) {
            Some(p) => Axis::Output(p),
            None => Axis::Contracted(
                props
                    .contracted_pairs
                    .iter()
                    .position(|&(i, _)| ann_a[i] == tag)
                    .unwrap_or_default(),
            ),
        }
    };
    let axes_a: Vec<Axis> = ann_a.iter().map(|&t| source(t)).collect();
    let axes_b: Vec<Axis> = ann_b.iter().map(|&t| source(t)).collect();

    let cont_extents: Vec<usize> = props
        .contracted_pairs
        .iter()
        .map(|&(i, _)| a.shape()[i])
        .collect();
    let cont_range = Range::new(&cont_extents);

    let mut c = Tensor::zeros(&props.output_shape);
    let out_range = c.range().clone();
    let mut idx_a = vec![0; a.ndim()];
    let mut idx_b = vec![0; b.ndim()];

    for out in out_range.iter() {
        let mut sum = T::zero();
        for cont in cont_range.iter() {
            gather(&axes_a, &out, &cont, &mut idx_a);
            gather(&axes_b, &out, &cont, &mut idx_b);
            sum += a.data()[a.range().ordinal(&idx_a)] * b.data()[b.range().ordinal(&idx_b)];
        }
        let ord = out_range.ordinal(&out);
        c.data_mut()[ord] = sum;
    }

    Ok(c)
}

#[derive(Clone, Copy)]
enum Axis {
    Output(usize),
    Contracted(usize),
}

fn gather(axes: &[Axis], out: &[usize], cont: &[usize], idx: &mut [usize]) {
    for (slot, axis) in idx.iter_mut().zip(axes) {
        *slot = match *axis {
            Axis::Output(p) => out[p],
            Axis::Contracted(p) => cont[p],
        };
    }
}
