use nodegraph::{expect_type, select, GraphError, Node, ValueType};

use crate::float_param;

/// Quadratic smooth minimum. `k = 0` selects exactly `min(a, b)`.
pub fn smin(a: &Node, b: &Node, k: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(a, &[ValueType::Float], "smin")?;
    expect_type(b, &[ValueType::Float], "smin")?;
    let k = float_param(k, "smin")?;

    let hard = a.min(b);
    if k.as_float_literal() == Some(0.0) {
        return Ok(hard);
    }
    let h = (&k - (a - b).abs()).max(0.0) / &k;
    let smooth = &hard - &h * &h * &k * 0.25;
    Ok(select(&k.eq(0.0), hard, smooth))
}

/// Smooth maximum, `-smin(-a, -b, k)`; `k = 0` selects exactly `max(a, b)`.
pub fn smax(a: &Node, b: &Node, k: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(a, &[ValueType::Float], "smax")?;
    expect_type(b, &[ValueType::Float], "smax")?;
    Ok(-smin(&-a, &-b, k)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, float, time, EvalContext};

    fn eval_at(node: &Node, t: f32) -> f32 {
        let ctx = EvalContext::new([0.0, 0.0], t, [1.0, 1.0]);
        evaluate(node, &ctx).expect("evaluates").as_f32()
    }

    #[test]
    fn zero_factor_is_hard_min_and_max() {
        for (a, b) in [(0.3, -0.2), (1.5, 1.5), (-4.0, 2.25)] {
            let (na, nb) = (float(a), float(b));
            assert_eq!(eval_at(&smin(&na, &nb, 0.0).expect("floats"), 0.0), a.min(b));
            assert_eq!(eval_at(&smax(&na, &nb, 0.0).expect("floats"), 0.0), a.max(b));
        }
    }

    #[test]
    fn dynamic_zero_factor_avoids_nan() {
        // k only known when evaluated
        let k = time() * 0.0;
        let node = smin(&float(0.3), &float(-0.2), k).expect("floats");
        assert_eq!(eval_at(&node, 1.0), -0.2);
    }

    #[test]
    fn blend_dips_below_min_near_equal_inputs() {
        let node = smin(&float(0.5), &float(0.5), 0.2).expect("floats");
        let value = eval_at(&node, 0.0);
        assert!((value - (0.5 - 0.05)).abs() < 1e-6);

        let node = smax(&float(0.5), &float(0.5), 0.2).expect("floats");
        assert!((eval_at(&node, 0.0) - 0.55).abs() < 1e-6);
    }

    #[test]
    fn rejects_vector_distances() {
        assert!(smin(&nodegraph::uv(), &float(0.0), 0.1).is_err());
    }
}
