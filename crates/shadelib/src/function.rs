//! Small shaping functions shared by sketches.
//!
//! Functions:
//! - `screen_aspect_uv` centred uv with the longer axis stretched
//! - `repeating_pattern`, `bloom`, `bloom_edge_pattern` line glow helpers
//! - `domain_index` cell index of a repeated domain
//! - `median3`
//! - `rotate` 2D rotation
use nodegraph::{expect_type, mat2, select, uv, vec2, GraphError, Node, ValueType};

use crate::float_param;

const FLOAT_VECTORS: [ValueType; 4] = [
    ValueType::Float,
    ValueType::Vec2,
    ValueType::Vec3,
    ValueType::Vec4,
];

/// Screen uv shifted by `-range`, with the longer axis scaled by the aspect
/// ratio so distances are isotropic. `range = 0.5` centres the origin.
pub fn screen_aspect_uv(resolution: &Node, range: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(resolution, &[ValueType::Vec2], "screen_aspect_uv")?;
    let range = float_param(range, "screen_aspect_uv")?;
    let centred = uv() - range;
    let (w, h) = (resolution.x(), resolution.y());
    let wide = vec2(centred.x() * (&w / &h), centred.y());
    let tall = vec2(centred.x(), centred.y() * (&h / &w));
    Ok(select(&w.gt(&h), wide, tall))
}

/// `sin(pattern * repeat + time) / repeat`.
pub fn repeating_pattern(
    pattern: &Node,
    repeat: impl Into<Node>,
    time: impl Into<Node>,
) -> Result<Node, GraphError> {
    expect_type(pattern, &[ValueType::Float], "repeating_pattern")?;
    let repeat = float_param(repeat, "repeating_pattern")?;
    let time = float_param(time, "repeating_pattern")?;
    Ok((pattern * &repeat + time).sin() / repeat)
}

/// `(edge / pattern) ^ exponent`: a glow that peaks where `pattern` nears 0.
pub fn bloom(
    pattern: &Node,
    edge: impl Into<Node>,
    exponent: impl Into<Node>,
) -> Result<Node, GraphError> {
    expect_type(pattern, &[ValueType::Float], "bloom")?;
    let edge = float_param(edge, "bloom")?;
    let exponent = float_param(exponent, "bloom")?;
    Ok((edge / pattern).pow(exponent))
}

pub fn bloom_edge_pattern(
    pattern: &Node,
    repeat: impl Into<Node>,
    edge: impl Into<Node>,
    exponent: impl Into<Node>,
    time: impl Into<Node>,
) -> Result<Node, GraphError> {
    let lines = repeating_pattern(pattern, repeat, time)?.abs();
    bloom(&lines, edge, exponent)
}

/// `floor(d * repetitions)`.
pub fn domain_index(d: &Node, repetitions: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(d, &FLOAT_VECTORS, "domain_index")?;
    let repetitions = repetitions.into();
    expect_type(&repetitions, &FLOAT_VECTORS, "domain_index")?;
    Node::try_binary(nodegraph::BinaryOp::Mul, d, &repetitions).map(|scaled| scaled.floor())
}

/// Middle value of three floats.
pub fn median3(a: &Node, b: &Node, c: &Node) -> Result<Node, GraphError> {
    for value in [a, b, c] {
        expect_type(value, &[ValueType::Float], "median3")?;
    }
    let b_between = a.le(b).and(b.le(c)).or(c.le(b).and(b.le(a)));
    let a_between = b.le(a).and(a.le(c)).or(c.le(a).and(a.le(b)));
    Ok(select(&b_between, b, select(&a_between, a, c)))
}

/// Counter-clockwise rotation of `p` by `angle` radians.
pub fn rotate(p: &Node, angle: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "rotate")?;
    let angle = float_param(angle, "rotate")?;
    let (c, s) = (angle.cos(), angle.sin());
    Ok(mat2(&c, &s, -&s, &c) * p)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, float, resolution, EvalContext};
    use std::f32::consts::FRAC_PI_2;

    fn eval_at(node: &Node, uv: [f32; 2], res: [f32; 2]) -> Vec<f32> {
        let ctx = EvalContext::new(uv, 0.0, res);
        evaluate(node, &ctx).expect("evaluates").lanes().to_vec()
    }

    fn eval(node: &Node) -> Vec<f32> {
        eval_at(node, [0.0, 0.0], [1.0, 1.0])
    }

    #[test]
    fn aspect_uv_stretches_the_long_axis() {
        let node = screen_aspect_uv(&resolution(), 0.5).expect("vec2");
        assert_eq!(eval_at(&node, [1.0, 1.0], [200.0, 100.0]), vec![1.0, 0.5]);
        assert_eq!(eval_at(&node, [1.0, 1.0], [100.0, 200.0]), vec![0.5, 1.0]);
        assert_eq!(eval_at(&node, [0.5, 0.5], [640.0, 480.0]), vec![0.0, 0.0]);
    }

    #[test]
    fn median_picks_the_middle() {
        for (a, b, c) in [(1.0, 2.0, 3.0), (3.0, 1.0, 2.0), (2.0, 3.0, 1.0), (5.0, 5.0, 1.0)] {
            let node = median3(&float(a), &float(b), &float(c)).expect("floats");
            let mut sorted = [a, b, c];
            sorted.sort_by(f32::total_cmp);
            assert_eq!(eval(&node), vec![sorted[1]]);
        }
    }

    #[test]
    fn rotate_quarter_turn() {
        let node = rotate(&vec2(1.0, 0.0), FRAC_PI_2).expect("vec2");
        let value = eval(&node);
        assert!(value[0].abs() < 1e-6 && (value[1] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn bloom_peaks_near_the_line() {
        let near = bloom_edge_pattern(&float(0.001), 10.0, 0.02, 1.0, 0.0).expect("floats");
        let far = bloom_edge_pattern(&float(0.1), 10.0, 0.02, 1.0, 0.0).expect("floats");
        assert!(eval(&near)[0] > eval(&far)[0]);
    }

    #[test]
    fn domain_index_floors_cells() {
        let node = domain_index(&vec2(0.26, 0.74), 4.0).expect("vec2");
        assert_eq!(eval(&node), vec![1.0, 2.0]);
    }
}
