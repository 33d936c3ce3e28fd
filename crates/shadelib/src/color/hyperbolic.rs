//! Hyperbolic functions written in terms of `exp`. They overflow to
//! infinity (and `tanh` to NaN) for |x| beyond roughly 88.
use nodegraph::{expect_type, GraphError, Node, ValueType};

const FLOATS: [ValueType; 4] = [
    ValueType::Float,
    ValueType::Vec2,
    ValueType::Vec3,
    ValueType::Vec4,
];

pub fn tanh(x: &Node) -> Result<Node, GraphError> {
    expect_type(x, &FLOATS, "tanh")?;
    let t = x.exp();
    let inv = 1.0 / &t;
    Ok((&t - &inv) / (&t + &inv))
}

pub fn sinh(x: &Node) -> Result<Node, GraphError> {
    expect_type(x, &FLOATS, "sinh")?;
    let t = x.exp();
    Ok((&t - 1.0 / &t) / 2.0)
}

pub fn cosh(x: &Node) -> Result<Node, GraphError> {
    expect_type(x, &FLOATS, "cosh")?;
    let t = x.exp();
    Ok((&t + 1.0 / &t) / 2.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, float, EvalContext};

    fn eval(node: &Node) -> f32 {
        let ctx = EvalContext::new([0.0, 0.0], 0.0, [1.0, 1.0]);
        evaluate(node, &ctx).expect("evaluates").as_f32()
    }

    #[test]
    fn agrees_with_std() {
        for x in [-3.0_f32, -0.5, 0.0, 0.25, 2.0] {
            let node = float(x);
            assert!((eval(&tanh(&node).expect("float")) - x.tanh()).abs() < 1e-5);
            assert!((eval(&sinh(&node).expect("float")) - x.sinh()).abs() < 1e-4);
            assert!((eval(&cosh(&node).expect("float")) - x.cosh()).abs() < 1e-4);
        }
    }

    #[test]
    fn ints_are_rejected() {
        assert!(tanh(&nodegraph::int(1)).is_err());
    }
}
