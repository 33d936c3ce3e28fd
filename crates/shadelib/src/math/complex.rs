//! Complex arithmetic on vec2 nodes, `x` real and `y` imaginary.
use std::f32::consts::PI;

use nodegraph::{atan2, expect_type, select, vec2, GraphError, Node, ValueType};

use crate::color::{cosh, sinh};
use crate::float_param;

fn complex(z: &Node, op: &'static str) -> Result<(), GraphError> {
    expect_type(z, &[ValueType::Vec2], op)
}

/// `(|z|, arg z)` with the argument in [-π, π].
pub fn as_polar(z: &Node) -> Result<Node, GraphError> {
    complex(z, "as_polar")?;
    Ok(vec2(z.length(), atan2(z.y(), z.x())))
}

pub fn complex_mul(a: &Node, b: &Node) -> Result<Node, GraphError> {
    complex(a, "complex_mul")?;
    complex(b, "complex_mul")?;
    Ok(vec2(
        a.x() * b.x() - a.y() * b.y(),
        a.x() * b.y() + a.y() * b.x(),
    ))
}

/// Division by zero yields non-finite lanes.
pub fn complex_div(a: &Node, b: &Node) -> Result<Node, GraphError> {
    complex(a, "complex_div")?;
    complex(b, "complex_div")?;
    let denominator = b.dot(b);
    Ok(vec2(
        (a.x() * b.x() + a.y() * b.y()) / &denominator,
        (a.y() * b.x() - a.x() * b.y()) / &denominator,
    ))
}

pub fn complex_log(z: &Node) -> Result<Node, GraphError> {
    complex(z, "complex_log")?;
    let polar = as_polar(z)?;
    let theta = polar.y();
    let theta = select(&theta.gt(PI), &theta - 2.0 * PI, &theta);
    Ok(vec2(polar.x().log(), theta))
}

/// `z^p` for a real exponent `p`.
pub fn complex_pow(z: &Node, p: impl Into<Node>) -> Result<Node, GraphError> {
    complex(z, "complex_pow")?;
    let p = float_param(p, "complex_pow")?;
    let polar = as_polar(z)?;
    let angle = polar.y() * &p;
    Ok(polar.x().pow(&p) * vec2(angle.cos(), angle.sin()))
}

pub fn complex_sin(z: &Node) -> Result<Node, GraphError> {
    complex(z, "complex_sin")?;
    let (x, y) = (z.x(), z.y());
    Ok(vec2(x.sin() * cosh(&y)?, x.cos() * sinh(&y)?))
}

pub fn complex_cos(z: &Node) -> Result<Node, GraphError> {
    complex(z, "complex_cos")?;
    let (x, y) = (z.x(), z.y());
    Ok(vec2(x.cos() * cosh(&y)?, -(x.sin() * sinh(&y)?)))
}

pub fn complex_tan(z: &Node) -> Result<Node, GraphError> {
    complex_div(&complex_sin(z)?, &complex_cos(z)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, EvalContext};

    fn eval(node: &Node) -> [f32; 2] {
        let ctx = EvalContext::new([0.0, 0.0], 0.0, [1.0, 1.0]);
        let value = evaluate(node, &ctx).expect("evaluates");
        [value.lanes()[0], value.lanes()[1]]
    }

    fn close(a: [f32; 2], b: [f32; 2]) -> bool {
        (a[0] - b[0]).abs() < 1e-4 && (a[1] - b[1]).abs() < 1e-4
    }

    #[test]
    fn mul_and_div_are_inverse() {
        let a = vec2(1.5, -2.0);
        let b = vec2(0.25, 3.0);
        let product = complex_mul(&a, &b).expect("vec2");
        assert!(close(eval(&product), [6.375, 4.0]));
        let back = complex_div(&product, &b).expect("vec2");
        assert!(close(eval(&back), [1.5, -2.0]));
    }

    #[test]
    fn polar_form_of_i() {
        assert!(close(eval(&as_polar(&vec2(0.0, 2.0)).expect("vec2")), [2.0, PI / 2.0]));
    }

    #[test]
    fn square_via_pow() {
        let z = vec2(1.0, 1.0);
        assert!(close(eval(&complex_pow(&z, 2.0).expect("vec2")), [0.0, 2.0]));
    }

    #[test]
    fn log_of_negative_real() {
        let value = eval(&complex_log(&vec2(-1.0, 0.0)).expect("vec2"));
        assert!(close(value, [0.0, PI]));
    }

    #[test]
    fn trig_of_real_axis_matches_scalar() {
        let z = vec2(0.7, 0.0);
        assert!(close(eval(&complex_sin(&z).expect("vec2")), [0.7_f32.sin(), 0.0]));
        assert!(close(eval(&complex_cos(&z).expect("vec2")), [0.7_f32.cos(), 0.0]));
        assert!(close(eval(&complex_tan(&z).expect("vec2")), [0.7_f32.tan(), 0.0]));
    }

    #[test]
    fn rejects_vec3() {
        assert!(complex_log(&nodegraph::vec3(1.0, 0.0, 0.0)).is_err());
    }
}
