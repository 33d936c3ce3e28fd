//! Lattice helpers shared by the simplex noise implementations.
use nodegraph::{expect_type, splat, step, GraphError, Node, ValueType};

/// `x - floor(x / 289) * 289`, componentwise.
pub fn mod289(x: &Node) -> Result<Node, GraphError> {
    expect_type(x, &[ValueType::Float, ValueType::Vec3, ValueType::Vec4], "mod289")?;
    Ok(x - (x * (1.0 / 289.0)).floor() * 289.0)
}

/// Quintic interpolation curve `6t^5 - 15t^4 + 10t^3`.
pub fn fade(t: &Node) -> Result<Node, GraphError> {
    expect_type(t, &[ValueType::Float, ValueType::Vec3], "fade")?;
    Ok(t * t * t * (t * (t * 6.0 - 15.0) + 10.0))
}

/// `mod((x * 34 + 1) * x, 289)`; the scalar form is additionally floored.
pub fn permute(x: &Node) -> Result<Node, GraphError> {
    expect_type(x, &[ValueType::Float, ValueType::Vec4], "permute")?;
    let permuted = ((x * 34.0 + 1.0) * x) % 289.0;
    if x.ty() == ValueType::Float {
        Ok(permuted.floor())
    } else {
        Ok(permuted)
    }
}

pub fn taylor_inv_sqrt(r: &Node) -> Result<Node, GraphError> {
    expect_type(r, &[ValueType::Float, ValueType::Vec4], "taylor_inv_sqrt")?;
    Ok(1.792_842_9 - 0.853_734_7 * r)
}

/// Gradient on the 4D simplex lattice for hashed index `j`.
pub fn grad4(j: &Node, ip: &Node) -> Result<Node, GraphError> {
    expect_type(j, &[ValueType::Float], "grad4")?;
    expect_type(ip, &[ValueType::Vec4], "grad4")?;

    let pxyz = (splat(ValueType::Vec3, j) * ip.xyz()).fract() * 7.0;
    let pxyz = pxyz.floor() * ip.z() - 1.0;
    let pw = 1.5 - pxyz.abs().dot([1.0, 1.0, 1.0]);
    let p = pxyz.extend(&pw);

    // 1.0 where p < 0
    let s = 1.0 - step(0.0, &p);
    let pxyz = &pxyz + (s.xyz() * 2.0 - 1.0) * s.w();
    Ok(pxyz.extend(pw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, float, vec4, EvalContext};

    fn eval(node: &Node) -> Vec<f32> {
        let ctx = EvalContext::new([0.0, 0.0], 0.0, [1.0, 1.0]);
        evaluate(node, &ctx).expect("evaluates").lanes().to_vec()
    }

    #[test]
    fn mod289_wraps_into_range() {
        let wrapped = eval(&mod289(&vec4(290.0, -1.0, 0.0, 578.5)).expect("vec4"));
        assert!((wrapped[0] - 1.0).abs() < 1e-3);
        assert!((wrapped[1] - 288.0).abs() < 1e-3);
        assert!(wrapped[2].abs() < 1e-6);
        assert!((wrapped[3] - 0.5).abs() < 1e-2);
    }

    #[test]
    fn scalar_permute_is_floored() {
        let value = eval(&permute(&float(2.5)).expect("float"))[0];
        assert_eq!(value, value.floor());
        assert_eq!(value, 215.0);
    }

    #[test]
    fn fade_fixes_endpoints() {
        assert_eq!(eval(&fade(&float(0.0)).expect("float"))[0], 0.0);
        assert!((eval(&fade(&float(1.0)).expect("float"))[0] - 1.0).abs() < 1e-6);
        assert!((eval(&fade(&float(0.5)).expect("float"))[0] - 0.5).abs() < 1e-6);
    }

    #[test]
    fn rejects_wrong_widths() {
        assert!(matches!(
            permute(&nodegraph::uv()),
            Err(GraphError::TypeMismatch { op: "permute", .. })
        ));
    }
}
