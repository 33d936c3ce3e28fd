use nodegraph::{atan2, expect_type, mix, smoothstep, vec2, GraphError, Node, ValueType};

pub fn cartesian_to_polar(p: &Node) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "cartesian_to_polar")?;
    Ok(vec2(p.length(), atan2(p.y(), p.x())))
}

/// Inverse of `cartesian_to_polar` for `(radius, angle)`.
pub fn polar_to_cartesian(p: &Node) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "polar_to_cartesian")?;
    let (r, theta) = (p.x(), p.y());
    Ok(vec2(&r * theta.cos(), &r * theta.sin()))
}

/// Anchor points of the four gradient colours, in uv space.
const CORNERS: [[f32; 2]; 4] = [[0.31, 0.3], [0.7, 0.32], [0.28, 0.71], [0.72, 0.75]];

fn sub(a: [f32; 2], b: [f32; 2]) -> [f32; 2] {
    [a[0] - b[0], a[1] - b[1]]
}

/// Bilinear blend of four colours anchored at a slightly skewed
/// quadrilateral. `st` is inverted through the quad to `(u, t)`, both
/// clamped and smoothstepped; colours are returned as opaque vec4.
pub fn four_color_gradient(st: &Node, colors: [&Node; 4]) -> Result<Node, GraphError> {
    let op = "four_color_gradient";
    expect_type(st, &[ValueType::Vec2], op)?;
    for color in colors {
        expect_type(color, &[ValueType::Vec3], op)?;
    }

    let [p0, p1, p2, p3] = CORNERS;
    let q = sub(p0, p2);
    let r = sub(p1, p0);
    let s = [r[0] + p2[0] - p3[0], r[1] + p2[1] - p3[1]];
    let t = Node::from(p0) - st;
    let (tx, ty) = (t.x(), t.y());

    // The quad is fixed, so the degenerate-case branches resolve here.
    let (u, v) = if q[0] == 0.0 && s[0] == 0.0 {
        let u = -&tx / r[0];
        let v = (&ty + &u * r[1]) / (q[1] + &u * s[1]);
        (u, v)
    } else if q[1] == 0.0 && s[1] == 0.0 {
        let u = -&ty / r[1];
        let v = (&tx + &u * r[0]) / (q[0] + &u * s[0]);
        (u, v)
    } else {
        let a = s[0] * r[1] - r[0] * s[1];
        let b = s[0] * &ty - &tx * s[1] + (q[0] * r[1] - r[0] * q[1]);
        let c = q[0] * &ty - &tx * q[1];
        let u = if a.abs() < 1e-4 {
            -c / &b
        } else {
            (-&b + (&b * &b - 4.0 * a * c).sqrt()) / (2.0 * a)
        };
        let v = (&ty + &u * r[1]) / (q[1] + &u * s[1]);
        (u, v)
    };

    let u = smoothstep(0.0, 1.0, u.clamp(0.0, 1.0));
    let v = smoothstep(0.0, 1.0, v.clamp(0.0, 1.0));
    let [c0, c1, c2, c3] = colors.map(|color| color.extend(1.0));
    let top = mix(c0, c1, &u);
    let bottom = mix(c2, c3, &u);
    Ok(mix(top, bottom, v))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, vec3, EvalContext};

    fn eval(node: &Node) -> Vec<f32> {
        let ctx = EvalContext::new([0.0, 0.0], 0.0, [1.0, 1.0]);
        evaluate(node, &ctx).expect("evaluates").lanes().to_vec()
    }

    #[test]
    fn polar_round_trip() {
        for p in [[0.5, 0.25], [-1.0, 0.3], [0.0, -2.0], [-0.7, -0.7], [3.0, 0.0]] {
            let back = polar_to_cartesian(
                &cartesian_to_polar(&Node::from(p)).expect("vec2"),
            )
            .expect("vec2");
            let value = eval(&back);
            assert!((value[0] - p[0]).abs() < 1e-5 && (value[1] - p[1]).abs() < 1e-5);
        }
    }

    #[test]
    fn gradient_hits_corner_colours() {
        let red = vec3(1.0, 0.0, 0.0);
        let green = vec3(0.0, 1.0, 0.0);
        let blue = vec3(0.0, 0.0, 1.0);
        let white = vec3(1.0, 1.0, 1.0);
        let colors = [&red, &green, &blue, &white];

        let at_first = four_color_gradient(&vec2(0.31, 0.3), colors).expect("builds");
        let value = eval(&at_first);
        assert!((value[0] - 1.0).abs() < 1e-3 && value[1].abs() < 1e-3);
        assert_eq!(value[3], 1.0);

        let at_last = four_color_gradient(&vec2(0.72, 0.75), colors).expect("builds");
        let value = eval(&at_last);
        assert!(value[..3].iter().all(|c| (c - 1.0).abs() < 1e-3));
    }
}
