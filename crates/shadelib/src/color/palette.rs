use nodegraph::{expect_type, GraphError, Node, ValueType};

/// Default angular scale of `cosine_palette`, 2π to five places.
pub const PALETTE_SCALE: f32 = 6.28318;

/// `a + b * cos(PALETTE_SCALE * (c * t + d))`. Each channel stays within
/// `[a - |b|, a + |b|]`.
pub fn cosine_palette(
    t: &Node,
    a: impl Into<Node>,
    b: impl Into<Node>,
    c: impl Into<Node>,
    d: impl Into<Node>,
) -> Result<Node, GraphError> {
    cosine_palette_scaled(t, a, b, c, d, PALETTE_SCALE)
}

/// `cosine_palette` with an explicit scale `e` (float or vec3).
pub fn cosine_palette_scaled(
    t: &Node,
    a: impl Into<Node>,
    b: impl Into<Node>,
    c: impl Into<Node>,
    d: impl Into<Node>,
    e: impl Into<Node>,
) -> Result<Node, GraphError> {
    let op = "cosine_palette";
    expect_type(t, &[ValueType::Float, ValueType::Vec3], op)?;
    let [a, b, c, d] = [a.into(), b.into(), c.into(), d.into()];
    for coefficient in [&a, &b, &c, &d] {
        expect_type(coefficient, &[ValueType::Vec3], op)?;
    }
    let e = e.into();
    expect_type(&e, &[ValueType::Float, ValueType::Vec3], op)?;

    Ok(a + b * (e * (c * t + d)).cos())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, time, EvalContext};
    use rand::{rngs::StdRng, Rng, SeedableRng};

    #[test]
    fn channels_stay_within_amplitude() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let mut triple = || -> [f32; 3] { std::array::from_fn(|_| rng.gen_range(-1.0..1.0)) };
            let (a, b, c, d) = (triple(), triple(), triple(), triple());
            let palette = cosine_palette(&time(), a, b, c, d).expect("vec3 coefficients");
            for t in [-3.0, 0.0, 0.37, 1.0, 12.5] {
                let ctx = EvalContext::new([0.0, 0.0], t, [1.0, 1.0]);
                let value = evaluate(&palette, &ctx).expect("evaluates");
                for (i, channel) in value.lanes().iter().enumerate() {
                    let low = a[i] - b[i].abs() - 1e-5;
                    let high = a[i] + b[i].abs() + 1e-5;
                    assert!((low..=high).contains(channel), "{channel} not in [{low}, {high}]");
                }
            }
        }
    }

    #[test]
    fn coefficients_must_be_vec3() {
        let err = cosine_palette(&time(), [0.5, 0.5], [0.5, 0.5, 0.5], [1.0; 3], [0.0; 3]);
        assert!(matches!(err, Err(GraphError::TypeMismatch { op: "cosine_palette", .. })));
    }
}
