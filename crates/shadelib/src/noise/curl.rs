use nodegraph::{construct, expect_type, vec3, GraphError, Node, ValueType};

use super::simplex::simplex_noise_3d;

/// Step used for the central differences.
pub const CURL_EPSILON: f32 = 1e-6;

/// Offset of the second gradient field.
const SECOND_FIELD_OFFSET: f32 = 3.5;

fn gradient_direction(p: &Node) -> Result<Node, GraphError> {
    let axes = [
        vec3(CURL_EPSILON, 0.0, 0.0),
        vec3(0.0, CURL_EPSILON, 0.0),
        vec3(0.0, 0.0, CURL_EPSILON),
    ];
    let mut partials = Vec::with_capacity(axes.len());
    for axis in &axes {
        let forward = simplex_noise_3d(&(p + axis))?;
        let backward = simplex_noise_3d(&(p - axis))?;
        partials.push((forward - backward) / (2.0 * CURL_EPSILON));
    }
    Ok(construct(ValueType::Vec3, partials).normalize())
}

/// Divergence-free vector field from two decorrelated simplex gradients.
///
/// The differences are taken in single precision, so far from the origin the
/// step vanishes and the result degrades to NaN.
pub fn curl_noise_3d(input: &Node) -> Result<Node, GraphError> {
    expect_type(input, &[ValueType::Vec3], "curl_noise_3d")?;
    let a = gradient_direction(input)?;
    let b = gradient_direction(&(input + SECOND_FIELD_OFFSET))?;
    Ok(a.cross(b).normalize())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, EvalContext};

    #[test]
    fn curl_is_unit_length_near_origin() {
        let ctx = EvalContext::new([0.0, 0.0], 0.0, [1.0, 1.0]);
        let curl = curl_noise_3d(&vec3(0.3, 0.2, 0.1)).expect("vec3 input");
        assert_eq!(curl.ty(), ValueType::Vec3);
        let value = evaluate(&curl, &ctx).expect("evaluates");
        let length = value.lanes().iter().map(|c| c * c).sum::<f32>().sqrt();
        assert!((length - 1.0).abs() < 1e-3, "length {length}");
    }

    #[test]
    fn curl_needs_a_vec3() {
        assert!(curl_noise_3d(&nodegraph::uv()).is_err());
    }
}
