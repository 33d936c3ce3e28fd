use nodegraph::{expect_type, mix, splat, GraphError, Node, ValueType};

use crate::float_param;

fn direction(v: &Node, op: &'static str) -> Result<(), GraphError> {
    expect_type(v, &[ValueType::Vec3], op)
}

/// `(1 - max(0, view · normal)) ^ power`.
pub fn fresnel(view_dir: &Node, normal: &Node, power: impl Into<Node>) -> Result<Node, GraphError> {
    direction(view_dir, "fresnel")?;
    direction(normal, "fresnel")?;
    let power = float_param(power, "fresnel")?;
    Ok((1.0 - view_dir.dot(normal).max(0.0)).pow(power))
}

/// Blend from `ground` to `sky` by the normal's elevation.
pub fn hemi(normal: &Node, ground: &Node, sky: &Node) -> Result<Node, GraphError> {
    for v in [normal, ground, sky] {
        direction(v, "hemi")?;
    }
    Ok(mix(ground, sky, normal.y() * 0.5 + 0.5))
}

pub fn diffuse(light_dir: &Node, normal: &Node, light_color: &Node) -> Result<Node, GraphError> {
    for v in [light_dir, normal, light_color] {
        direction(v, "diffuse")?;
    }
    Ok(light_dir.dot(normal).max(0.0) * light_color)
}

/// Grey Phong highlight; 32 is the usual exponent.
pub fn phong_specular(
    view_dir: &Node,
    normal: &Node,
    light_dir: &Node,
    power: impl Into<Node>,
) -> Result<Node, GraphError> {
    for v in [view_dir, normal, light_dir] {
        direction(v, "phong_specular")?;
    }
    let power = float_param(power, "phong_specular")?;
    let reflected = (-light_dir).reflect(normal).normalize();
    let highlight = view_dir.dot(reflected).max(0.0).pow(power);
    Ok(splat(ValueType::Vec3, highlight))
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
    fn fresnel_is_zero_facing_and_one_grazing() {
        let n = vec3(0.0, 0.0, 1.0);
        assert_eq!(eval(&fresnel(&vec3(0.0, 0.0, 1.0), &n, 2.0).expect("vec3")), vec![0.0]);
        assert_eq!(eval(&fresnel(&vec3(1.0, 0.0, 0.0), &n, 2.0).expect("vec3")), vec![1.0]);
    }

    #[test]
    fn hemi_picks_sky_for_upward_normals() {
        let ground = vec3(0.2, 0.1, 0.0);
        let sky = vec3(0.3, 0.6, 1.0);
        let up = hemi(&vec3(0.0, 1.0, 0.0), &ground, &sky).expect("vec3");
        assert_eq!(eval(&up), vec![0.3, 0.6, 1.0]);
    }

    #[test]
    fn diffuse_ignores_back_faces() {
        let color = vec3(1.0, 0.5, 0.25);
        let lit = diffuse(&vec3(0.0, 1.0, 0.0), &vec3(0.0, 1.0, 0.0), &color).expect("vec3");
        assert_eq!(eval(&lit), vec![1.0, 0.5, 0.25]);
        let back = diffuse(&vec3(0.0, -1.0, 0.0), &vec3(0.0, 1.0, 0.0), &color).expect("vec3");
        assert_eq!(eval(&back), vec![0.0, 0.0, 0.0]);
    }

    #[test]
    fn specular_peaks_on_mirror_direction() {
        let n = vec3(0.0, 1.0, 0.0);
        let light = vec3(0.0, 1.0, 0.0);
        let spec = phong_specular(&vec3(0.0, 1.0, 0.0), &n, &light, 32.0).expect("vec3");
        for channel in eval(&spec) {
            assert!((channel - 1.0).abs() < 1e-5);
        }
    }
}
