//! Simplex noise on the 3D and 4D lattices (Ashima Arts / Ian McEwan
//! formulation). Both return a float in roughly [-1, 1].
use nodegraph::{
    construct, expect_type, splat, step, vec2, vec3, vec4, GraphError, Node, ValueType,
};

use super::common::{grad4, mod289, permute, taylor_inv_sqrt};

pub fn simplex_noise_3d(v: &Node) -> Result<Node, GraphError> {
    expect_type(v, &[ValueType::Vec3], "simplex_noise_3d")?;
    const C_X: f32 = 1.0 / 6.0;
    const C_Y: f32 = 1.0 / 3.0;

    // first corner
    let i = (v + v.dot(splat(ValueType::Vec3, C_Y))).floor();
    let x0 = v - &i + i.dot(splat(ValueType::Vec3, C_X));

    // other corners
    let g = step(x0.swizzle("yzx"), &x0);
    let l = 1.0 - &g;
    let l_zxy = l.swizzle("zxy");
    let i1 = g.min(&l_zxy);
    let i2 = g.max(&l_zxy);
    let x1 = &x0 - &i1 + C_X;
    let x2 = &x0 - &i2 + C_Y;
    let x3 = &x0 - 0.5;

    let i = mod289(&i)?;
    let p = permute(&(i.z() + vec4(0.0, i1.z(), i2.z(), 1.0)))?;
    let p = permute(&(p + i.y() + vec4(0.0, i1.y(), i2.y(), 1.0)))?;
    let p = permute(&(p + i.x() + vec4(0.0, i1.x(), i2.x(), 1.0)))?;

    // gradients: 7x7 points over a square, mapped onto an octahedron
    let n = 1.0 / 7.0;
    let (ns_x, ns_y, ns_z) = (n * 2.0, n * 0.5 - 1.0, n);
    let j = &p - 49.0 * (&p * (ns_z * ns_z)).floor();
    let x_ = (&j * ns_z).floor();
    let y_ = (&j - 7.0 * &x_).floor();
    let x = &x_ * ns_x + ns_y;
    let y = &y_ * ns_x + ns_y;
    let h = 1.0 - x.abs() - y.abs();

    let b0 = construct(ValueType::Vec4, [x.xy(), y.xy()]);
    let b1 = construct(ValueType::Vec4, [x.swizzle("zw"), y.swizzle("zw")]);
    let s0 = b0.floor() * 2.0 + 1.0;
    let s1 = b1.floor() * 2.0 + 1.0;
    let sh = -step(&h, splat(ValueType::Vec4, 0.0));

    let a0 = b0.swizzle("xzyw") + s0.swizzle("xzyw") * sh.swizzle("xxyy");
    let a1 = b1.swizzle("xzyw") + s1.swizzle("xzyw") * sh.swizzle("zzww");

    let p0 = a0.xy().extend(h.x());
    let p1 = a0.swizzle("zw").extend(h.y());
    let p2 = a1.xy().extend(h.z());
    let p3 = a1.swizzle("zw").extend(h.w());

    let norm = taylor_inv_sqrt(&vec4(p0.dot(&p0), p1.dot(&p1), p2.dot(&p2), p3.dot(&p3)))?;
    let p0 = p0 * norm.x();
    let p1 = p1 * norm.y();
    let p2 = p2 * norm.z();
    let p3 = p3 * norm.w();

    let m = (0.6 - vec4(x0.dot(&x0), x1.dot(&x1), x2.dot(&x2), x3.dot(&x3))).max(0.0);
    let m = &m * &m;
    Ok(42.0 * (&m * &m).dot(vec4(p0.dot(&x0), p1.dot(&x1), p2.dot(&x2), p3.dot(&x3))))
}

pub fn simplex_noise_4d(v: &Node) -> Result<Node, GraphError> {
    expect_type(v, &[ValueType::Vec4], "simplex_noise_4d")?;
    const C_X: f32 = 0.138_196_6;
    const C_Y: f32 = 0.309_017;

    let i = (v + v.dot(splat(ValueType::Vec4, C_Y))).floor();
    let x0 = v - &i + i.dot(splat(ValueType::Vec4, C_X));

    // rank sorting decides which corner to visit next
    let is_x = step(x0.swizzle("yzw"), x0.swizzle("xxx"));
    let is_yz = step(x0.swizzle("zww"), x0.swizzle("yyz"));
    let i0 = vec4(
        is_x.x() + is_x.y() + is_x.z(),
        (1.0 - is_x.x()) + is_yz.x() + is_yz.y(),
        (1.0 - is_x.y()) + (1.0 - is_yz.x()) + is_yz.z(),
        (1.0 - is_x.z()) + (1.0 - is_yz.y()) + (1.0 - is_yz.z()),
    );
    let i3 = i0.clamp(0.0, 1.0);
    let i2 = (&i0 - 1.0).clamp(0.0, 1.0);
    let i1 = (&i0 - 2.0).clamp(0.0, 1.0);

    let x1 = &x0 - &i1 + C_X;
    let x2 = &x0 - &i2 + 2.0 * C_X;
    let x3 = &x0 - &i3 + 3.0 * C_X;
    let x4 = &x0 - 1.0 + 4.0 * C_X;

    let i = &i % 289.0;
    let j0 = permute(&i.w())?;
    let j0 = permute(&(j0 + i.z()))?;
    let j0 = permute(&(j0 + i.y()))?;
    let j0 = permute(&(j0 + i.x()))?;

    let j1 = permute(&(i.w() + vec4(i1.w(), i2.w(), i3.w(), 1.0)))?;
    let j1 = permute(&(j1 + i.z() + vec4(i1.z(), i2.z(), i3.z(), 1.0)))?;
    let j1 = permute(&(j1 + i.y() + vec4(i1.y(), i2.y(), i3.y(), 1.0)))?;
    let j1 = permute(&(j1 + i.x() + vec4(i1.x(), i2.x(), i3.x(), 1.0)))?;

    let ip: Node = [1.0 / 294.0, 1.0 / 49.0, 1.0 / 7.0, 0.0].into();
    let p0 = grad4(&j0, &ip)?;
    let p1 = grad4(&j1.x(), &ip)?;
    let p2 = grad4(&j1.y(), &ip)?;
    let p3 = grad4(&j1.z(), &ip)?;
    let p4 = grad4(&j1.w(), &ip)?;

    let norm = taylor_inv_sqrt(&vec4(p0.dot(&p0), p1.dot(&p1), p2.dot(&p2), p3.dot(&p3)))?;
    let p0 = p0 * norm.x();
    let p1 = p1 * norm.y();
    let p2 = p2 * norm.z();
    let p3 = p3 * norm.w();
    let p4 = &p4 * taylor_inv_sqrt(&p4.dot(&p4))?;

    let m0 = (0.6 - vec3(x0.dot(&x0), x1.dot(&x1), x2.dot(&x2))).max(0.0);
    let m1 = (0.6 - vec2(x3.dot(&x3), x4.dot(&x4))).max(0.0);
    let m0 = &m0 * &m0;
    let m1 = &m1 * &m1;

    let near = (&m0 * &m0).dot(vec3(p0.dot(&x0), p1.dot(&x1), p2.dot(&x2)));
    let far = (&m1 * &m1).dot(vec2(p3.dot(&x3), p4.dot(&x4)));
    Ok(49.0 * (near + far))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{emit_wgsl, evaluate, time, uv, EvalContext};

    fn sample_grid() -> impl Iterator<Item = (f32, f32, f32)> {
        (0..6).flat_map(|a| {
            (0..6).flat_map(move |b| {
                (0..3).map(move |c| (a as f32 * 0.37 - 1.1, b as f32 * 0.53 + 0.2, c as f32 * 1.7))
            })
        })
    }

    #[test]
    fn simplex_3d_stays_in_range_and_varies() {
        let ctx = EvalContext::new([0.0, 0.0], 0.0, [1.0, 1.0]);
        let mut seen = Vec::new();
        for (x, y, z) in sample_grid() {
            let noise = simplex_noise_3d(&vec3(x, y, z)).expect("vec3 input");
            let value = evaluate(&noise, &ctx).expect("evaluates").as_f32();
            assert!(value.is_finite());
            assert!(value.abs() <= 1.05, "noise {value} out of range at ({x}, {y}, {z})");
            seen.push(value);
        }
        let spread = seen.iter().cloned().fold(f32::MIN, f32::max)
            - seen.iter().cloned().fold(f32::MAX, f32::min);
        assert!(spread > 0.1);
    }

    #[test]
    fn simplex_4d_stays_in_range() {
        let ctx = EvalContext::new([0.0, 0.0], 0.0, [1.0, 1.0]);
        for (x, y, z) in sample_grid() {
            let noise = simplex_noise_4d(&vec4(x, y, z, x * 0.5)).expect("vec4 input");
            let value = evaluate(&noise, &ctx).expect("evaluates").as_f32();
            assert!(value.is_finite());
            assert!(value.abs() <= 1.1, "noise {value} out of range");
        }
    }

    #[test]
    fn simplex_is_deterministic() {
        let ctx = EvalContext::new([0.3, 0.6], 1.0, [1.0, 1.0]);
        let noise = simplex_noise_3d(&uv().extend(time())).expect("vec3 input");
        let first = evaluate(&noise, &ctx).expect("evaluates");
        let second = evaluate(&noise, &ctx).expect("evaluates");
        assert_eq!(first, second);
    }

    #[test]
    fn lowers_to_valid_wgsl() {
        let noise = simplex_noise_3d(&(uv() * 4.0).extend(time())).expect("vec3 input");
        let module = emit_wgsl(&noise).expect("emits");
        let parsed = naga::front::wgsl::parse_str(&module.source).expect("parses");
        naga::valid::Validator::new(
            naga::valid::ValidationFlags::all(),
            naga::valid::Capabilities::all(),
        )
        .validate(&parsed)
        .expect("validates");
    }

    #[test]
    fn rejects_wrong_input_width() {
        assert!(simplex_noise_3d(&uv()).is_err());
        assert!(simplex_noise_4d(&uv().extend(1.0)).is_err());
    }
}
