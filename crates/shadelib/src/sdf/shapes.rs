//! Signed distances: negative inside, zero on the boundary, positive
//! outside. Sphere, boxes and diamond are exact; the rest are the usual
//! bounds.
use nodegraph::{expect_type, select, vec2, GraphError, Node, ValueType};

use crate::float_param;

/// Circle (vec2) or sphere (vec3) of radius `radius` at the origin.
pub fn sd_sphere(p: &Node, radius: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2, ValueType::Vec3], "sd_sphere")?;
    let radius = float_param(radius, "sd_sphere")?;
    Ok(p.length() - radius)
}

/// Chebyshev square with half-extent `size`.
pub fn sd_box2d(p: &Node, size: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "sd_box2d")?;
    let size = float_param(size, "sd_box2d")?;
    Ok(p.x().abs().max(p.y().abs()) - size)
}

pub fn sd_box3d(p: &Node, half_extent: &Node) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec3], "sd_box3d")?;
    expect_type(half_extent, &[ValueType::Vec3], "sd_box3d")?;
    let q = p.abs() - half_extent;
    let inside = q.x().max(q.y().max(q.z())).min(0.0);
    Ok(q.max(0.0).length() + inside)
}

/// L1 ball of radius `radius`.
pub fn sd_diamond(p: &Node, radius: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "sd_diamond")?;
    let radius = float_param(radius, "sd_diamond")?;
    Ok(p.x().abs() + p.y().abs() - radius)
}

/// Flat-topped hexagon with inradius `radius`.
pub fn sd_hexagon(p: &Node, radius: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "sd_hexagon")?;
    let r = float_param(radius, "sd_hexagon")?;
    const K: [f32; 3] = [-0.866_025_4, 0.5, 0.577_350_27];

    let k_xy = vec2(K[0], K[1]);
    let q = p.abs();
    let q = &q - 2.0 * k_xy.dot(&q).min(0.0) * &k_xy;
    let q = &q - vec2(q.x().clamp(-K[2] * &r, K[2] * &r), &r);
    Ok(q.length() * q.y().sign())
}

pub fn sd_equilateral_triangle(p: &Node, radius: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "sd_equilateral_triangle")?;
    let r = float_param(radius, "sd_equilateral_triangle")?;
    let k = 3.0_f32.sqrt();

    let px = p.x().abs() - &r;
    let py = p.y() + &r / k;
    let reflected = vec2(&px - k * &py, -k * &px - &py) / 2.0;
    let q = select(&(&px + k * &py).gt(0.0), reflected, vec2(px, py));

    let qx = q.x() - q.x().clamp(-2.0 * &r, 0.0);
    Ok(-vec2(qx, q.y()).length() * q.y().sign())
}

/// Distance to the line `x = 0` along one axis.
pub fn sd_line(p: &Node) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Float], "sd_line")?;
    Ok(p.abs())
}

/// Unsigned distance to a circle of radius `radius`.
pub fn sd_ring(p: &Node, radius: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "sd_ring")?;
    let radius = float_param(radius, "sd_ring")?;
    Ok((p.length() - radius).abs())
}

pub fn sd_parallelogram(
    p: &Node,
    width: impl Into<Node>,
    height: impl Into<Node>,
    skew: impl Into<Node>,
) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "sd_parallelogram")?;
    let wi = float_param(width, "sd_parallelogram")?;
    let he = float_param(height, "sd_parallelogram")?;
    let sk = float_param(skew, "sd_parallelogram")?;

    let e = vec2(&sk, &he);
    let p = select(&p.y().lt(0.0), -p, p);

    let w = &p - &e;
    let w = vec2(w.x() - w.x().clamp(-&wi, &wi), w.y());
    let d = vec2(w.dot(&w), -w.y());

    let s = p.x() * e.y() - p.y() * e.x();
    let p = select(&s.lt(0.0), -&p, &p);

    let v = &p - vec2(&wi, 0.0);
    let v = &v - &e * (v.dot(&e) / e.dot(&e)).clamp(-1.0, 1.0);
    let d = d.min(vec2(v.dot(&v), &wi * &he - s.abs()));
    Ok(d.x().sqrt() * (-d.y()).sign())
}

/// Rhombus with half-diagonals `half_diagonals.x` and `half_diagonals.y`.
pub fn sd_rhombus(p: &Node, half_diagonals: &Node) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "sd_rhombus")?;
    expect_type(half_diagonals, &[ValueType::Vec2], "sd_rhombus")?;
    let b = half_diagonals;
    let ndot = |a: &Node, c: &Node| a.x() * c.x() - a.y() * c.y();

    let q = p.abs();
    let h = (ndot(&(b - 2.0 * &q), b) / b.dot(b)).clamp(-1.0, 1.0);
    let d = (&q - 0.5 * b * vec2(1.0 - &h, 1.0 + &h)).length();
    Ok(d * (q.x() * b.y() + q.y() * b.x() - b.x() * b.y()).sign())
}

/// Isosceles triangle bound; `size` controls the slope of the sides.
pub fn sd_triangle(p: &Node, size: impl Into<Node>) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "sd_triangle")?;
    let size = float_param(size, "sd_triangle")?;
    let sides = (p.x() * &size).abs() + p.y();
    let base = (p.y() * &size - 0.5).abs() - 0.5;
    Ok(sides.max(base))
}
