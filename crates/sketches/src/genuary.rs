//! Genuary prompts.
use std::f32::consts::PI;

use nodegraph::{
    float, fold, mix, resolution, smoothstep, step, time, uv, vec3, GraphError, LoopRange, Node,
};
use shadelib::color::cosine_palette;
use shadelib::function::screen_aspect_uv;
use shadelib::noise::simplex_noise_3d;

/// Day 1, "vertical or horizontal lines only": horizontal stripes that
/// thin towards the top, cut by a rocking diamond mask.
pub fn genuary1() -> Result<Node, GraphError> {
    let screen = uv();
    let centred = &screen - 0.5;
    let phase = (time() * 0.5).sin();

    let stripes = step(screen.y(), (centred.y() * 50.0).fract().abs());
    let outline = centred.x().abs() + centred.y().abs() + centred.y() * &phase;
    let mask = step(0.2, outline);

    let gradient = mix(
        vec3(0.5, 0.61, 0.81),
        vec3(0.92, 0.77, 0.84),
        screen.y() * 2.0 * &phase,
    );
    let striped = mix(gradient, [1.0, 1.0, 1.0], stripes);
    Ok(mix(striped, [1.0, 1.0, 1.0], mask))
}

const CONTOURS: f32 = 30.0;

/// Negative, scaled ridge of simplex noise along one axis.
fn ridge(o: &Node) -> Result<Node, GraphError> {
    let sample = simplex_noise_3d(&vec3(o * 25.0, 0.0, time() * 0.1))?;
    Ok(-(sample * 1.1 / 5.0).abs())
}

/// Day 30, "abstract map": stacked contour lines displaced by noise ridges,
/// brightest at the middle of the screen and masked to a central column.
pub fn genuary30() -> Result<Node, GraphError> {
    let coord = screen_aspect_uv(&resolution(), 0.5)?;
    let screen = uv();

    let arch = (screen.x() * PI).sin();
    let peak = arch.pow(15.0);
    let shoulder = arch.pow(3.0);
    let thickness = mix(0.00075, 0.0025, &peak);
    let tint = cosine_palette(
        &(shoulder + 1.75),
        [0.5, 0.5, 0.5],
        [0.5, 0.2, 0.25],
        [0.5, 0.5, 0.5],
        [2.0, 1.0, 0.0],
    )?;

    let [_, lines] = fold(
        LoopRange::new(0.0, CONTOURS),
        [coord.y(), vec3(0.0, 0.0, 0.0)],
        |i, [height, color]| {
            height.add_assign(0.01)?;
            let offset = &peak * ridge(&(coord.x() + i * 0.25))? * 0.25;
            let distance = (height.get() + offset - 0.25).abs();
            let line = (&thickness / distance).pow(1.2);
            color.add_assign(&tint * line)
        },
    )?;

    let hard = step(0.25, screen.x()) - step(0.75, screen.x());
    let soft = smoothstep(0.2, 0.35, screen.x()) - smoothstep(0.65, 0.8, screen.x());
    let black = vec3(0.0, 0.0, 0.0);
    let masked = mix(&black, lines, hard);
    Ok(mix(black, masked, soft))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, EvalContext, ValueType};

    #[test]
    fn genuary1_is_white_outside_the_mask() {
        let graph = genuary1().expect("builds");
        assert_eq!(graph.ty(), ValueType::Vec3);
        let corner = EvalContext::new([0.02, 0.02], 0.0, [64.0, 64.0]);
        let value = evaluate(&graph, &corner).expect("evaluates");
        assert!(value.lanes().iter().all(|c| (c - 1.0).abs() < 1e-6));
    }

    #[test]
    fn genuary30_is_black_at_the_edges() {
        let graph = genuary30().expect("builds");
        for x in [0.05, 0.95] {
            let ctx = EvalContext::new([x, 0.5], 1.0, [128.0, 72.0]);
            let value = evaluate(&graph, &ctx).expect("evaluates");
            assert!(value.lanes().iter().all(|c| *c == 0.0), "{x}: {:?}", value.lanes());
        }
    }

    #[test]
    fn genuary30_lights_the_centre() {
        let graph = genuary30().expect("builds");
        let ctx = EvalContext::new([0.5, 0.5], 1.0, [128.0, 72.0]);
        let value = evaluate(&graph, &ctx).expect("evaluates");
        assert!(value.lanes().iter().all(|c| c.is_finite() && *c > 0.0));
    }
}
