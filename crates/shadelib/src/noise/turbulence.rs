use nodegraph::{expect_type, float, fold, mat2, GraphError, LoopRange, Node, ValueType};
use serde::Deserialize;

/// Settings for `turbulence`. `num` is the octave count.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct TurbulenceConfig {
    pub num: f32,
    pub amp: f32,
    pub speed: f32,
    pub freq: f32,
    pub exp: f32,
}

impl Default for TurbulenceConfig {
    fn default() -> Self {
        Self {
            num: 10.0,
            amp: 0.7,
            speed: 0.3,
            freq: 2.0,
            exp: 1.4,
        }
    }
}

fn octave_rotation() -> Node {
    mat2(0.6, -0.8, 0.8, 0.6)
}

/// Displaces `p` by a stack of rotated, scrolling sine waves (XorDev's
/// turbulence). Each octave reads the phase along the rotated y axis, shears
/// `p` along the rotation's first column, then rotates and rescales.
pub fn turbulence(p: &Node, time: &Node, config: &TurbulenceConfig) -> Result<Node, GraphError> {
    expect_type(p, &[ValueType::Vec2], "turbulence")?;
    expect_type(time, &[ValueType::Float], "turbulence")?;

    let [displaced, _, _] = fold(
        LoopRange::new(0.0, config.num),
        [p.clone(), octave_rotation(), float(config.freq)],
        |i, [pos, rot, freq]| {
            let phase = freq.get() * (pos.get() * rot.get()).y() + config.speed * time + i;
            let offset = config.amp * rot.get().column(0) * phase.sin() / freq.get();
            pos.add_assign(offset)?;
            rot.mul_assign(octave_rotation())?;
            freq.mul_assign(config.exp)?;
            Ok(())
        },
    )?;
    Ok(displaced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::{evaluate, time, uv, vec2, EvalContext};

    #[test]
    fn single_octave_matches_hand_computation() {
        let config = TurbulenceConfig {
            num: 1.0,
            ..TurbulenceConfig::default()
        };
        let node = turbulence(&vec2(0.5, 0.25), &time(), &config).expect("builds");
        let ctx = EvalContext::new([0.0, 0.0], 1.0, [1.0, 1.0]);
        let value = evaluate(&node, &ctx).expect("evaluates");

        // p * rot with rot columns (0.6, -0.8) and (0.8, 0.6)
        let rotated_y = 0.5 * 0.8 + 0.25 * 0.6;
        let phase: f32 = 2.0 * rotated_y + 0.3 * 1.0 + 0.0;
        let expected = [
            0.5 + 0.7 * 0.6 * phase.sin() / 2.0,
            0.25 + 0.7 * -0.8 * phase.sin() / 2.0,
        ];
        assert!((value.lanes()[0] - expected[0]).abs() < 1e-5);
        assert!((value.lanes()[1] - expected[1]).abs() < 1e-5);
    }

    #[test]
    fn zero_octaves_leave_p_unchanged() {
        let config = TurbulenceConfig {
            num: 0.0,
            ..TurbulenceConfig::default()
        };
        let node = turbulence(&vec2(0.3, 0.7), &time(), &config).expect("builds");
        let ctx = EvalContext::new([0.0, 0.0], 4.0, [1.0, 1.0]);
        assert_eq!(evaluate(&node, &ctx).expect("evaluates").lanes(), &[0.3, 0.7]);
    }

    #[test]
    fn keeps_vec2_type() {
        let node = turbulence(&uv(), &time(), &TurbulenceConfig::default()).expect("builds");
        assert_eq!(node.ty(), ValueType::Vec2);
        assert!(turbulence(&uv(), &uv(), &TurbulenceConfig::default()).is_err());
    }
}
