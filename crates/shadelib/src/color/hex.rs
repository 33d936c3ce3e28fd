use nodegraph::{GraphError, Node};

/// sRGB transfer curve, decoded to linear light.
pub fn srgb_to_linear(channel: f32) -> f32 {
    if channel <= 0.040_45 {
        channel / 12.92
    } else {
        ((channel + 0.055) / 1.055).powf(2.4)
    }
}

/// Parses `#rrggbb` or `#rgb` (the `#` is optional) into linear RGB.
pub fn parse_hex_color(text: &str) -> Result<[f32; 3], GraphError> {
    let invalid = || GraphError::InvalidLiteral(format!("`{text}` is not a #rrggbb colour"));
    let digits = text.trim().trim_start_matches('#');
    if !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(invalid());
    }
    let expanded: String = match digits.len() {
        6 => digits.to_owned(),
        3 => digits.chars().flat_map(|c| [c, c]).collect(),
        _ => return Err(invalid()),
    };
    let mut rgb = [0.0; 3];
    for (i, channel) in rgb.iter_mut().enumerate() {
        let byte = u8::from_str_radix(&expanded[i * 2..i * 2 + 2], 16).map_err(|_| invalid())?;
        *channel = srgb_to_linear(f32::from(byte) / 255.0);
    }
    Ok(rgb)
}

/// `parse_hex_color` as a vec3 literal node.
pub fn hex_color(text: &str) -> Result<Node, GraphError> {
    parse_hex_color(text).map(Node::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nodegraph::ValueType;

    #[test]
    fn decodes_endpoints_and_midtones() {
        assert_eq!(parse_hex_color("#000000").expect("valid"), [0.0, 0.0, 0.0]);
        for channel in parse_hex_color("ffffff").expect("valid") {
            assert!((channel - 1.0).abs() < 1e-6);
        }
        let grey = parse_hex_color("#808080").expect("valid")[0];
        assert!((grey - 0.2158605).abs() < 1e-5);
    }

    #[test]
    fn short_form_expands() {
        assert_eq!(
            parse_hex_color("#fa0").expect("valid"),
            parse_hex_color("#ffaa00").expect("valid")
        );
    }

    #[test]
    fn rejects_garbage() {
        for text in ["", "#12345", "#gggggg", "#1234567"] {
            assert!(matches!(
                parse_hex_color(text),
                Err(GraphError::InvalidLiteral(_))
            ));
        }
    }

    #[test]
    fn node_is_vec3() {
        assert_eq!(hex_color("#20b2aa").expect("valid").ty(), ValueType::Vec3);
    }
}
