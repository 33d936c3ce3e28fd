use std::fmt;

use serde::Serialize;

/// Static type of a node. Every node carries exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    Bool,
    Int,
    Float,
    Vec2,
    Vec3,
    Vec4,
    /// Column-major 2x2 float matrix.
    Mat2,
}

impl ValueType {
    pub fn lanes(self) -> usize {
        match self {
            ValueType::Bool | ValueType::Int | ValueType::Float => 1,
            ValueType::Vec2 => 2,
            ValueType::Vec3 => 3,
            ValueType::Vec4 | ValueType::Mat2 => 4,
        }
    }

    pub fn is_scalar(self) -> bool {
        matches!(self, ValueType::Bool | ValueType::Int | ValueType::Float)
    }

    pub fn is_vector(self) -> bool {
        matches!(self, ValueType::Vec2 | ValueType::Vec3 | ValueType::Vec4)
    }

    /// Float scalar or float vector: the domain of componentwise intrinsics.
    pub fn is_float_like(self) -> bool {
        self == ValueType::Float || self.is_vector()
    }

    pub fn is_numeric(self) -> bool {
        !matches!(self, ValueType::Bool)
    }

    /// Float type with the given lane count (1 maps to `Float`).
    pub fn float_with_lanes(lanes: usize) -> Option<ValueType> {
        match lanes {
            1 => Some(ValueType::Float),
            2 => Some(ValueType::Vec2),
            3 => Some(ValueType::Vec3),
            4 => Some(ValueType::Vec4),
            _ => None,
        }
    }

    pub fn wgsl_name(self) -> &'static str {
        match self {
            ValueType::Bool => "bool",
            ValueType::Int => "i32",
            ValueType::Float => "f32",
            ValueType::Vec2 => "vec2<f32>",
            ValueType::Vec3 => "vec3<f32>",
            ValueType::Vec4 => "vec4<f32>",
            ValueType::Mat2 => "mat2x2<f32>",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueType::Bool => "bool",
            ValueType::Int => "int",
            ValueType::Float => "float",
            ValueType::Vec2 => "vec2",
            ValueType::Vec3 => "vec3",
            ValueType::Vec4 => "vec4",
            ValueType::Mat2 => "mat2",
        };
        f.write_str(name)
    }
}
