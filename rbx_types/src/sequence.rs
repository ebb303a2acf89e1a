use crate::basic_types::Color3;

/// One keypoint of a `NumberSequence`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberSequenceKeypoint {
    pub time: f32,
    pub value: f32,
    pub envelope: f32,
}

impl NumberSequenceKeypoint {
    pub fn new(time: f32, value: f32, envelope: f32) -> Self {
        NumberSequenceKeypoint {
            time,
            value,
            envelope,
        }
    }
}

/// An ordered list of `NumberSequenceKeypoint`s, used to animate a scalar
/// value (like particle size) over a [0, 1] time range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NumberSequence {
    pub keypoints: Vec<NumberSequenceKeypoint>,
}

/// One keypoint of a `ColorSequence`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorSequenceKeypoint {
    pub time: f32,
    pub color: Color3,
    pub envelope: f32,
}

impl ColorSequenceKeypoint {
    pub fn new(time: f32, color: Color3, envelope: f32) -> Self {
        ColorSequenceKeypoint {
            time,
            color,
            envelope,
        }
    }
}

/// An ordered list of `ColorSequenceKeypoint`s, used to animate a color (like
/// particle tint) over a [0, 1] time range.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorSequence {
    pub keypoints: Vec<ColorSequenceKeypoint>,
}
