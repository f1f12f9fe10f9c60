use std::fmt;
use std::ops::Add;

use serde::{Deserialize, Serialize};

/// Integer screen vector, used for movement per tick and render offsets.
///
/// Serialized as a two-element array `[dx, dy]`, matching the asset format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(from = "[i32; 2]", into = "[i32; 2]")]
pub struct Vector {
    pub dx: i32,
    pub dy: i32,
}

impl Vector {
    pub const ZERO: Vector = Vector { dx: 0, dy: 0 };

    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }
}

impl From<[i32; 2]> for Vector {
    fn from([dx, dy]: [i32; 2]) -> Self {
        Self { dx, dy }
    }
}

impl From<Vector> for [i32; 2] {
    fn from(v: Vector) -> Self {
        [v.dx, v.dy]
    }
}

/// Live position of the pet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl Add<Vector> for Position {
    type Output = Position;

    fn add(self, v: Vector) -> Position {
        Position {
            x: self.x.saturating_add(v.dx),
            y: self.y.saturating_add(v.dy),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Display size of a state, serialized as `[w, h]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(from = "[u16; 2]", into = "[u16; 2]")]
pub struct Dimensions {
    pub w: u16,
    pub h: u16,
}

impl Dimensions {
    pub const fn new(w: u16, h: u16) -> Self {
        Self { w, h }
    }
}

impl From<[u16; 2]> for Dimensions {
    fn from([w, h]: [u16; 2]) -> Self {
        Self { w, h }
    }
}

impl From<Dimensions> for [u16; 2] {
    fn from(d: Dimensions) -> Self {
        [d.w, d.h]
    }
}

/// External trigger kinds an event can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    Click,
    RightClick,
}

impl Trigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            Trigger::Click => "click",
            Trigger::RightClick => "right_click",
        }
    }
}

impl fmt::Display for Trigger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Trigger {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

// Accepts the Tk-style button names older asset packs use.
impl<'de> Deserialize<'de> for Trigger {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        match s.as_str() {
            "click" | "left_click" | "<Button-1>" => Ok(Trigger::Click),
            "right_click" | "<Button-3>" => Ok(Trigger::RightClick),
            _ => Err(serde::de::Error::custom(format!("Unknown trigger: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_add_vector() {
        let p = Position::new(10, 5) + Vector::new(2, -1);
        assert_eq!(p, Position::new(12, 4));
    }

    #[test]
    fn test_vector_from_array() {
        let v: Vector = serde_json::from_str("[3, -4]").unwrap();
        assert_eq!(v, Vector::new(3, -4));
        assert_eq!(serde_json::to_string(&v).unwrap(), "[3,-4]");
    }

    #[test]
    fn test_dimensions_from_array() {
        let d: Dimensions = serde_json::from_str("[20, 8]").unwrap();
        assert_eq!(d, Dimensions::new(20, 8));
    }

    #[test]
    fn test_trigger_aliases() {
        let t: Trigger = serde_json::from_str("\"click\"").unwrap();
        assert_eq!(t, Trigger::Click);
        let t: Trigger = serde_json::from_str("\"<Button-1>\"").unwrap();
        assert_eq!(t, Trigger::Click);
        let t: Trigger = serde_json::from_str("\"right_click\"").unwrap();
        assert_eq!(t, Trigger::RightClick);
        assert!(serde_json::from_str::<Trigger>("\"hover\"").is_err());
    }
}
