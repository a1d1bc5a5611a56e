//! Grid addressing shared by both launchpad families.
//!
//! ```text
//!  y=8  (round buttons, control-change addressed)
//!  y=7  . . . . . . . . [x=8]
//!  ...
//!  y=0  . . . . . . . . [x=8]
//!      x=0            x=7
//! ```

use crate::error::{Error, Result};

/// Largest valid coordinate on either axis.
pub const GRID_MAX: u8 = 8;

/// Row index of the round scene buttons.
pub const SCENE_ROW: u8 = 8;

/// A validated (x, y) button coordinate, both in `[0, 8]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridPosition {
    x: u8,
    y: u8,
}

impl GridPosition {
    pub fn new(x: u8, y: u8) -> Result<Self> {
        if x > GRID_MAX || y > GRID_MAX {
            return Err(Error::InvalidCoordinate { x, y });
        }
        Ok(Self { x, y })
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    /// True for the round buttons addressed by control change instead of notes.
    pub fn is_scene_row(&self) -> bool {
        self.y == SCENE_ROW
    }
}

/// A button transition decoded from the input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Hit {
    pub x: u8,
    pub y: u8,
    /// true on press, false on release
    pub down: bool,
}

impl Hit {
    pub fn position(&self) -> Result<GridPosition> {
        GridPosition::new(self.x, self.y)
    }
}
