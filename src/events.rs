use std::fmt;

/// Logical level of the input line at one instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawLevel {
    High,
    Low,
}

impl fmt::Display for RawLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => f.write_str("high"),
            Self::Low => f.write_str("low"),
        }
    }
}

/// Which of the two configured images is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum DisplaySelection {
    #[default]
    First,
    Second,
}

impl DisplaySelection {
    /// Selection mirrored by a confirmed level under the pull-up convention:
    /// released (high) shows the first image, pressed (low) the second.
    pub fn for_level(level: RawLevel) -> Self {
        match level {
            RawLevel::High => Self::First,
            RawLevel::Low => Self::Second,
        }
    }

    pub fn other(self) -> Self {
        match self {
            Self::First => Self::Second,
            Self::Second => Self::First,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Self::First => 0,
            Self::Second => 1,
        }
    }
}

impl fmt::Display for DisplaySelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::First => f.write_str("first"),
            Self::Second => f.write_str("second"),
        }
    }
}

/// Instruction to the rendering surface to paint one of the scaled images.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderCommand(pub DisplaySelection);
