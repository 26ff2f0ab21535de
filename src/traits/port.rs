//! Input line port
//!
//! Board-specific pin reading stays outside the crate. The node only asks for
//! the current levels of its debounced lines, bit `n` for line `n`.

/// Source of debounced line levels
pub trait LinePort {
    /// Current line levels, bit `n` for line `n`
    fn sample(&self) -> u8;
}

impl<F> LinePort for F
where
    F: Fn() -> u8,
{
    fn sample(&self) -> u8 {
        self()
    }
}

/// Port for nodes without debounced lines; always reads low
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLines;

impl LinePort for NoLines {
    fn sample(&self) -> u8 {
        0
    }
}
