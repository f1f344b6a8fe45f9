/// Limits applied while reducing a program.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Config {
    /// Most dice a single roll may draw.
    pub max_dice: u64,
    /// Deepest nesting of reductions before giving up.
    pub max_depth: usize,
    /// Total reductions allowed in one run.
    pub max_steps: usize,
}

impl Config {
    pub const DEFAULT_MAX_DICE: u64 = 1000;
    pub const DEFAULT_MAX_DEPTH: usize = 4096;
    pub const DEFAULT_MAX_STEPS: usize = 1_000_000;

    pub fn with_max_dice(self, max_dice: u64) -> Self {
        Self { max_dice, ..self }
    }

    pub fn with_max_depth(self, max_depth: usize) -> Self {
        Self { max_depth, ..self }
    }

    pub fn with_max_steps(self, max_steps: usize) -> Self {
        Self { max_steps, ..self }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_dice: Self::DEFAULT_MAX_DICE,
            max_depth: Self::DEFAULT_MAX_DEPTH,
            max_steps: Self::DEFAULT_MAX_STEPS,
        }
    }
}
