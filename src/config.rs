use crate::error::Error;

/// What `,` stores when standard input is exhausted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EofPolicy {
    /// Store 0xFF, the C `EOF` value truncated to a byte.
    #[default]
    Sentinel,
    /// Store 0.
    Zero,
    /// Leave the current cell untouched.
    Unchanged,
}

/// What happens when the pointer is moved past either end of the tape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerPolicy {
    /// Wrap modulo the tape length.
    #[default]
    Wrap,
    /// Abort the run with `Error::PointerOutOfBounds`.
    Fault,
}

/// Capacities and runtime policies shared by the interpreter and the emitter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Longest program accepted, in bytes.
    pub max_program_size: usize,
    /// Number of cells on the tape (and in the emitted data segment).
    pub tape_size: usize,
    /// Deepest loop nesting the emitter accepts.
    pub max_nesting: usize,
    /// Behaviour of `,` at end of input.
    pub eof: EofPolicy,
    /// Behaviour of `<` / `>` at the tape edges.
    pub pointer: PointerPolicy,
    /// Maximum number of commands the interpreter executes (`None` = unbounded).
    pub step_limit: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_program_size: 30_000,
            tape_size: 30_000,
            max_nesting: 32,
            eof: EofPolicy::Sentinel,
            pointer: PointerPolicy::Wrap,
            step_limit: None,
        }
    }
}

impl Config {
    /// Largest tape a single 16-bit data segment can hold.
    pub const MAX_SEGMENT_CELLS: usize = 1 << 16;

    /// Reject capacities neither consumer can work with.
    pub fn validate(&self) -> Result<(), Error> {
        if self.tape_size == 0 {
            return Err(Error::InvalidConfig("tape size must be positive".to_string()));
        }
        if self.max_nesting == 0 {
            return Err(Error::InvalidConfig(
                "nesting capacity must be positive".to_string(),
            ));
        }
        Ok(())
    }
}
