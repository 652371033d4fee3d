use crate::config::Config;
use crate::error::Error;

const LESS: u8 = b'<';
const GREATER: u8 = b'>';
const PLUS: u8 = b'+';
const MINUS: u8 = b'-';
const DOT: u8 = b'.';
const COMMA: u8 = b',';
const LBRACKET: u8 = b'[';
const RBRACKET: u8 = b']';

/// One of the eight meaningful source characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    Right,
    Left,
    Inc,
    Dec,
    Output,
    Input,
    LoopStart,
    LoopEnd,
}

impl Command {
    /// Decode a source byte. Every byte outside the command set is inert.
    #[inline(always)]
    pub fn decode(byte: u8) -> Option<Command> {
        match byte {
            GREATER => Some(Command::Right),
            LESS => Some(Command::Left),
            PLUS => Some(Command::Inc),
            MINUS => Some(Command::Dec),
            DOT => Some(Command::Output),
            COMMA => Some(Command::Input),
            LBRACKET => Some(Command::LoopStart),
            RBRACKET => Some(Command::LoopEnd),
            _ => None,
        }
    }

    /// Commands whose repetitions collapse into one counted operation.
    fn is_repeatable(self) -> bool {
        matches!(
            self,
            Command::Right | Command::Left | Command::Inc | Command::Dec
        )
    }
}

/// A run-length compressed operation.
///
/// Counts are always at least 1. Loop markers carry the byte offset of their
/// bracket so callers can report structural errors precisely.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Right(usize),
    Left(usize),
    Inc(usize),
    Dec(usize),
    Output,
    Input,
    LoopStart { position: usize },
    LoopEnd { position: usize },
}

/// An immutable program source, bounded by `Config::max_program_size`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Program {
    source: Vec<u8>,
}

impl Program {
    /// Take ownership of `source`, rejecting programs over the configured size.
    ///
    /// The length is explicit: NUL and any other byte are ordinary inert
    /// characters, never an end-of-file marker.
    pub fn new(source: impl Into<Vec<u8>>, config: &Config) -> Result<Self, Error> {
        let source = source.into();
        if source.len() > config.max_program_size {
            return Err(Error::ProgramTooLarge {
                len: source.len(),
                max: config.max_program_size,
            });
        }
        let program = Self { source };
        log::debug!(
            "loaded program of {} bytes, {} commands",
            program.len(),
            program.command_count()
        );
        Ok(program)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.source
    }

    pub fn len(&self) -> usize {
        self.source.len()
    }

    pub fn is_empty(&self) -> bool {
        self.source.is_empty()
    }

    /// Returns true if `byte` is one of the eight commands.
    pub fn is_command(byte: u8) -> bool {
        Command::decode(byte).is_some()
    }

    /// Number of command bytes; everything else is commentary.
    pub fn command_count(&self) -> usize {
        self.source.iter().filter(|&&b| Self::is_command(b)).count()
    }

    /// Iterate over the run-length compressed operations of this program.
    pub fn ops(&self) -> Ops<'_> {
        Ops {
            source: &self.source,
            pos: 0,
        }
    }

    /// Build a bracket-match lookup table for the program.
    ///
    /// `result[i]` is the offset of the bracket matching the one at `i`.
    /// Entries for non-bracket offsets are `usize::MAX`.
    pub fn jump_table(&self) -> Result<Vec<usize>, Error> {
        let mut table = vec![usize::MAX; self.source.len()];
        let mut stack = Vec::new();

        for (i, &byte) in self.source.iter().enumerate() {
            match byte {
                LBRACKET => stack.push(i),
                RBRACKET => {
                    let open = stack.pop().ok_or(Error::UnbalancedClose { position: i })?;
                    table[open] = i;
                    table[i] = open;
                }
                _ => {}
            }
        }

        match stack.pop() {
            Some(position) => Err(Error::UnbalancedOpen { position }),
            None => Ok(table),
        }
    }
}

/// Iterator returned by [`Program::ops`].
pub struct Ops<'a> {
    source: &'a [u8],
    pos: usize,
}

impl Iterator for Ops<'_> {
    type Item = Op;

    fn next(&mut self) -> Option<Op> {
        let (start, command) = loop {
            let &byte = self.source.get(self.pos)?;
            self.pos += 1;
            if let Some(command) = Command::decode(byte) {
                break (self.pos - 1, command);
            }
        };

        if !command.is_repeatable() {
            return Some(match command {
                Command::Output => Op::Output,
                Command::Input => Op::Input,
                Command::LoopStart => Op::LoopStart { position: start },
                _ => Op::LoopEnd { position: start },
            });
        }

        // Extend the run over identical commands, stepping over inert bytes.
        let mut count = 1;
        let mut scan = self.pos;
        while let Some(&byte) = self.source.get(scan) {
            match Command::decode(byte) {
                Some(next) if next == command => {
                    count += 1;
                    self.pos = scan + 1;
                }
                Some(_) => break,
                None => {}
            }
            scan += 1;
        }
        if scan == self.source.len() {
            self.pos = scan;
        }

        Some(match command {
            Command::Right => Op::Right(count),
            Command::Left => Op::Left(count),
            Command::Inc => Op::Inc(count),
            _ => Op::Dec(count),
        })
    }
}
