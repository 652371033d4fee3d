use std::fmt;

use crate::config::{Config, PointerPolicy};
use crate::error::Error;
use crate::labels::LabelStack;
use crate::program::{Op, Program};

/// Segment and register setup. `dl` caches the current cell, `bx` holds the
/// tape offset and `ah` is preloaded with the DOS "write character" function.
const PROLOGUE: &str = "\
.8086
code SEGMENT para USE16 PUBLIC 'code'
\tASSUME CS:code, DS:data, SS:stack
\tMAIN:
\t\tmov ax, data
\t\tmov ds, ax
\t\tmov ax, 0200h
\t\tmov dl, 0
\t\tmov bx, 0
\t\tmov cx, 0
";

const STACK_BYTES: usize = 256;

/// Exit status of the emitted program when the pointer leaves the tape
/// under `PointerPolicy::Fault`.
const FAULT_EXIT_CODE: u8 = 11;

macro_rules! emit_line {
    ($listing:expr, $($arg:tt)*) => {
        $listing.write_line(format_args!($($arg)*))
    };
}

/// The result of a successful translation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Assembly {
    /// Complete source, ready for an 8086 MASM/TASM-style assembler.
    pub text: String,
    /// Loops translated.
    pub loops: usize,
    /// Deepest loop nesting reached.
    pub max_depth: usize,
}

/// Accumulates the instruction stream.
struct Listing {
    text: String,
    lines: usize,
    /// Pointer moves that needed a wraparound fixup, for unique labels.
    wraps: usize,
}

impl Listing {
    fn new() -> Self {
        Self {
            text: String::from(PROLOGUE),
            lines: 0,
            wraps: 0,
        }
    }

    fn write_line(&mut self, args: fmt::Arguments<'_>) {
        self.text.push_str("\t\t");
        self.text.push_str(&fmt::format(args));
        self.text.push('\n');
        self.lines += 1;
    }

    fn label(&mut self, name: &str) {
        self.text.push('\t');
        self.text.push_str(name);
        self.text.push_str(":\n");
    }
}

/// Translates programs into 16-bit real-mode DOS assembly.
///
/// Consecutive identical moves and cell updates are merged into a single
/// instruction with an immediate count. Each `[` gets a fresh identifier in
/// source order; its loop is bracketed by `mark_<id>_0` (entry) and
/// `mark_<id>_1` (exit).
///
/// Pointer moves follow `Config::pointer` exactly like the interpreter: under
/// `Wrap` the offset is brought back into `0..tape_size` after each move,
/// under `Fault` the program exits with status 11 instead.
pub struct Emitter {
    config: Config,
}

impl Emitter {
    /// Validate `config` for emission. The tape must fit one 16-bit segment.
    pub fn new(config: &Config) -> Result<Self, Error> {
        config.validate()?;
        if config.tape_size > Config::MAX_SEGMENT_CELLS {
            return Err(Error::InvalidConfig(format!(
                "tape of {} cells does not fit a 16-bit data segment",
                config.tape_size
            )));
        }
        Ok(Self {
            config: config.clone(),
        })
    }

    /// Translate `program`, returning only the assembly text.
    pub fn emit(&self, program: &Program) -> Result<String, Error> {
        Ok(self.assemble(program)?.text)
    }

    /// Translate `program`. Nothing is produced unless the whole program
    /// translates; structural errors abort at the offending bracket.
    pub fn assemble(&self, program: &Program) -> Result<Assembly, Error> {
        let mut labels = LabelStack::new(self.config.max_nesting);
        let mut listing = Listing::new();
        let mut loops = 0;
        let mut max_depth = 0;

        for op in program.ops() {
            match op {
                Op::Right(n) => self.emit_move(&mut listing, Direction::Right, n),
                Op::Left(n) => self.emit_move(&mut listing, Direction::Left, n),
                Op::Inc(n) => emit_line!(listing, "add dl, {}", n % 256),
                Op::Dec(n) => emit_line!(listing, "sub dl, {}", n % 256),
                Op::Output => {
                    emit_line!(listing, "mov ah, 02h");
                    emit_line!(listing, "int 21h");
                }
                Op::Input => {
                    emit_line!(listing, "mov ah, 01h");
                    emit_line!(listing, "int 21h");
                    emit_line!(listing, "mov dl, al");
                }
                Op::LoopStart { position } => {
                    let id = labels.push(position)?;
                    loops += 1;
                    max_depth = max_depth.max(labels.depth());
                    log::trace!(
                        "loop {id} opened at byte {position}, depth {}",
                        labels.depth()
                    );
                    emit_line!(listing, "cmp dl, 0");
                    emit_line!(listing, "jz mark_{id}_1");
                    listing.label(&format!("mark_{id}_0"));
                }
                Op::LoopEnd { position } => {
                    let id = labels.pop(position)?;
                    log::trace!("loop {id} closed at byte {position}");
                    emit_line!(listing, "cmp dl, 0");
                    emit_line!(listing, "jnz mark_{id}_0");
                    listing.label(&format!("mark_{id}_1"));
                }
            }
        }

        if let Some(position) = labels.innermost_open() {
            return Err(Error::UnbalancedOpen { position });
        }

        self.write_epilogue(&mut listing.text);
        log::debug!(
            "emitted {} instructions for {loops} loops (max depth {max_depth})",
            listing.lines
        );
        Ok(Assembly {
            text: listing.text,
            loops,
            max_depth,
        })
    }

    /// Spill the cached cell, move the offset, reload the new cell.
    ///
    /// The run is always one `add`/`sub`; the instructions after it only
    /// apply the pointer policy for tapes smaller than the segment.
    fn emit_move(&self, listing: &mut Listing, direction: Direction, n: usize) {
        let size = self.config.tape_size;
        let mnemonic = match direction {
            Direction::Right => "add",
            Direction::Left => "sub",
        };
        emit_line!(listing, "mov ds:[bx], dl");

        match self.config.pointer {
            PointerPolicy::Wrap => {
                emit_line!(listing, "{mnemonic} bx, {}", n % size);
                if size < Config::MAX_SEGMENT_CELLS {
                    listing.wraps += 1;
                    let k = listing.wraps;
                    match direction {
                        // Carry means the 16-bit sum passed 0xFFFF, which is
                        // past the tape too; `sub` then lands in range.
                        Direction::Right => {
                            emit_line!(listing, "jc move_{k}_0");
                            emit_line!(listing, "cmp bx, {size}");
                            emit_line!(listing, "jb move_{k}_1");
                            listing.label(&format!("move_{k}_0"));
                            emit_line!(listing, "sub bx, {size}");
                        }
                        Direction::Left => {
                            emit_line!(listing, "jnc move_{k}_1");
                            emit_line!(listing, "add bx, {size}");
                        }
                    }
                    listing.label(&format!("move_{k}_1"));
                }
            }
            PointerPolicy::Fault => {
                if n >= Config::MAX_SEGMENT_CELLS {
                    emit_line!(listing, "jmp pointer_fault");
                } else {
                    emit_line!(listing, "{mnemonic} bx, {n}");
                    emit_line!(listing, "jc pointer_fault");
                    if direction == Direction::Right && size < Config::MAX_SEGMENT_CELLS {
                        emit_line!(listing, "cmp bx, {size}");
                        emit_line!(listing, "jae pointer_fault");
                    }
                }
            }
        }

        emit_line!(listing, "mov dl, ds:[bx]");
    }

    /// Store the cached cell, exit to DOS, then reserve the data and stack
    /// segments.
    fn write_epilogue(&self, text: &mut String) {
        text.push_str("\t\tmov ds:[bx], dl\n\t\tmov ax, 4C00h\n\t\tint 21h\n");
        if self.config.pointer == PointerPolicy::Fault {
            text.push_str(&format!(
                "\tpointer_fault:\n\t\tmov ax, 4C{FAULT_EXIT_CODE:02X}h\n\t\tint 21h\n"
            ));
        }
        text.push_str(&format!(
            "\
code ends

data SEGMENT para USE16 PUBLIC 'data'
\tdb {} DUP(0)
data ends

stack SEGMENT para USE16 STACK 'stack'
\tdb {STACK_BYTES} DUP(?)
stack ends
end MAIN
",
            self.config.tape_size
        ));
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Direction {
    Right,
    Left,
}
