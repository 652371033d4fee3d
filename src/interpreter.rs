use std::io::{self, BufWriter, Read, Write};

use crate::config::{Config, EofPolicy, PointerPolicy};
use crate::error::Error;
use crate::program::{Command, Program};

/// Summary of a completed run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Outcome {
    /// Commands executed; inert bytes are not counted.
    pub steps: u64,
    /// Final pointer position.
    pub pointer: usize,
}

/// Direct interpreter over a zeroed, fixed-size tape of wrapping byte cells.
///
/// Bracket partners are resolved once per run through a precomputed jump
/// table, so every branch is O(1). Unbalanced brackets are reported before
/// any command executes.
pub struct Interpreter {
    config: Config,
    tape: Vec<u8>,
    pointer: usize,
}

impl Interpreter {
    /// Validate `config` and allocate the tape.
    pub fn new(config: &Config) -> Result<Self, Error> {
        config.validate()?;
        let mut tape = Vec::new();
        tape.try_reserve_exact(config.tape_size)
            .map_err(|_| Error::TapeAllocation {
                cells: config.tape_size,
            })?;
        tape.resize(config.tape_size, 0);
        Ok(Self {
            config: config.clone(),
            tape,
            pointer: 0,
        })
    }

    /// The tape as left by the last run.
    pub fn tape(&self) -> &[u8] {
        &self.tape
    }

    pub fn pointer(&self) -> usize {
        self.pointer
    }

    /// Run `program` from a fresh tape, reading `,` bytes from `input` and
    /// writing `.` bytes to `output`.
    ///
    /// Output is buffered and flushed before every read and at the end of the
    /// run. On an error exit the buffer is flushed on a best-effort basis when
    /// it is dropped.
    pub fn run<R: Read, W: Write>(
        &mut self,
        program: &Program,
        input: R,
        output: W,
    ) -> Result<Outcome, Error> {
        let table = program.jump_table()?;
        let code = program.as_bytes();
        let mut input = input.bytes();
        let mut output = BufWriter::new(output);

        self.tape.fill(0);
        self.pointer = 0;

        let mut ip: usize = 0;
        let mut steps: u64 = 0;

        while ip < code.len() {
            let Some(command) = Command::decode(code[ip]) else {
                ip += 1;
                continue;
            };
            if let Some(limit) = self.config.step_limit {
                if steps == limit {
                    return Err(Error::StepLimitExceeded { limit });
                }
            }
            steps += 1;

            match command {
                Command::Right => self.shift(1, ip)?,
                Command::Left => self.shift(-1, ip)?,
                Command::Inc => {
                    let cell = &mut self.tape[self.pointer];
                    *cell = cell.wrapping_add(1);
                }
                Command::Dec => {
                    let cell = &mut self.tape[self.pointer];
                    *cell = cell.wrapping_sub(1);
                }
                Command::Output => output.write_all(&[self.tape[self.pointer]])?,
                Command::Input => {
                    output.flush()?;
                    match input.next().transpose()? {
                        Some(byte) => self.tape[self.pointer] = byte,
                        None => match self.config.eof {
                            EofPolicy::Sentinel => self.tape[self.pointer] = 0xFF,
                            EofPolicy::Zero => self.tape[self.pointer] = 0,
                            EofPolicy::Unchanged => {}
                        },
                    }
                }
                Command::LoopStart => {
                    if self.tape[self.pointer] == 0 {
                        ip = table[ip];
                    }
                }
                Command::LoopEnd => {
                    if self.tape[self.pointer] != 0 {
                        ip = table[ip];
                    }
                }
            }
            ip += 1;
        }

        output.flush()?;
        log::debug!("run finished after {steps} steps, pointer at {}", self.pointer);
        Ok(Outcome {
            steps,
            pointer: self.pointer,
        })
    }

    fn shift(&mut self, delta: isize, position: usize) -> Result<(), Error> {
        let len = self.tape.len();
        match self.pointer.checked_add_signed(delta) {
            Some(next) if next < len => self.pointer = next,
            _ => match self.config.pointer {
                PointerPolicy::Wrap => {
                    self.pointer = if delta < 0 { len - 1 } else { 0 };
                }
                PointerPolicy::Fault => {
                    return Err(Error::PointerOutOfBounds {
                        position,
                        pointer: self.pointer as isize + delta,
                    });
                }
            },
        }
        Ok(())
    }
}

/// Interpret `program` against the process's standard input and output.
pub fn interpret(program: &Program, config: &Config) -> Result<Outcome, Error> {
    let mut interpreter = Interpreter::new(config)?;
    interpreter.run(program, io::stdin().lock(), io::stdout().lock())
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn random_programs_never_panic(source in prop::collection::vec(any::<u8>(), 0..256)) {
            let config = Config {
                tape_size: 64,
                step_limit: Some(4096),
                ..Default::default()
            };
            let program = Program::new(source, &config).unwrap();
            let mut interpreter = Interpreter::new(&config).unwrap();
            let mut output = Vec::new();
            if let Ok(outcome) = interpreter.run(&program, &b"input"[..], &mut output) {
                prop_assert!(outcome.steps <= 4096);
                prop_assert!(outcome.pointer < 64);
            }
        }

        #[test]
        fn cat_echoes_input(input in prop::collection::vec(1u8..=255, 0..64)) {
            let config = Config {
                eof: EofPolicy::Zero,
                ..Default::default()
            };
            let program = Program::new(",[.,]", &config).unwrap();
            let mut interpreter = Interpreter::new(&config).unwrap();
            let mut output = Vec::new();
            interpreter.run(&program, &input[..], &mut output).unwrap();
            prop_assert_eq!(output, input);
        }
    }
}
