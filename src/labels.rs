use crate::error::Error;

/// Fixed-capacity stack of loop identifiers, owned by a single emission.
///
/// Identifiers are handed out in source order of `[`, starting at 1, and are
/// never reused, so sequential and nested loops always get distinct labels.
#[derive(Debug)]
pub struct LabelStack {
    /// `(id, offset of the opening bracket)`, innermost last.
    data: Vec<(usize, usize)>,
    capacity: usize,
    issued: usize,
}

impl LabelStack {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: Vec::new(),
            capacity,
            issued: 0,
        }
    }

    /// Issue a fresh identifier and push it. `position` is the offset of the
    /// `[` being opened, reported if the stack is already full.
    pub fn push(&mut self, position: usize) -> Result<usize, Error> {
        if self.data.len() == self.capacity {
            return Err(Error::NestingOverflow {
                position,
                capacity: self.capacity,
            });
        }
        self.issued += 1;
        self.data.push((self.issued, position));
        Ok(self.issued)
    }

    /// Pop the innermost open loop. `position` is the offset of the `]`.
    pub fn pop(&mut self, position: usize) -> Result<usize, Error> {
        self.data
            .pop()
            .map(|(id, _)| id)
            .ok_or(Error::UnbalancedClose { position })
    }

    /// Offset of the innermost `[` still open, if any.
    pub fn innermost_open(&self) -> Option<usize> {
        self.data.last().map(|&(_, position)| position)
    }

    pub fn depth(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
