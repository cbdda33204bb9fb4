/// Forward-only iterator over the positions of the current document.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PositionIterator {
    positions: Vec<u32>,
    cursor: usize,
}

impl PositionIterator {
    pub fn new(positions: Vec<u32>) -> Self {
        Self { positions, cursor: 0 }
    }

    /// Moves to the first position `>= target`.
    pub fn seek_position(&mut self, target: u32) -> Option<u32> {
        let remaining = &self.positions[self.cursor..];
        self.cursor += remaining.partition_point(|&position| position < target);
        self.positions.get(self.cursor).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl Iterator for PositionIterator {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        let position = self.positions.get(self.cursor).copied();
        if position.is_some() {
            self.cursor += 1;
        }
        position
    }
}
