use crate::Segment;

/// This is a simple segment for testing. Each item in the segment carries a distinct value, so
/// tests can tell exactly which items ended up where after splits.
#[derive(Debug, Clone, Eq, PartialEq, Default)]
pub struct TestSegment {
    pub values: Vec<u32>,
}

impl TestSegment {
    /// A segment holding `len` consecutive values starting at `start`.
    pub fn run(start: u32, len: usize) -> Self {
        Self { values: (start..start + len as u32).collect() }
    }

    pub fn value_at(&self, offset: usize) -> u32 { self.values[offset] }

    pub fn len(&self) -> usize { self.values.len() }

    pub fn is_empty(&self) -> bool { self.values.is_empty() }
}

impl Segment for TestSegment {
    fn empty() -> Self { Self::default() }

    fn extract_range(mut self, start: usize, len: usize) -> (Self, Self) {
        assert!(start + len <= self.values.len(), "Extracted range out of bounds");
        let removed = self.values.drain(start..start + len).collect();
        (self, Self { values: removed })
    }
}
