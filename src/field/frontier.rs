/// Ring-by-ring working set of cell indices.
///
/// `current` holds the cells whose value changed in the last layer (or were
/// just seeded); `next` collects the cells improved while processing it.
/// `marks` deduplicates indices within one pass without clearing a bitmap.
#[derive(Debug)]
pub(crate) struct Frontier {
    current: Vec<u32>,
    next: Vec<u32>,
    marks: Vec<u32>,
    mark: u32,
}

impl Frontier {
    pub fn new(cell_count: usize) -> Self {
        Self {
            current: Vec::new(),
            next: Vec::new(),
            marks: vec![0; cell_count],
            mark: 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    pub fn len(&self) -> usize {
        self.current.len()
    }

    pub fn current(&self) -> &[u32] {
        &self.current
    }

    pub fn push(&mut self, index: u32) {
        self.current.push(index);
    }

    /// Buffer for the layer being built; cleared on [`Frontier::advance`].
    pub fn next_mut(&mut self) -> &mut Vec<u32> {
        &mut self.next
    }

    /// Promote `next` to `current`.
    pub fn advance(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
        self.next.clear();
    }

    pub fn clear(&mut self) {
        self.current.clear();
        self.next.clear();
    }

    /// Start a new deduplication pass.
    pub fn begin_pass(&mut self) -> u32 {
        self.mark = self.mark.wrapping_add(1);
        if self.mark == 0 {
            self.marks.fill(0);
            self.mark = 1;
        }
        self.mark
    }

    /// Mark `index` for the pass; false if it was already marked.
    #[inline]
    pub fn mark(&mut self, index: u32, pass: u32) -> bool {
        let slot = &mut self.marks[index as usize];
        if *slot == pass {
            return false;
        }
        *slot = pass;
        true
    }

    /// Drop repeated indices, keeping first occurrences in order.
    pub fn dedup(&mut self, indices: &mut Vec<u32>) {
        let pass = self.begin_pass();
        indices.retain(|&i| self.mark(i, pass));
    }
}
