//! Fixed-capacity ring buffer shared by the waveform trace and the NN interval history.

/// Ring buffer that never reports itself as full: once `COUNT` values have
/// been written every slot is valid and further writes overwrite the oldest.
#[derive(Copy, Clone, Debug)]
pub struct Circ<T, const COUNT: usize> {
    data: [T; COUNT],
    next: usize,
    written: u32,
}

impl<T, const COUNT: usize> Circ<T, COUNT>
where
    T: Copy,
{
    pub fn new(zero: T) -> Self {
        Circ {
            data: [zero; COUNT],
            next: 0,
            written: 0,
        }
    }

    pub fn push(&mut self, value: T) {
        self.data[self.next] = value;
        self.next = wrap_next::<COUNT>(self.next);
        self.written = self.written.saturating_add(1);
    }

    /// Slot the next `push` will write to.
    pub fn write_index(&self) -> usize {
        self.next
    }

    /// Number of values pushed since construction, saturating.
    pub fn written(&self) -> u32 {
        self.written
    }

    /// Raw storage, in slot order rather than chronological order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub const fn capacity(&self) -> usize {
        COUNT
    }

    /// Iterate over every slot, oldest first.
    pub fn iter(&self) -> CircIter<T, COUNT> {
        CircIter {
            circ: self,
            idx: self.next,
            done: false,
        }
    }
}

impl<'a, T, const COUNT: usize> IntoIterator for &'a Circ<T, COUNT>
where
    T: Copy,
{
    type Item = T;

    type IntoIter = CircIter<'a, T, COUNT>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct CircIter<'a, T, const COUNT: usize> {
    circ: &'a Circ<T, COUNT>,
    idx: usize,
    done: bool,
}

impl<'a, T, const COUNT: usize> Iterator for CircIter<'a, T, COUNT>
where
    T: Copy,
{
    type Item = T;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            None
        } else {
            let res = self.circ.data[self.idx];
            self.idx = wrap_next::<COUNT>(self.idx);
            if self.idx == self.circ.next {
                self.done = true;
            }
            Some(res)
        }
    }
}

#[inline]
pub fn wrap_next<const COUNT: usize>(n: usize) -> usize {
    let n1 = n + 1;
    if n1 >= COUNT {
        0
    } else {
        n1
    }
}
