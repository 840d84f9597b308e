use rand::Rng;

/// Growable worklist with uniform random O(1) removal. Order is not preserved.
#[derive(Clone, Debug, Default)]
pub struct UnorderedList<T> {
    items: Vec<T>,
}

impl<T> UnorderedList<T> {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, value: T) {
        self.items.push(value);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Removes a uniformly chosen element by swapping the last one into its slot.
    pub fn pop_random<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Option<T> {
        if self.items.is_empty() {
            return None;
        }
        let index = rng.gen_range(0..self.items.len());
        Some(self.items.swap_remove(index))
    }
}

impl<T> FromIterator<T> for UnorderedList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn pop_random_drains_every_element_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut list: UnorderedList<u32> = (0..50).collect();
        let mut seen = Vec::new();
        while let Some(value) = list.pop_random(&mut rng) {
            seen.push(value);
        }
        seen.sort_unstable();
        assert_eq!(seen, (0..50).collect::<Vec<_>>());
        assert!(list.is_empty());
    }

    #[test]
    fn pop_random_on_empty_list_is_none() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut list = UnorderedList::<u8>::new();
        assert_eq!(list.pop_random(&mut rng), None);
    }
}
