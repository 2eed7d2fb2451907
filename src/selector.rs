//! Random song selection without immediate repeats.

use rand::Rng;

/// Picks the next song index from a fixed-size song table, never returning
/// the same index twice in a row.
///
/// The draw is rejection sampling: uniform over the table, redrawn while it
/// matches the previous pick. That only terminates when more than one song
/// exists, so the constructor requires it.
///
/// # Examples
///
/// ```
/// use coiltone::SongSelector;
///
/// let mut selector = SongSelector::new(5);
/// let mut rng = rand::thread_rng();
/// let first = selector.next(&mut rng);
/// let second = selector.next(&mut rng);
/// assert_ne!(first, second);
/// ```
#[derive(Debug, Clone)]
pub struct SongSelector {
    count: usize,
    previous: Option<usize>,
}

impl SongSelector {
    /// Creates a selector over `count` songs.
    ///
    /// # Panics
    ///
    /// Panics if `count < 2`: with a single song the exclusion draw could
    /// never terminate.
    pub fn new(count: usize) -> Self {
        assert!(count >= 2, "song selection requires at least two songs");
        Self {
            count,
            previous: None,
        }
    }

    /// Draws the next song index, excluding the previously returned one.
    pub fn next<R: Rng>(&mut self, rng: &mut R) -> usize {
        let mut index = rng.gen_range(0..self.count);
        while Some(index) == self.previous {
            index = rng.gen_range(0..self.count);
        }
        self.previous = Some(index);
        index
    }

    /// The most recently returned index, if any.
    pub fn previous(&self) -> Option<usize> {
        self.previous
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_never_repeats_previous_index() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut selector = SongSelector::new(2);
        let mut previous = selector.next(&mut rng);
        for _ in 0..1000 {
            let index = selector.next(&mut rng);
            assert_ne!(index, previous);
            previous = index;
        }
    }

    #[test]
    fn test_all_indices_reachable() {
        let mut rng = StdRng::seed_from_u64(42);
        let mut selector = SongSelector::new(5);
        let mut seen = [false; 5];
        for _ in 0..200 {
            seen[selector.next(&mut rng)] = true;
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn test_previous_tracks_last_draw() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut selector = SongSelector::new(3);
        assert_eq!(selector.previous(), None);
        let index = selector.next(&mut rng);
        assert_eq!(selector.previous(), Some(index));
    }

    #[test]
    #[should_panic(expected = "at least two songs")]
    fn test_single_song_set_rejected() {
        SongSelector::new(1);
    }
}
