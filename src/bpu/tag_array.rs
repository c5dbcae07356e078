//! Set-associative tag array.
//!
//! Maps an address to a storage slot (set, way) under LRU replacement.
//! The array deliberately exposes two lookup operations: `lookup` touches
//! the replacement order (a real access) while `lookup_no_touch` is a pure
//! peek used by prediction paths that must not count as a use. Collapsing
//! the two silently corrupts replacement order, so they stay separate.

use crate::common::ConfigError;

/// Associative tag storage with per-set LRU usage stacks.
///
/// Tags are stored `[set][way]`; the LRU stack for each set keeps the most
/// recently used way at the front, so the victim is always the back entry.
#[derive(Debug)]
pub struct TagArray {
    sets: usize,
    ways: usize,
    offset_bits: u32,
    set_bits: u32,
    addr_mask: u64,
    tags: Vec<Vec<Option<u64>>>,
    lru: Vec<Vec<usize>>,
}

fn log2_of(value: u64) -> u32 {
    value.trailing_zeros()
}

impl TagArray {
    /// Creates a tag array with `size_in_entries` total slots split across
    /// `ways`, tracking addresses at `granularity`-byte resolution within
    /// an `address_bits`-wide address space.
    ///
    /// Geometry must describe realizable hardware: entry count and ways
    /// are non-zero powers of two with `ways <= size_in_entries`,
    /// granularity is a non-zero power of two, and `address_bits` is in
    /// `1..=64`. Anything else fails with a diagnostic naming the
    /// offending parameter.
    pub fn new(
        size_in_entries: u32,
        ways: u32,
        granularity: u32,
        address_bits: u32,
    ) -> Result<Self, ConfigError> {
        if size_in_entries == 0 || !size_in_entries.is_power_of_two() {
            return Err(ConfigError::BadGeometry {
                parameter: "size_in_entries",
                value: u64::from(size_in_entries),
            });
        }
        if ways == 0 || !ways.is_power_of_two() || ways > size_in_entries {
            return Err(ConfigError::BadGeometry {
                parameter: "ways",
                value: u64::from(ways),
            });
        }
        if granularity == 0 || !granularity.is_power_of_two() {
            return Err(ConfigError::BadGeometry {
                parameter: "granularity",
                value: u64::from(granularity),
            });
        }
        if address_bits == 0 || address_bits > 64 {
            return Err(ConfigError::BadGeometry {
                parameter: "address_bits",
                value: u64::from(address_bits),
            });
        }

        let sets = (size_in_entries / ways) as usize;
        let ways = ways as usize;
        let addr_mask = if address_bits == 64 {
            u64::MAX
        } else {
            (1u64 << address_bits) - 1
        };

        let mut lru = Vec::with_capacity(sets);
        for _ in 0..sets {
            lru.push((0..ways).collect());
        }

        Ok(Self {
            sets,
            ways,
            offset_bits: log2_of(u64::from(granularity)),
            set_bits: log2_of(sets as u64),
            addr_mask,
            tags: vec![vec![None; ways]; sets],
            lru,
        })
    }

    /// Number of sets.
    pub fn sets(&self) -> usize {
        self.sets
    }

    /// Number of ways per set.
    pub fn ways(&self) -> usize {
        self.ways
    }

    /// Set index for `addr`.
    pub fn set(&self, addr: u64) -> usize {
        let line = (addr & self.addr_mask) >> self.offset_bits;
        (line & (self.sets as u64 - 1)) as usize
    }

    /// Tag value for `addr`.
    pub fn tag(&self, addr: u64) -> u64 {
        ((addr & self.addr_mask) >> self.offset_bits) >> self.set_bits
    }

    /// Hit check that counts as a use: on a hit the way becomes the most
    /// recently used entry of its set.
    pub fn lookup(&mut self, addr: u64) -> Option<usize> {
        let way = self.lookup_no_touch(addr)?;
        let set = self.set(addr);
        self.touch(set, way);
        Some(way)
    }

    /// Pure hit check: replacement order is left untouched.
    pub fn lookup_no_touch(&self, addr: u64) -> Option<usize> {
        let set = self.set(addr);
        let tag = self.tag(addr);
        self.tags[set]
            .iter()
            .position(|slot| *slot == Some(tag))
    }

    /// Installs `addr` into its set, evicting the least recently used way,
    /// and returns the way it now occupies.
    pub fn allocate(&mut self, addr: u64) -> usize {
        let set = self.set(addr);
        let tag = self.tag(addr);
        // The LRU stack is never empty; ways >= 1 by construction.
        let way = *self.lru[set].last().unwrap();
        self.tags[set][way] = Some(tag);
        self.touch(set, way);
        way
    }

    /// Moves `way` to the most-recently-used position of `set`.
    fn touch(&mut self, set: usize, way: usize) {
        let stack = &mut self.lru[set];
        if let Some(pos) = stack.iter().position(|&w| w == way) {
            stack.remove(pos);
        }
        stack.insert(0, way);
    }
}
