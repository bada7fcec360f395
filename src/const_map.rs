//! Compile-time perfect-hash maps for fixed key sets.
//!
//! The property registry and the attribute/color lookup tables all map a small,
//! fixed set of keys to values.  [`ConstMap`] builds a two-level
//! compress-hash-displace table for such a set entirely in `const` evaluation:
//! keys are bucketed by hash, buckets are placed largest-first, and each
//! multi-key bucket searches for a seed that scatters its keys into free slots
//! of a secondary table.  Single-key buckets store their slot directly.
//!
//! Lookup hashes the key to a bucket, follows either the direct slot or the
//! seeded secondary slot, and then *always* verifies the stored key with a
//! final equality check — the perfect-hash property only holds for the keys
//! the map was built with, so foreign keys must be rejected explicitly.
//!
//! When the build cannot produce a perfect layout (duplicate keys, seed search
//! exhausted), the map stays usable through a linear-scan fallback and the
//! build result carries a status describing what happened.  Callers that
//! require the perfect layout chain [`ConstMapResult::expect_ok`], which turns
//! a failed build into a compile error.
//!
//! ```
//! use svgfront::const_map::ConstMap;
//!
//! static DASH: ConstMap<&'static str, u32, 3> =
//!     <ConstMap<&'static str, u32, 3>>::new([("butt", 0), ("round", 1), ("square", 2)]).expect_ok();
//!
//! assert_eq!(DASH.find("round"), Some(&1));
//! assert_eq!(DASH.find("bevel"), None);
//! ```

/// Marker for an unused slot in the primary/secondary tables.
pub const EMPTY_SLOT: u32 = u32::MAX;

/// Primary-table entries below this limit are direct value indices; entries at
/// or above it encode `DIRECT_SLOT_LIMIT + seed`.
pub const DIRECT_SLOT_LIMIT: u32 = EMPTY_SLOT / 2;

/// How many seeds to try per bucket before giving up on perfect hashing.
pub const MAX_SEED_SEARCH: u32 = 1024;

/// Scrambles a base hash with a bucket seed (splitmix64-style finalizer).
const fn mix_hash(base_hash: u64, seed: u32) -> u64 {
    let seed_mix = (seed as u64).wrapping_mul(0x9e37_79b9_7f4a_7c15);
    let mut value = base_hash ^ seed_mix;
    value ^= value >> 33;
    value = value.wrapping_mul(0xff51_afd7_ed55_8ccd);
    value ^= value >> 33;
    value = value.wrapping_mul(0xc4ce_b9fe_1a85_ec53);
    value ^= value >> 33;
    value
}

/// FNV-1a over the string's bytes; usable in const evaluation.
pub const fn hash_str(s: &str) -> u64 {
    let bytes = s.as_bytes();
    let mut value: u64 = 0xcbf2_9ce4_8422_2325;
    let mut i = 0;
    while i < bytes.len() {
        value ^= bytes[i] as u64;
        value = value.wrapping_mul(0x0000_0100_0000_01b3);
        i += 1;
    }
    value
}

/// Multiply-by-prime hash for integer keys.  Enum keys hash their
/// discriminant through this.
pub const fn hash_u32(key: u32) -> u64 {
    (key as u64).wrapping_mul(0x9e37_79b1)
}

const fn str_eq(a: &str, b: &str) -> bool {
    let a = a.as_bytes();
    let b = b.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut i = 0;
    while i < a.len() {
        if a[i] != b[i] {
            return false;
        }
        i += 1;
    }
    true
}

/// Perfect-hash metadata used to resolve keys into storage slots.
#[derive(Debug, Clone, Copy)]
pub struct ConstMapTables<const N: usize> {
    /// First-level table storing direct indices or bucket seeds.
    pub primary: [u32; N],
    /// Secondary slot table addressed with the bucket seed and key hash.
    pub secondary: [u32; N],
    /// Number of buckets in the first-level table; zero enables fallback
    /// lookup.
    pub bucket_count: u32,
}

impl<const N: usize> ConstMapTables<N> {
    const fn fallback() -> ConstMapTables<N> {
        ConstMapTables {
            primary: [EMPTY_SLOT; N],
            secondary: [EMPTY_SLOT; N],
            bucket_count: 0,
        }
    }
}

/// Outcome of building a [`ConstMap`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildStatus {
    /// Perfect-hash tables were constructed.
    Ok,
    /// Map answers queries through the linear fallback path.
    UsingFallback,
    /// Duplicate keys were found; lookups fall back to a linear scan, where
    /// the first matching entry wins.
    DuplicateKey,
    /// No seed under [`MAX_SEED_SEARCH`] placed some bucket; fallback lookup.
    SeedSearchFailed,
    /// The key type has no compile-time hash; fallback lookup.
    UnsupportedKey,
}

/// Counters describing how the build went.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildDiagnostics {
    /// Total seed attempts across all buckets.
    pub seed_attempts: u32,
    /// Largest bucket encountered.
    pub max_bucket_size: u32,
    /// Bucket that could not be placed, or [`EMPTY_SLOT`] when all were.
    pub failed_bucket: u32,
}

impl BuildDiagnostics {
    const fn new() -> BuildDiagnostics {
        BuildDiagnostics {
            seed_attempts: 0,
            max_bucket_size: 0,
            failed_bucket: EMPTY_SLOT,
        }
    }
}

/// Fixed-key associative container with tables computed at compile time.
#[derive(Debug, Clone, Copy)]
pub struct ConstMap<K: 'static, V: 'static, const N: usize> {
    keys: [K; N],
    values: [V; N],
    tables: ConstMapTables<N>,
}

/// A built map together with its status and diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct ConstMapResult<K: 'static, V: 'static, const N: usize> {
    pub map: ConstMap<K, V, N>,
    pub status: BuildStatus,
    pub diagnostics: BuildDiagnostics,
}

impl<K: Copy, V: Copy, const N: usize> ConstMapResult<K, V, N> {
    /// Unwraps the map, failing compilation (or panicking at runtime) unless
    /// the perfect-hash build succeeded.
    pub const fn expect_ok(self) -> ConstMap<K, V, N> {
        match self.status {
            BuildStatus::Ok => self.map,
            _ => panic!("ConstMap construction failed; check for duplicate keys or inspect the ConstMapResult diagnostics"),
        }
    }
}

impl<K, V, const N: usize> ConstMap<K, V, N> {
    pub const fn len(&self) -> usize {
        N
    }

    pub const fn is_empty(&self) -> bool {
        N == 0
    }

    /// The key array, in insertion order.
    pub fn keys(&self) -> &[K; N] {
        &self.keys
    }

    pub fn tables(&self) -> &ConstMapTables<N> {
        &self.tables
    }
}

macro_rules! impl_const_map {
    ($key_ty:ty, $lookup_ty:ty, $hash:expr, $eq:expr) => {
        impl<V: Copy, const N: usize> ConstMap<$key_ty, V, N> {
            /// Builds the map and its perfect-hash tables.
            pub const fn new(entries: [($key_ty, V); N]) -> ConstMapResult<$key_ty, V, N> {
                assert!(N > 0, "ConstMap requires at least one entry");
                assert!(N < DIRECT_SLOT_LIMIT as usize);

                let mut keys = [entries[0].0; N];
                let mut values = [entries[0].1; N];
                let mut i = 0;
                while i < N {
                    keys[i] = entries[i].0;
                    values[i] = entries[i].1;
                    i += 1;
                }

                let mut diagnostics = BuildDiagnostics::new();

                // Duplicate keys make a perfect layout impossible; serve the
                // map through the linear fallback instead.
                let mut has_duplicates = false;
                let mut i = 0;
                while i < N && !has_duplicates {
                    let mut j = i + 1;
                    while j < N {
                        if $eq(keys[i], keys[j]) {
                            has_duplicates = true;
                            break;
                        }
                        j += 1;
                    }
                    i += 1;
                }

                if has_duplicates {
                    return ConstMapResult {
                        map: ConstMap {
                            keys,
                            values,
                            tables: ConstMapTables::fallback(),
                        },
                        status: BuildStatus::DuplicateKey,
                        diagnostics,
                    };
                }

                let mut tables = ConstMapTables {
                    primary: [EMPTY_SLOT; N],
                    secondary: [EMPTY_SLOT; N],
                    bucket_count: N as u32,
                };

                // Bucket the keys by hash.
                let mut bucket_counts = [0usize; N];
                let mut i = 0;
                while i < N {
                    let bucket = ($hash(keys[i]) % (N as u64)) as usize;
                    bucket_counts[bucket] += 1;
                    if bucket_counts[bucket] as u32 > diagnostics.max_bucket_size {
                        diagnostics.max_bucket_size = bucket_counts[bucket] as u32;
                    }
                    i += 1;
                }

                // Lay the bucket members out contiguously.
                let mut bucket_offsets = [0usize; N];
                let mut running = 0;
                let mut bucket = 0;
                while bucket < N {
                    bucket_offsets[bucket] = running;
                    running += bucket_counts[bucket];
                    bucket += 1;
                }

                let mut bucket_fill = [0usize; N];
                let mut bucket_items = [0usize; N];
                let mut i = 0;
                while i < N {
                    let bucket = ($hash(keys[i]) % (N as u64)) as usize;
                    bucket_items[bucket_offsets[bucket] + bucket_fill[bucket]] = i;
                    bucket_fill[bucket] += 1;
                    i += 1;
                }

                // Place buckets in descending size order (selection sort; N is
                // small).
                let mut bucket_order = [0usize; N];
                let mut i = 0;
                while i < N {
                    bucket_order[i] = i;
                    i += 1;
                }
                let mut i = 0;
                while i < N {
                    let mut max_index = i;
                    let mut j = i + 1;
                    while j < N {
                        if bucket_counts[bucket_order[j]] > bucket_counts[bucket_order[max_index]] {
                            max_index = j;
                        }
                        j += 1;
                    }
                    let tmp = bucket_order[i];
                    bucket_order[i] = bucket_order[max_index];
                    bucket_order[max_index] = tmp;
                    i += 1;
                }

                let mut used_slots = [false; N];
                let mut order_index = 0;
                while order_index < N {
                    let bucket = bucket_order[order_index];
                    let count = bucket_counts[bucket];
                    order_index += 1;

                    if count == 0 {
                        continue;
                    }

                    let offset = bucket_offsets[bucket];

                    if count == 1 {
                        tables.primary[bucket] = bucket_items[offset] as u32;
                        continue;
                    }

                    let mut candidate_slots = [0usize; N];
                    let mut placed = false;

                    let mut seed = 1;
                    while seed <= MAX_SEED_SEARCH {
                        diagnostics.seed_attempts += 1;
                        let mut collision = false;

                        let mut i = 0;
                        while i < count {
                            let key_index = bucket_items[offset + i];
                            let slot =
                                (mix_hash($hash(keys[key_index]), seed) % (N as u64)) as usize;

                            let mut j = 0;
                            while j < i {
                                if candidate_slots[j] == slot {
                                    collision = true;
                                    break;
                                }
                                j += 1;
                            }
                            if collision || used_slots[slot] {
                                collision = true;
                                break;
                            }
                            candidate_slots[i] = slot;
                            i += 1;
                        }

                        if !collision {
                            let mut i = 0;
                            while i < count {
                                let slot = candidate_slots[i];
                                tables.secondary[slot] = bucket_items[offset + i] as u32;
                                used_slots[slot] = true;
                                i += 1;
                            }
                            tables.primary[bucket] = DIRECT_SLOT_LIMIT + seed;
                            placed = true;
                            break;
                        }

                        seed += 1;
                    }

                    if !placed {
                        diagnostics.failed_bucket = bucket as u32;
                        tables = ConstMapTables::fallback();
                        return ConstMapResult {
                            map: ConstMap {
                                keys,
                                values,
                                tables,
                            },
                            status: BuildStatus::SeedSearchFailed,
                            diagnostics,
                        };
                    }
                }

                ConstMapResult {
                    map: ConstMap {
                        keys,
                        values,
                        tables,
                    },
                    status: BuildStatus::Ok,
                    diagnostics,
                }
            }

            /// Looks up a key; `None` for anything outside the built key set.
            pub fn find(&self, key: $lookup_ty) -> Option<&V> {
                if self.tables.bucket_count == 0 {
                    return self.fallback_lookup(key);
                }

                let bucket = ($hash(key) % (N as u64)) as usize;

                let seed_or_index = self.tables.primary[bucket];
                if seed_or_index == EMPTY_SLOT {
                    return None;
                }

                let index = if seed_or_index < DIRECT_SLOT_LIMIT {
                    seed_or_index as usize
                } else {
                    let seed = seed_or_index - DIRECT_SLOT_LIMIT;
                    let slot = (mix_hash($hash(key), seed) % (N as u64)) as usize;
                    let stored = self.tables.secondary[slot];
                    if stored == EMPTY_SLOT {
                        return None;
                    }
                    stored as usize
                };

                // Perfect hashing is only guaranteed for the built key set;
                // reject foreign keys with a final equality check.
                if $eq(self.keys[index], key) {
                    Some(&self.values[index])
                } else {
                    None
                }
            }

            pub fn contains(&self, key: $lookup_ty) -> bool {
                self.find(key).is_some()
            }

            fn fallback_lookup(&self, key: $lookup_ty) -> Option<&V> {
                // First match wins so that duplicate-key maps are
                // deterministic.
                self.keys
                    .iter()
                    .position(|k| $eq(*k, key))
                    .map(|i| &self.values[i])
            }
        }
    };
}

impl_const_map!(&'static str, &str, hash_str, str_eq);
impl_const_map!(u32, u32, hash_u32, u32_eq);

const fn u32_eq(a: u32, b: u32) -> bool {
    a == b
}
