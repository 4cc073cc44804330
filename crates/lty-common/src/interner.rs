//! String interner for identifier deduplication.
//!
//! Identifiers, class names and field names are interned into a process-wide
//! pool and handed around as [`Atom`]s. Two atoms produced by the same pool
//! share one allocation, so equality is usually a pointer comparison and
//! cloning is a reference-count bump.
//!
//! The pool only grows on its own: a string stays interned after the last
//! atom for it is dropped, until [`Atom::purge_unused`] runs.
//!
//! Unlike index-based atoms, an `Atom` carries its own text. Type values built
//! from atoms can therefore be rendered, hashed and shared across threads
//! without threading an interner through every call.

use rustc_hash::{FxHashSet, FxHasher};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;
use std::sync::{Arc, LazyLock, RwLock};

const SHARD_BITS: u32 = 4;
const SHARD_COUNT: usize = 1 << SHARD_BITS;
const SHARD_MASK: u64 = (SHARD_COUNT as u64) - 1;

static GLOBAL: LazyLock<ShardedInterner> = LazyLock::new(ShardedInterner::new);

/// An interned string.
///
/// Cheap to clone and compare. Use [`Atom::new`] to intern through the
/// process-wide pool.
#[derive(Clone)]
pub struct Atom(Arc<str>);

impl Atom {
    /// Intern `text` in the global pool.
    #[inline]
    pub fn new(text: &str) -> Self {
        GLOBAL.intern(text)
    }

    /// The empty atom.
    /// Drop global pool entries no live atom refers to. Returns how many
    /// strings were released.
    pub fn purge_unused() -> usize {
        GLOBAL.purge_unused()
    }

    pub fn empty() -> Self {
        GLOBAL.intern("")
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl PartialEq for Atom {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0) || *self.0 == *other.0
    }
}

impl Eq for Atom {}

impl Hash for Atom {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.hash(state);
    }
}

impl PartialOrd for Atom {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Atom {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.cmp(&other.0)
    }
}

impl Deref for Atom {
    type Target = str;

    fn deref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Atom {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Atom {
    fn from(text: &str) -> Self {
        Atom::new(text)
    }
}

impl From<String> for Atom {
    fn from(text: String) -> Self {
        Atom::new(&text)
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        &*self.0 == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        &*self.0 == *other
    }
}

impl fmt::Debug for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Serialize for Atom {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Atom {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Ok(Atom::new(&text))
    }
}

struct InternerShard {
    strings: RwLock<FxHashSet<Arc<str>>>,
}

/// Sharded string interner for concurrent use.
///
/// Uses fixed buckets to reduce lock contention. Lookups take a read lock
/// first and only upgrade to a write lock for strings not yet interned.
pub struct ShardedInterner {
    shards: [InternerShard; SHARD_COUNT],
}

impl ShardedInterner {
    pub fn new() -> Self {
        let shards = std::array::from_fn(|_| InternerShard {
            strings: RwLock::new(FxHashSet::default()),
        });
        ShardedInterner { shards }
    }

    /// Intern a string, returning the shared handle.
    pub fn intern(&self, text: &str) -> Atom {
        let shard = &self.shards[Self::shard_for(text)];

        if let Ok(strings) = shard.strings.read()
            && let Some(existing) = strings.get(text)
        {
            return Atom(existing.clone());
        }

        let Ok(mut strings) = shard.strings.write() else {
            // A poisoned shard still hands out a usable, unshared atom.
            return Atom(Arc::from(text));
        };
        if let Some(existing) = strings.get(text) {
            return Atom(existing.clone());
        }
        let owned: Arc<str> = Arc::from(text);
        strings.insert(owned.clone());
        Atom(owned)
    }

    /// Release strings held only by the pool. An atom can only be cloned
    /// from a live atom or through the shard lock, so an entry whose count
    /// is one cannot be revived while the write lock is held.
    pub fn purge_unused(&self) -> usize {
        let mut released = 0;
        for shard in &self.shards {
            if let Ok(mut strings) = shard.strings.write() {
                let before = strings.len();
                strings.retain(|text| Arc::strong_count(text) > 1);
                released += before - strings.len();
            }
        }
        released
    }

    /// Number of interned strings across all shards.
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| shard.strings.read().map(|s| s.len()).unwrap_or(0))
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn shard_for(text: &str) -> usize {
        let mut hasher = FxHasher::default();
        text.hash(&mut hasher);
        (hasher.finish() & SHARD_MASK) as usize
    }
}

impl Default for ShardedInterner {
    fn default() -> Self {
        Self::new()
    }
}
