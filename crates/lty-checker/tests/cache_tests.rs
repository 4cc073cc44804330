use super::*;
use lty_binder::DeclId;
use rayon::prelude::*;

fn key(file: u32, decl: u32) -> CacheKey {
    CacheKey {
        decl: DeclKey::new(FileId(file), DeclId(decl)),
        generation: 1,
        fingerprint: 0,
    }
}

#[test]
fn test_insert_keeps_first_value() {
    let cache = InferenceCache::new();
    assert_eq!(cache.get(&key(1, 0)), None);
    assert_eq!(cache.insert(key(1, 0), Ty::Number), Ty::Number);
    assert_eq!(cache.insert(key(1, 0), Ty::String), Ty::Number);
    assert_eq!(cache.get(&key(1, 0)), Some(Ty::Number));

    let stats = cache.stats();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
    assert_eq!(stats.misses, 1);
}

#[test]
fn test_generation_and_bindings_are_part_of_the_key() {
    let cache = InferenceCache::new();
    cache.insert(key(1, 0), Ty::Number);
    let newer = CacheKey {
        generation: 2,
        ..key(1, 0)
    };
    let bound = CacheKey {
        fingerprint: 7,
        ..key(1, 0)
    };
    assert_eq!(cache.get(&newer), None);
    assert_eq!(cache.get(&bound), None);
}

#[test]
fn test_invalidation_follows_file_dependencies() {
    // 3 reads 2, 2 reads 1; 4 is independent.
    let cache = InferenceCache::new();
    for file in 1..=4 {
        cache.insert(key(file, 0), Ty::Number);
    }
    cache.record_file_dependency(FileId(2), FileId(1));
    cache.record_file_dependency(FileId(3), FileId(2));
    cache.record_file_dependency(FileId(4), FileId(4));

    assert_eq!(cache.invalidate_file(FileId(1), &[]), 3);
    assert_eq!(cache.len(), 1);
    assert!(cache.get(&key(4, 0)).is_some());
    assert!(cache.get(&key(3, 0)).is_none());

    // Dependencies of invalidated files are gone with them.
    cache.insert(key(3, 0), Ty::Number);
    assert_eq!(cache.invalidate_file(FileId(1), &[]), 1);
    assert!(cache.get(&key(3, 0)).is_some());
}

#[test]
fn test_invalidation_by_declared_name() {
    let cache = InferenceCache::new();
    cache.insert(key(1, 0), Ty::Number);
    cache.insert(key(2, 0), Ty::Number);
    cache.insert(key(3, 0), Ty::Number);
    // File 2 looked up the global `Config` before any file declared it.
    cache.record_name_dependency(FileId(2), &Atom::new("Config"));
    cache.record_name_dependency(FileId(3), &Atom::new("Other"));

    assert_eq!(cache.invalidate_file(FileId(1), &[Atom::new("Config")]), 2);
    assert!(cache.get(&key(2, 0)).is_none());
    assert!(cache.get(&key(3, 0)).is_some());
}

#[test]
fn test_clear() {
    let cache = InferenceCache::new();
    cache.insert(key(1, 0), Ty::Number);
    cache.record_file_dependency(FileId(2), FileId(1));
    cache.clear();
    assert!(cache.is_empty());
    cache.insert(key(2, 0), Ty::Number);
    assert_eq!(cache.invalidate_file(FileId(1), &[]), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn test_concurrent_inserts_agree() {
    let cache = InferenceCache::new();
    let winners: Vec<Ty> = (0..128)
        .into_par_iter()
        .map(|i| {
            let ty = if i % 2 == 0 { Ty::Number } else { Ty::String };
            cache.insert(key(1, (i % 4) as u32), ty)
        })
        .collect();

    assert_eq!(cache.len(), 4);
    for (i, winner) in winners.iter().enumerate() {
        assert_eq!(Some(winner.clone()), cache.get(&key(1, (i % 4) as u32)));
    }
}
