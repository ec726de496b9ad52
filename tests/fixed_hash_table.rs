// FixedHashTable integration suite.
//
// Invariants exercised:
// - Addressing: `index_of(key) == fnv1a_64(key) % len`, always `< len`.
// - Determinism: repeated `retrieve` of a key yields the same bucket.
// - Fixed length: nothing the buckets do changes the table length.
// - Composition: a table of tables of trees routes on two keys.
use avl_hashtable::{fnv1a_64, BalancedTree, Bucket, FixedHashTable};

type Leaf = BalancedTree<String, (String, String, String)>;
type Nested = FixedHashTable<FixedHashTable<Leaf>>;

fn record(a: &str, b: &str, id: &str) -> (String, String, String) {
    (a.to_string(), b.to_string(), id.to_string())
}

// Test: routing through two levels.
// Verifies: a record inserted via retrieve(a).retrieve(b) is found the
// same way, lands in the expected bucket indices, and siblings sharing
// both grouping keys coexist in one terminal tree.
#[test]
fn two_level_routing() {
    let mut t: Nested = FixedHashTable::new(11);
    assert_eq!(t.len(), 17);

    let rows = [
        ("Liam", "Smith", "1"),
        ("Liam", "Smith", "2"),
        ("Liam", "Jones", "3"),
        ("Emma", "Smith", "4"),
    ];
    for (a, b, id) in rows {
        let out = t.retrieve(a).retrieve(b).insert(id.to_string(), record(a, b, id));
        assert!(out.is_inserted());
    }

    assert_eq!(t.get("Liam").get("Smith").len(), 2);
    assert_eq!(
        t.get("Emma").get("Smith").search("4"),
        Some(&record("Emma", "Smith", "4"))
    );

    let outer = (fnv1a_64(b"Liam") % 17) as usize;
    assert_eq!(t.index_of("Liam"), outer);
    let inner = t.get("Liam");
    assert_eq!(inner.len(), 11);
    assert_eq!(inner.index_of("Smith"), (fnv1a_64(b"Smith") % 11) as usize);

    assert_eq!(t.entry_count(), 4);
    assert_eq!(t.len(), 17, "length is fixed");
}

// Test: determinism and range over many keys.
#[test]
fn retrieve_is_stable_and_in_range() {
    let mut t: FixedHashTable<Leaf> = FixedHashTable::new(100);
    let len = t.len();
    for i in 0..1_000 {
        let key = format!("key-{i}");
        let idx = t.index_of(&key);
        assert!(idx < len);
        assert_eq!(idx, t.index_of(&key));
        let p1: *const Leaf = t.retrieve(&key);
        let p2: *const Leaf = t.retrieve(&key);
        assert_eq!(p1, p2);
    }
}

// Test: whole-table enumeration and removal fan out to every bucket.
#[test]
fn fan_out_covers_all_buckets() {
    let mut t: Nested = FixedHashTable::new(5);
    for i in 0..60 {
        let a = format!("a{}", i % 7);
        let b = format!("b{}", i % 5);
        let id = format!("{i:03}");
        let rec = (a.clone(), b.clone(), id.clone());
        let _ = t.retrieve(&a).retrieve(&b).insert(id, rec);
    }
    assert_eq!(t.entry_count(), 60);

    let mut ids = Vec::new();
    t.for_each_entry(&mut |r: &(String, String, String)| ids.push(r.2.clone()));
    ids.sort();
    let expected: Vec<String> = (0..60).map(|i| format!("{i:03}")).collect();
    assert_eq!(ids, expected);

    let removed = t.remove_entries(&mut |r: &(String, String, String)| r.0 == "a3");
    assert_eq!(removed, (0..60).filter(|i| i % 7 == 3).count());
    assert_eq!(t.entry_count(), 60 - removed);
    for bucket in t.buckets() {
        for tree in bucket.buckets() {
            tree.validate().expect("terminal trees stay valid");
        }
    }
}
