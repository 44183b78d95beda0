use std::collections::BTreeMap;
use std::ops::Bound;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use patricia_store::prelude::*;

mod common {
    use std::io::Write;

    pub fn init() {
        let _ = env_logger::builder()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .is_test(true)
            .try_init();
    }
}

// Random byte keys that are pairwise distinguishable by their bits: keys
// that only differ in trailing zero bits (or are entirely zero) share one
// slot in a bitwise trie, so the generator keeps the last byte nonzero.
fn random_keys(rng: &mut StdRng, count: usize) -> Vec<Vec<u8>> {
    (0..count)
        .map(|_| {
            let len = rng.random_range(1..=3);
            let mut key: Vec<u8> = (0..len).map(|_| rng.random()).collect();
            let last = key.len() - 1;
            key[last] = rng.random_range(1..=u8::MAX);
            key
        })
        .collect()
}

#[test]
fn test_bit_order_iteration() -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    for key in [vec![0x01u8], vec![0xFF], vec![0x00], vec![0x80]] {
        trie.insert(key, ())?;
    }
    let keys: Vec<Vec<u8>> = trie.keys().cloned().collect();
    assert_eq!(keys, [vec![0x00u8], vec![0x01], vec![0x80], vec![0xFF]]);
    Ok(())
}

#[test]
fn test_iteration_matches_reference_order(
) -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let mut rng = StdRng::seed_from_u64(7);
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    let mut reference: BTreeMap<Vec<u8>, u32> = BTreeMap::new();

    for (n, key) in random_keys(&mut rng, 400).into_iter().enumerate() {
        trie.insert(key.clone(), n as u32)?;
        reference.insert(key, n as u32);
    }
    assert_eq!(trie.len(), reference.len());

    let trie_entries: Vec<(Vec<u8>, u32)> =
        trie.iter().map(|(k, v)| (k.clone(), *v)).collect();
    let ref_entries: Vec<(Vec<u8>, u32)> =
        reference.iter().map(|(k, v)| (k.clone(), *v)).collect();
    assert_eq!(trie_entries, ref_entries);

    // every key is found, and iterating yields each exactly once
    for (key, value) in &reference {
        assert_eq!(trie.get(key), Some(value));
    }
    Ok(())
}

#[test]
fn test_interleaved_removal_keeps_order(
) -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let mut rng = StdRng::seed_from_u64(99);
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    let mut reference: BTreeMap<Vec<u8>, u32> = BTreeMap::new();

    for round in 0..6 {
        for (n, key) in random_keys(&mut rng, 120).into_iter().enumerate() {
            let value = round * 1000 + n as u32;
            trie.insert(key.clone(), value)?;
            reference.insert(key, value);
        }
        // drop a random half of what is there
        let doomed: Vec<Vec<u8>> = reference
            .keys()
            .filter(|_| rng.random())
            .cloned()
            .collect();
        for key in doomed {
            assert_eq!(trie.remove(&key), reference.remove(&key));
        }
        let trie_keys: Vec<Vec<u8>> = trie.keys().cloned().collect();
        let ref_keys: Vec<Vec<u8>> = reference.keys().cloned().collect();
        assert_eq!(trie_keys, ref_keys);
    }
    Ok(())
}

#[test]
fn test_first_and_last() -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    assert_eq!(trie.first_key_value(), None);
    assert_eq!(trie.last_key_value(), None);

    trie.insert(vec![0x50], 1)?;
    assert_eq!(trie.first_key_value(), Some((&vec![0x50u8], &1)));
    assert_eq!(trie.last_key_value(), Some((&vec![0x50u8], &1)));

    trie.insert(vec![0x10], 2)?;
    trie.insert(vec![0xF0], 3)?;
    assert_eq!(trie.first_key_value(), Some((&vec![0x10u8], &2)));
    assert_eq!(trie.last_key_value(), Some((&vec![0xF0u8], &3)));
    Ok(())
}

#[test]
fn test_last_of_a_root_only_trie() -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    trie.insert(vec![], "root")?;
    assert_eq!(trie.first_key_value(), Some((&vec![], &"root")));
    assert_eq!(trie.last_key_value(), Some((&vec![], &"root")));
    Ok(())
}

#[test]
fn test_double_ended_iteration() -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let mut rng = StdRng::seed_from_u64(21);
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    for key in random_keys(&mut rng, 50) {
        trie.insert(key, ())?;
    }
    let forward: Vec<Vec<u8>> = trie.keys().cloned().collect();
    let mut backward: Vec<Vec<u8>> =
        trie.iter().rev().map(|(k, _)| k.clone()).collect();
    backward.reverse();
    assert_eq!(forward, backward);
    assert_eq!(trie.iter().len(), trie.len());
    Ok(())
}

#[test]
fn test_into_iter_consumes_in_order() -> Result<(), Box<dyn std::error::Error>>
{
    common::init();
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    for b in [0x40u8, 0x20, 0x60] {
        trie.insert(vec![b], b as u32)?;
    }
    let entries: Vec<(Vec<u8>, u32)> = trie.into_iter().collect();
    assert_eq!(
        entries,
        [
            (vec![0x20u8], 0x20),
            (vec![0x40], 0x40),
            (vec![0x60], 0x60)
        ]
    );
    Ok(())
}

#[test]
fn test_ordered_neighbors_match_reference(
) -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let mut rng = StdRng::seed_from_u64(1234);
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    let mut reference: BTreeMap<Vec<u8>, u32> = BTreeMap::new();

    for (n, key) in random_keys(&mut rng, 300).into_iter().enumerate() {
        trie.insert(key.clone(), n as u32)?;
        reference.insert(key, n as u32);
    }

    // probe with stored keys and fresh ones alike
    let mut probes: Vec<Vec<u8>> = reference.keys().take(60).cloned().collect();
    probes.extend(random_keys(&mut rng, 200));

    for probe in probes {
        let ceiling = reference.range(probe.clone()..).next();
        assert_eq!(
            trie.ceiling(&probe),
            ceiling,
            "ceiling of {:02X?}",
            probe
        );
        let higher = reference
            .range((Bound::Excluded(probe.clone()), Bound::Unbounded))
            .next();
        assert_eq!(trie.higher(&probe), higher, "higher of {:02X?}", probe);
        let floor = reference.range(..=probe.clone()).next_back();
        assert_eq!(trie.floor(&probe), floor, "floor of {:02X?}", probe);
        let lower = reference.range(..probe.clone()).next_back();
        assert_eq!(trie.lower(&probe), lower, "lower of {:02X?}", probe);
    }
    Ok(())
}

#[test]
fn test_neighbors_around_the_root_entry(
) -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
    trie.insert(vec![], 0)?;
    trie.insert(vec![0x40], 1)?;

    assert_eq!(trie.ceiling(&vec![]), Some((&vec![], &0)));
    assert_eq!(trie.higher(&vec![]), Some((&vec![0x40u8], &1)));
    assert_eq!(trie.floor(&vec![]), Some((&vec![], &0)));
    assert_eq!(trie.lower(&vec![]), None);

    assert_eq!(trie.ceiling(&vec![0x41]), None);
    assert_eq!(trie.floor(&vec![0x41]), Some((&vec![0x40u8], &1)));
    assert_eq!(trie.lower(&vec![0x40]), Some((&vec![], &0)));
    Ok(())
}

#[test]
fn test_biguint_keys_follow_their_bit_order(
) -> Result<(), Box<dyn std::error::Error>> {
    common::init();
    use num_bigint::BigUint;

    let analyzer = BigUintKeyAnalyzer::new();
    let mut trie = PatriciaTrie::new(analyzer);
    for n in 0u32..20 {
        trie.insert(BigUint::from(n), n)?;
    }
    assert_eq!(trie.len(), 20);

    let keys: Vec<BigUint> = trie.keys().cloned().collect();
    let mut expected: Vec<BigUint> =
        (0u32..20).map(BigUint::from).collect();
    expected.sort_by(|a, b| analyzer.compare(a, b));
    assert_eq!(keys, expected);
    Ok(())
}
