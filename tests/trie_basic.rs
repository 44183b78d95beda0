mod common {
    use std::io::Write;

    pub fn init() {
        let _ = env_logger::builder()
            .format(|buf, record| writeln!(buf, "{}", record.args()))
            .is_test(true)
            .try_init();
    }
}

#[cfg(test)]
mod tests {
    use patricia_store::prelude::*;

    #[test]
    fn test_insert_get_remove() -> Result<(), Box<dyn std::error::Error>> {
        crate::common::init();
        let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());

        assert_eq!(trie.insert(vec![0x41], 1)?, None);
        assert_eq!(trie.insert(vec![0x42], 2)?, None);
        assert_eq!(trie.insert(vec![0x41, 0x42], 3)?, None);
        assert_eq!(trie.len(), 3);

        assert_eq!(trie.get(&vec![0x41]), Some(&1));
        assert_eq!(trie.get(&vec![0x42]), Some(&2));
        assert_eq!(trie.get(&vec![0x41, 0x42]), Some(&3));
        assert_eq!(trie.get(&vec![0x43]), None);
        assert!(trie.contains_key(&vec![0x41]));
        assert!(!trie.contains_key(&vec![0x40]));

        assert_eq!(trie.remove(&vec![0x42]), Some(2));
        assert_eq!(trie.remove(&vec![0x42]), None);
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.get(&vec![0x42]), None);
        assert_eq!(trie.get(&vec![0x41]), Some(&1));
        Ok(())
    }

    #[test]
    fn test_replacing_insert_keeps_size() -> Result<(), Box<dyn std::error::Error>>
    {
        crate::common::init();
        let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
        trie.insert(vec![0x10], "one")?;
        let size_after_first = trie.len();
        assert_eq!(trie.insert(vec![0x10], "two")?, Some("one"));
        assert_eq!(trie.len(), size_after_first);
        assert_eq!(trie.get(&vec![0x10]), Some(&"two"));
        Ok(())
    }

    #[test]
    fn test_get_mut() -> Result<(), Box<dyn std::error::Error>> {
        crate::common::init();
        let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
        trie.insert(vec![0x07], 7)?;
        if let Some(value) = trie.get_mut(&vec![0x07]) {
            *value += 1;
        }
        assert_eq!(trie.get(&vec![0x07]), Some(&8));
        Ok(())
    }

    #[test]
    fn test_zero_length_key_lives_at_the_root(
    ) -> Result<(), Box<dyn std::error::Error>> {
        crate::common::init();
        let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());

        trie.insert(vec![], "empty")?;
        assert_eq!(trie.len(), 1);
        assert_eq!(trie.get(&vec![]), Some(&"empty"));

        // it coexists with real keys and sorts before all of them
        trie.insert(vec![0x01], "one")?;
        trie.insert(vec![0x80], "high")?;
        assert_eq!(trie.len(), 3);
        let keys: Vec<&Vec<u8>> = trie.keys().collect();
        assert_eq!(keys, [&vec![], &vec![0x01], &vec![0x80]]);

        assert_eq!(trie.remove(&vec![]), Some("empty"));
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.get(&vec![]), None);
        assert_eq!(trie.get(&vec![0x01]), Some(&"one"));
        assert_eq!(trie.get(&vec![0x80]), Some(&"high"));
        Ok(())
    }

    #[test]
    fn test_all_zero_key_lives_at_the_root(
    ) -> Result<(), Box<dyn std::error::Error>> {
        crate::common::init();
        let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
        trie.insert(vec![0x00], "zero")?;
        trie.insert(vec![0x01], "one")?;
        assert_eq!(trie.len(), 2);
        assert_eq!(trie.get(&vec![0x00]), Some(&"zero"));
        assert_eq!(
            trie.first_key_value(),
            Some((&vec![0x00u8], &"zero"))
        );
        assert_eq!(trie.remove(&vec![0x00]), Some("zero"));
        assert_eq!(trie.len(), 1);
        Ok(())
    }

    #[test]
    fn test_insert_remove_round_trip() -> Result<(), Box<dyn std::error::Error>>
    {
        crate::common::init();
        let keys: Vec<Vec<u8>> = (1u8..=60).map(|b| vec![b]).collect();

        // removal in insertion order and in reverse both drain the trie
        for reversed in [false, true] {
            let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
            for key in &keys {
                trie.insert(key.clone(), key[0])?;
            }
            assert_eq!(trie.len(), keys.len());
            let mut order = keys.clone();
            if reversed {
                order.reverse();
            }
            for key in &order {
                assert_eq!(trie.remove(key), Some(key[0]));
            }
            assert!(trie.is_empty());
            assert_eq!(trie.iter().count(), 0);
        }
        Ok(())
    }

    #[test]
    fn test_clear() -> Result<(), Box<dyn std::error::Error>> {
        crate::common::init();
        let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
        for b in 0u8..10 {
            trie.insert(vec![b, 0x01], ())?;
        }
        trie.clear();
        assert!(trie.is_empty());
        assert_eq!(trie.get(&vec![0x01, 0x01]), None);
        trie.insert(vec![0x05], ())?;
        assert_eq!(trie.len(), 1);
        Ok(())
    }

    #[test]
    fn test_neighbor_lookups_leave_no_trace(
    ) -> Result<(), Box<dyn std::error::Error>> {
        crate::common::init();
        let mut trie = PatriciaTrie::new(ByteKeyAnalyzer::new());
        for b in [0x10u8, 0x20, 0x30] {
            trie.insert(vec![b], b)?;
        }
        let before = trie.mod_count();
        assert_eq!(trie.ceiling(&vec![0x15]), Some((&vec![0x20u8], &0x20)));
        assert_eq!(trie.floor(&vec![0x15]), Some((&vec![0x10u8], &0x10)));
        assert_eq!(trie.higher(&vec![0x20]), Some((&vec![0x30u8], &0x30)));
        assert_eq!(trie.lower(&vec![0x20]), Some((&vec![0x10u8], &0x10)));
        assert_eq!(trie.mod_count(), before);
        assert_eq!(trie.len(), 3);
        Ok(())
    }

    #[test]
    fn test_debug_output() -> Result<(), Box<dyn std::error::Error>> {
        crate::common::init();
        let mut trie = PatriciaTrie::new(U32KeyAnalyzer::new());
        trie.insert(1u32, "a")?;
        trie.insert(2u32, "b")?;
        assert_eq!(format!("{:?}", trie), r#"{1: "a", 2: "b"}"#);
        Ok(())
    }

    #[test]
    fn test_integer_keys() -> Result<(), Box<dyn std::error::Error>> {
        crate::common::init();
        let mut trie = PatriciaTrie::new(U32KeyAnalyzer::new());
        for n in [7u32, 1, 99, 512, 0x8000_0000] {
            trie.insert(n, n * 2)?;
        }
        assert_eq!(trie.get(&99), Some(&198));
        let keys: Vec<u32> = trie.keys().copied().collect();
        assert_eq!(keys, [1, 7, 99, 512, 0x8000_0000]);
        Ok(())
    }
}
