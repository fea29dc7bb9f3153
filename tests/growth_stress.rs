//! Growth stress: the compact table must keep every mapping through many
//! grow/rehash cycles starting from a minimal capacity.

use taxocache::{CategoryPath, CompactLabelToOrdinal, LabelToOrdinal, INVALID_ORDINAL};

#[test]
fn test_thousands_of_labels_from_minimal_capacity() {
    for num_hash_arrays in 1..=3 {
        let mut table = CompactLabelToOrdinal::new(2, 0.75, num_hash_arrays);
        let labels: Vec<CategoryPath> = (0..5000)
            .map(|i| {
                let dim = format!("d{}", i % 37);
                let name = i.to_string();
                CategoryPath::new(&[dim.as_str(), name.as_str()])
            })
            .collect();

        for label in &labels {
            let ordinal = table.get_next_ordinal();
            table.add_label(label, ordinal).unwrap();
        }

        assert_eq!(table.max_ordinal(), 5000);
        for (i, label) in labels.iter().enumerate() {
            assert_eq!(
                table.get_ordinal(label),
                i as i32,
                "lost {:?} with {} hash arrays",
                label,
                num_hash_arrays
            );
        }
        assert_eq!(
            table.get_ordinal(&CategoryPath::new(&["d0", "99999"])),
            INVALID_ORDINAL
        );
        // Growth exists to drain the overflow map; it must not have
        // swallowed the whole data set.
        assert!(table.collision_map_size() < labels.len() / 2);
    }
}

#[test]
fn test_deep_and_unicode_labels_survive_growth() {
    let mut table = CompactLabelToOrdinal::new(2, 0.75, 3);
    let mut labels = Vec::new();
    for i in 0..800 {
        let tail = format!("値{}", i);
        labels.push(CategoryPath::new(&[
            "catalogue",
            "départements",
            "書籍",
            tail.as_str(),
        ]));
    }
    for (i, label) in labels.iter().enumerate() {
        table.add_label(label, i as i32).unwrap();
    }
    for (i, label) in labels.iter().enumerate() {
        assert_eq!(table.get_ordinal(label), i as i32);
    }
}

#[test]
fn test_growth_keeps_idempotence_guarantees() {
    let mut table = CompactLabelToOrdinal::new(2, 0.75, 2);
    let labels: Vec<CategoryPath> = (0..1000)
        .map(|i| {
            let name = i.to_string();
            CategoryPath::new(&["k", name.as_str()])
        })
        .collect();
    for (i, label) in labels.iter().enumerate() {
        table.add_label(label, i as i32).unwrap();
    }
    // Re-adding after many grows: same ordinal is silent, different fails.
    for (i, label) in labels.iter().enumerate() {
        table.add_label(label, i as i32).unwrap();
        assert!(table.add_label(label, i as i32 + 1).is_err());
    }
}
