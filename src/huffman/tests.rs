use rand::Rng;

use crate::{bitstreams::BitSequence, error::HuffmanError};

use super::*;

fn codes_of(text: &str) -> CodeTable<char> {
    let freqs = build_frequency_table(text.chars());
    let tree = build_code_tree(&freqs).unwrap();
    build_code_table(&tree).unwrap()
}

fn code(table: &CodeTable<char>, c: char) -> String {
    table.get(&c).unwrap().to_string()
}

fn bits(s: &str) -> BitSequence {
    s.parse().unwrap()
}

#[test]
fn test_frequency_table() {
    let freqs = build_frequency_table("hello huffman".chars());

    assert_eq!(freqs.len(), 10);
    assert_eq!(freqs.total(), 13);
    assert_eq!(freqs.get(&'h'), 2);
    assert_eq!(freqs.get(&'l'), 2);
    assert_eq!(freqs.get(&'f'), 2);
    assert_eq!(freqs.get(&' '), 1);
    assert_eq!(freqs.get(&'z'), 0);

    let order: String = freqs.iter().map(|(c, _)| c).collect();
    assert_eq!(order, "helo ufman");
}

#[test]
fn test_empty_frequency_table() {
    let freqs = build_frequency_table("".chars());
    assert!(freqs.is_empty());
    assert_eq!(freqs.total(), 0);
    assert!(matches!(build_code_tree(&freqs), Err(HuffmanError::EmptyAlphabet)));
}

#[test]
fn test_empty_input() {
    let table = CodeTable::<char>::default();
    let stream = encode("".chars(), &table).unwrap();
    assert!(stream.is_empty());

    // Any tree will do: an empty stream never reaches it.
    let tree = build_code_tree(&build_frequency_table("ab".chars())).unwrap();
    assert!(decode(&stream, &tree).unwrap().is_empty());

    let codec = HuffmanCodec::from_text("").unwrap();
    assert!(codec.tree().is_none());
    assert!(codec.table().is_empty());
    assert!(codec.encode_text("").unwrap().is_empty());
    assert_eq!(codec.decode_to_string(&BitSequence::new()).unwrap(), "");
    assert!(matches!(codec.decode(&bits("0")), Err(HuffmanError::MalformedStream { .. })));
    assert_eq!(codec.stats().ratio(), 0.0);
}

#[test]
fn test_single_symbol() {
    let freqs = build_frequency_table("aaaa".chars());
    let tree = build_code_tree(&freqs).unwrap();
    let table = build_code_table(&tree).unwrap();

    assert_eq!(tree.num_leaves(), 1);
    assert_eq!(table.len(), 1);
    assert_eq!(code(&table, 'a'), "0");

    let stream = encode("aaaa".chars(), &table).unwrap();
    assert_eq!(stream.to_string(), "0000");

    let decoded: String = decode(&bits("0000"), &tree).unwrap().into_iter().collect();
    assert_eq!(decoded, "aaaa");
}

#[test]
fn test_single_symbol_rejects_right_branch() {
    let tree = build_code_tree(&build_frequency_table("aaaa".chars())).unwrap();
    match decode(&bits("001"), &tree) {
        Err(HuffmanError::MalformedStream { position, .. }) => assert_eq!(position, 2),
        other => panic!("Unexpected result {:?}", other),
    }
}

#[test]
fn test_abracadabra_codes() {
    // Counts a:5 b:2 r:2 c:1 d:1. With ties broken by first appearance the
    // merges are (c,d), (b,r), ((c,d),(b,r)) and finally (a, rest).
    let table = codes_of("abracadabra");

    assert_eq!(code(&table, 'a'), "0");
    assert_eq!(code(&table, 'c'), "100");
    assert_eq!(code(&table, 'd'), "101");
    assert_eq!(code(&table, 'b'), "110");
    assert_eq!(code(&table, 'r'), "111");

    let stream = encode("abracadabra".chars(), &table).unwrap();
    assert_eq!(stream.to_string(), "01101110100010101101110");
    assert_eq!(stream.len(), 23);
}

#[test]
fn test_tree_shape() {
    for text in ["ab", "abracadabra", "hello huffman", "the quick brown fox jumps over the lazy dog"] {
        let freqs = build_frequency_table(text.chars());
        let tree = build_code_tree(&freqs).unwrap();

        assert_eq!(tree.num_leaves(), freqs.len());
        assert_eq!(tree.num_internal(), freqs.len() - 1);
        assert_eq!(tree.weight(), text.chars().count() as u64);
        assert!(tree.validate().is_ok());
    }
}

#[test]
fn test_round_trip() {
    for text in [
        "a",
        "ab",
        "hello huffman",
        "abracadabra",
        "mississippi river\nmississippi delta\n",
        "ünïcödé, 漢字 and emoji 🦀🦀🦀",
    ] {
        let freqs = build_frequency_table(text.chars());
        let tree = build_code_tree(&freqs).unwrap();
        let table = build_code_table(&tree).unwrap();
        let stream = encode(text.chars(), &table).unwrap();
        let decoded: String = decode(&stream, &tree).unwrap().into_iter().collect();
        assert_eq!(decoded, text);
    }
}

#[test]
fn test_round_trip_bytes() {
    let data: Vec<u8> = (0..=255u8).chain([0, 0, 0, 7, 7, 255]).collect();
    let codec = HuffmanCodec::new(data.iter().copied()).unwrap();
    let stream = codec.encode(data.iter().copied()).unwrap();
    assert_eq!(codec.decode(&stream).unwrap(), data);
}

#[test]
fn test_prefix_free() {
    for text in ["hello huffman", "abracadabra", "aaaaabbbbcccdde"] {
        let table = codes_of(text);
        assert!(table.is_prefix_free());

        let codes: Vec<_> = table.iter().map(|(_, code)| code.clone()).collect();
        for (i, a) in codes.iter().enumerate() {
            for (j, b) in codes.iter().enumerate() {
                if i != j {
                    assert!(!a.is_prefix_of(b), "{} is a prefix of {}", a, b);
                }
            }
        }
    }
}

#[test]
fn test_determinism() {
    let text = "it was the best of times, it was the worst of times";

    let first = HuffmanCodec::from_text(text).unwrap();
    let second = HuffmanCodec::from_text(text).unwrap();

    assert_eq!(first.tree(), second.tree());
    assert_eq!(first.table(), second.table());
    assert_eq!(first.encode_text(text).unwrap(), second.encode_text(text).unwrap());
    assert_eq!(
        first.encode_text(text).unwrap().as_bytes(),
        second.encode_text(text).unwrap().as_bytes()
    );
}

#[test]
fn test_truncated_stream() {
    let tree = build_code_tree(&build_frequency_table("abracadabra".chars())).unwrap();

    // "1" is one bit into the three-bit codes.
    match decode(&bits("1"), &tree) {
        Err(HuffmanError::MalformedStream { position, .. }) => assert_eq!(position, 1),
        other => panic!("Unexpected result {:?}", other),
    }

    // a, b and then two bits of another code.
    assert!(matches!(decode(&bits("011011"), &tree), Err(HuffmanError::MalformedStream { .. })));
    assert_eq!(decode(&bits("0110111"), &tree).unwrap(), vec!['a', 'b', 'r']);
}

#[test]
fn test_unknown_symbol() {
    let table = codes_of("abc");
    match encode("abcd".chars(), &table) {
        Err(HuffmanError::UnknownSymbol(s)) => assert_eq!(s, "'d'"),
        other => panic!("Unexpected result {:?}", other),
    }
}

#[test]
fn test_encoder_write_next() {
    let table = codes_of("abracadabra");
    let mut encoder = HuffmanEncoder::new(&table);

    assert_eq!(encoder.write_next('a').unwrap(), 1);
    assert_eq!(encoder.write_next('r').unwrap(), 3);
    assert_eq!(encoder.written_bits(), 4);
    assert!(encoder.write_next('z').is_err());
    assert_eq!(encoder.finish().to_string(), "0111");
}

#[test]
fn test_compression_sanity() {
    let text = "hello huffman";
    let codec = HuffmanCodec::from_text(text).unwrap();
    let freqs = codec.frequencies();
    let table = codec.table();

    for (a, fa) in freqs.iter() {
        for (b, fb) in freqs.iter() {
            if fa > fb {
                assert!(
                    table.get(&a).unwrap().len() <= table.get(&b).unwrap().len(),
                    "{:?} (x{}) has a longer code than {:?} (x{})", a, fa, b, fb
                );
            }
        }
    }

    let stream = codec.encode_text(text).unwrap();
    let stats = codec.stats();
    assert_eq!(stats.symbols, 13);
    assert_eq!(stats.distinct_symbols, 10);
    assert_eq!(stats.original_bits, 104);
    assert_eq!(stats.encoded_bits, stream.len() as u64);
    assert!(stream.len() < 8 * text.len());
    assert!(stats.ratio() < 1.0);
}

#[test]
fn test_invalid_trees() {
    let tree = build_code_tree(&build_frequency_table("abc".chars())).unwrap();

    // Internal node with a single child.
    let mut nodes = tree.nodes().to_vec();
    let root = tree.root();
    nodes[root].right = None;
    let broken: CodeTree<char> = rebuild(nodes, root);
    assert!(matches!(build_code_table(&broken), Err(HuffmanError::InvalidTreeStructure(_))));

    // Dangling child index.
    let mut nodes = tree.nodes().to_vec();
    nodes[root].left = Some(42);
    let broken = rebuild(nodes, root);
    assert!(matches!(broken.validate(), Err(HuffmanError::InvalidTreeStructure(_))));

    // Cycle back to the root.
    let mut nodes = tree.nodes().to_vec();
    nodes[root].left = Some(root);
    let broken = rebuild(nodes, root);
    assert!(matches!(broken.validate(), Err(HuffmanError::InvalidTreeStructure(_))));

    // A leaf as root.
    let broken = rebuild(tree.nodes().to_vec(), 0);
    assert!(matches!(broken.validate(), Err(HuffmanError::InvalidTreeStructure(_))));

    // Weights that do not add up.
    let mut nodes = tree.nodes().to_vec();
    nodes[root].weight += 1;
    let broken = rebuild(nodes, root);
    assert!(matches!(broken.validate(), Err(HuffmanError::InvalidTreeStructure(_))));
}

#[test]
fn test_single_symbol_root_weight() {
    let tree = build_code_tree(&build_frequency_table("aaaa".chars())).unwrap();
    let root = tree.root();
    assert!(tree.validate().is_ok());

    let mut nodes = tree.nodes().to_vec();
    nodes[root].weight += 1;
    let broken = rebuild(nodes, root);
    assert_eq!(broken.weight(), 5);
    assert!(matches!(broken.validate(), Err(HuffmanError::InvalidTreeStructure(_))));
    assert!(matches!(build_code_table(&broken), Err(HuffmanError::InvalidTreeStructure(_))));
}

/// Goes through serde since the arena fields are private.
fn rebuild(nodes: Vec<Node<char>>, root: NodeId) -> CodeTree<char> {
    #[derive(serde::Serialize)]
    struct Raw {
        nodes: Vec<Node<char>>,
        root: NodeId,
    }
    let bytes = bincode::serialize(&Raw { nodes, root }).unwrap();
    bincode::deserialize(&bytes).unwrap()
}

#[test]
fn test_random_round_trips() {
    let mut rng = rand::thread_rng();

    for _ in 0..200 {
        let alphabet = rng.gen_range(1..40u32);
        let len = rng.gen_range(1..500);
        // Squaring the draw skews the distribution towards low symbols.
        let symbols: Vec<u32> = (0..len)
            .map(|_| {
                let x = rng.gen_range(0..alphabet);
                x * x / alphabet
            })
            .collect();

        let codec = HuffmanCodec::new(symbols.iter().copied()).unwrap();
        let tree = codec.tree().unwrap();

        assert_eq!(tree.num_leaves(), codec.frequencies().len());
        assert!(codec.table().is_prefix_free());

        let stream = codec.encode(symbols.iter().copied()).unwrap();
        assert_eq!(stream.len() as u64, codec.stats().encoded_bits);
        assert_eq!(codec.decode(&stream).unwrap(), symbols);
    }
}
