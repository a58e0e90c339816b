use proptest::prelude::*;
use rrzip::bits::BitWriter;
use rrzip::{decoder, encoder, huffman, Codebook, Mode};

// Left-align an arbitrary (hi, lo) pair for a given code length, zeroing
// every bit past `len` as the writer requires.
fn align(hi: u64, lo: u64, len: u32) -> (u64, u64)
{
    if len <= 64 {
        let hi = if len == 64 { hi } else { hi & (!0u64 << (64 - len)) };
        (hi, 0)
    }
    else {
        let lo = if len == 128 { lo } else { lo & (!0u64 << (128 - len)) };
        (hi, lo)
    }
}

fn reference_pack(codes: &[(u64, u64, u32)]) -> Vec<u8>
{
    let mut bits = Vec::new();
    for &(hi, lo, len) in codes {
        for i in 0..len {
            let bit = if i < 64 {
                (hi >> (63 - i)) & 1
            }
            else {
                (lo >> (127 - i)) & 1
            };
            bits.push(bit as u8);
        }
    }
    let mut bytes = vec![0u8; (bits.len() + 7) / 8];
    for (i, &b) in bits.iter().enumerate() {
        bytes[i >> 3] |= b << (7 - (i & 7));
    }
    bytes
}

proptest! {
    #[test]
    fn lossless_encode_round_trips(
        raw_sets in prop::collection::vec(
            prop::collection::btree_set(0u32..64, 1..20),
            1..30,
        ),
        inline_bits in 1u8..=32,
    ) {
        let sets: Vec<Vec<u32>> = raw_sets
            .into_iter()
            .map(|set| set.into_iter().collect())
            .collect();
        let (freq, max_vertex) = huffman::count_frequencies(&sets, 64);
        let book = Codebook::from_frequencies(&freq).unwrap();

        for original in &sets {
            let mut work = original.clone();
            let compressed =
                encoder::encode(&book, &mut work, max_vertex, Mode::Lossless, inline_bits);
            prop_assert_eq!(
                original.len(),
                compressed.code_count as usize + compressed.copy.len()
            );

            let mut out = Vec::new();
            let emitted =
                decoder::decode(&book, &compressed.bytes, compressed.code_count, &mut out);
            prop_assert_eq!(compressed.code_count as usize, emitted);

            out.extend_from_slice(&compressed.copy);
            out.sort_unstable();
            prop_assert_eq!(original, &out);
        }
    }

    #[test]
    fn every_codeword_decodes_back_to_its_vertex(
        freqs in prop::collection::vec(0u64..50, 1..40),
    ) {
        if let Some(book) = Codebook::from_frequencies(&freqs) {
            for v in 0..freqs.len() as u32 {
                prop_assert_eq!(freqs[v as usize] > 0, book.bit_len(v).is_some());
                if let Some(code) = book.code(v) {
                    prop_assert!(code.len >= 1);
                    let mut writer = BitWriter::new();
                    writer.append(code.hi, code.lo, code.len as u32);
                    let mut out = Vec::new();
                    let emitted = decoder::decode(&book, &writer.into_bytes(), 1, &mut out);
                    prop_assert_eq!(1, emitted);
                    prop_assert_eq!(vec![v], out);
                }
            }
        }
    }

    #[test]
    fn writer_matches_a_bit_by_bit_reference(
        raw_codes in prop::collection::vec(
            (any::<u64>(), any::<u64>(), 1u32..=128),
            1..20,
        ),
    ) {
        let codes: Vec<(u64, u64, u32)> = raw_codes
            .into_iter()
            .map(|(hi, lo, len)| {
                let (hi, lo) = align(hi, lo, len);
                (hi, lo, len)
            })
            .collect();
        let mut writer = BitWriter::new();
        for &(hi, lo, len) in &codes {
            writer.append(hi, lo, len);
        }
        let total: u32 = codes.iter().map(|&(_, _, len)| len).sum();
        prop_assert_eq!(total as usize, writer.bit_len());
        prop_assert_eq!(reference_pack(&codes), writer.into_bytes());
    }
}
