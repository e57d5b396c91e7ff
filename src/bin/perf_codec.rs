use clap::Parser;
use rand::Rng;
use file_zipper::{utils::{init_logging, timer::Timer}, HuffmanCodec, HuffmanError};

#[derive(Parser, Debug)]
#[command(about = "Time Huffman encoding and decoding of random skewed text")]
struct Args {
    /// Number of symbols per message
    #[arg(short, long, default_value_t = 1 << 20)]
    len: usize,
    /// Number of distinct letters to draw from
    #[arg(short, long, default_value_t = 26, value_parser = clap::value_parser!(u32).range(1..=65536))]
    alphabet: u32,
    /// Number of messages
    #[arg(short, long, default_value_t = 10)]
    rounds: usize,
}

/// Maps a uniform draw `x < alphabet` to a letter, squaring it so that low
/// letters are much more frequent than high ones.
fn skewed_letter(x: u32, alphabet: u32) -> char {
    let offset = (x as u64 * x as u64 / alphabet as u64) as u32;
    char::from_u32('a' as u32 + offset).unwrap_or('a')
}

fn gen_text(len: usize, alphabet: u32) -> String {
    let mut rng = rand::thread_rng();
    (0..len)
        .map(|_| skewed_letter(rng.gen_range(0..alphabet), alphabet))
        .collect()
}

fn main() -> Result<(), HuffmanError> {
    init_logging();

    let args = Args::parse();

    let mut build_time = Timer::new();
    let mut encode_time = Timer::new();
    let mut decode_time = Timer::new();
    let mut encoded_bits = 0u64;
    let mut original_bits = 0u64;

    for _ in 0..args.rounds {
        let text = gen_text(args.len, args.alphabet);

        build_time.start();
        let codec = HuffmanCodec::from_text(&text)?;
        build_time.stop();

        encode_time.start();
        let stream = codec.encode_text(&text)?;
        encode_time.stop();

        decode_time.start();
        let decoded = codec.decode_to_string(&stream)?;
        decode_time.stop();

        assert_eq!(decoded, text, "Round trip failed");

        encoded_bits += stream.len() as u64;
        original_bits += codec.stats().original_bits;
    }

    let mut out_stats = String::new();

    out_stats.push_str("################### Huffman codec stats ###################\n");
    out_stats.push_str(&format!("rounds {} of {} symbols\n", args.rounds, args.len));
    out_stats.push_str(&format!("time build {} ns (mean {} ns)\n", build_time.total_time, build_time.mean()));
    out_stats.push_str(&format!("time encode {} ns (mean {} ns)\n", encode_time.total_time, encode_time.mean()));
    out_stats.push_str(&format!("time decode {} ns (mean {} ns)\n", decode_time.total_time, decode_time.mean()));
    if original_bits > 0 {
        out_stats.push_str(&format!("ratio {:.4}\n", encoded_bits as f64 / original_bits as f64));
    }

    print!("{}", out_stats);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_skewed_letter() {
        assert_eq!(skewed_letter(0, 26), 'a');
        assert_eq!(skewed_letter(25, 26), 'y');
        assert_eq!(skewed_letter(0, 1), 'a');

        // The square no longer fits in a u32.
        assert_eq!(skewed_letter(65535, 65536), char::from_u32('a' as u32 + 65534).unwrap());
    }

    #[test]
    fn test_alphabet_range() {
        assert!(Args::try_parse_from(["perf_codec", "--alphabet", "0"]).is_err());
        assert!(Args::try_parse_from(["perf_codec", "--alphabet", "65537"]).is_err());
        assert_eq!(Args::try_parse_from(["perf_codec", "--alphabet", "65536"]).unwrap().alphabet, 65536);
    }
}
