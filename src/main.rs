use std::fs;

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use file_zipper::{
    properties::Properties,
    utils::{init_logging, timer::Timer},
    zipper::{read_text, CompressedFile, PROPERTIES_EXTENSION},
    HuffmanCodec, HuffmanError,
};

#[derive(Parser, Debug)]
#[command(about = "Compress and decompress text files with Huffman coding")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress a text file into <dest>.huff and <dest>.properties
    Compress {
        /// The text file to compress
        source: String,
        /// The destination basename of the archive
        dest: String,
        /// Print the compressed bit string
        #[arg(short, long, default_value_t = false)]
        show: bool,
    },
    /// Expand <source>.huff back into a text file
    Decompress {
        /// The basename of the archive
        source: String,
        /// The destination text file
        dest: String,
    },
    /// Print the frequency and code of every symbol of a text file
    Codes {
        /// The text file to analyse
        source: String,
        /// Print the table as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[derive(Serialize)]
struct CodeRow {
    symbol: char,
    frequency: u64,
    code: String,
}

fn compress(source: &str, dest: &str, show: bool) -> Result<(), HuffmanError> {
    let text = read_text(source)?;

    let mut timer = Timer::new();
    let file = CompressedFile::compress(&text)?;
    timer.stop();

    file.store(dest)?;

    let props = file.properties()?;
    info!(
        symbols = props.symbols,
        original_bits = props.original_bits,
        encoded_bits = props.encoded_bits,
        ratio = props.compression_ratio(),
        "compressed {} in {}ns", source, timer.total_time
    );

    if show {
        println!("{}", file.stream());
    }

    Ok(())
}

fn decompress(source: &str, dest: &str) -> Result<(), HuffmanError> {
    let file = CompressedFile::load(source)?;
    let expected = file.properties()?;

    match Properties::read(format!("{}.{}", source, PROPERTIES_EXTENSION)) {
        Ok(props) if props != expected => {
            tracing::warn!("properties of {} do not match the archive", source);
        },
        Ok(_) => {},
        Err(e) => tracing::warn!("cannot read the properties of {}: {}", source, e),
    }

    let mut timer = Timer::new();
    let text = file.decompress()?;
    timer.stop();

    fs::write(dest, &text)?;
    info!(symbols = file.symbols(), "decompressed {} in {}ns", source, timer.total_time);

    Ok(())
}

fn codes(source: &str, json: bool) -> Result<(), HuffmanError> {
    let text = read_text(source)?;
    let codec = HuffmanCodec::from_text(&text)?;

    let mut rows: Vec<CodeRow> = codec.frequencies().iter()
        .filter_map(|(symbol, frequency)| {
            codec.table().get(&symbol).map(|code| CodeRow { symbol, frequency, code: code.to_string() })
        })
        .collect();
    // Stable sort keeps first appearance among equal counts.
    rows.sort_by(|a, b| b.frequency.cmp(&a.frequency));

    if json {
        let out = serde_json::to_string_pretty(&rows).map_err(std::io::Error::from)?;
        println!("{}", out);
        return Ok(());
    }

    for row in rows.iter() {
        println!("{:?}\t{}\t{}", row.symbol, row.frequency, row.code);
    }
    let stats = codec.stats();
    println!(
        "{} symbols, {} bits -> {} bits ({:.1}%)",
        stats.symbols, stats.original_bits, stats.encoded_bits, stats.ratio() * 100.0
    );

    Ok(())
}

fn main() -> Result<(), HuffmanError> {
    init_logging();

    let args = Args::parse();

    match args.command {
        Command::Compress { source, dest, show } => compress(&source, &dest, show),
        Command::Decompress { source, dest } => decompress(&source, &dest),
        Command::Codes { source, json } => codes(&source, json),
    }
}
