//! Offline data preparation CLI
//!
//! Turns PGN game corpora into the artifacts the policy stack consumes:
//! `move_dict.json` (the move codec) and `dataset.json` (encoded positions
//! with move labels). Running it again with new PGN files merges into the
//! existing artifacts: codec labels are never reassigned, the dataset is
//! appended to, and a feature-width mismatch aborts.
//!
//! Training itself happens outside this repository; an external trainer
//! consumes the dataset and produces `model.onnx`.

mod extract;

use std::env;
use std::fs::File;
use std::path::{Path, PathBuf};

use chess_policy::{Dataset, MoveCodec, DATASET_FILE, MOVE_DICT_FILE, NUM_FEATURES};

use extract::read_games;

const DEFAULT_MAX_GAMES: usize = 5000;

fn print_usage() {
    println!("policy-chess data preparation");
    println!();
    println!("Usage:");
    println!("  prepare_data <pgn-file>... [--max-games N] [--data-dir DIR]");
    println!();
    println!("Options:");
    println!("  --max-games N   games to ingest per PGN file (default {})", DEFAULT_MAX_GAMES);
    println!("  --data-dir DIR  artifact directory (default data/)");
    println!();
    println!("Examples:");
    println!("  prepare_data lichess_2016-08.pgn");
    println!("  prepare_data games1.pgn games2.pgn --max-games 1000 --data-dir data");
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 || args[1] == "help" || args[1] == "--help" || args[1] == "-h" {
        print_usage();
        return;
    }

    if let Err(e) = run(&args[1..]) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &[String]) -> Result<(), Box<dyn std::error::Error>> {
    let mut pgn_files: Vec<PathBuf> = Vec::new();
    let mut max_games = DEFAULT_MAX_GAMES;
    let mut data_dir = PathBuf::from("data");

    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--max-games" | "-n" => {
                if i + 1 < args.len() {
                    max_games = args[i + 1].parse()?;
                    i += 1;
                }
            }
            "--data-dir" | "-d" => {
                if i + 1 < args.len() {
                    data_dir = PathBuf::from(&args[i + 1]);
                    i += 1;
                }
            }
            other => pgn_files.push(PathBuf::from(other)),
        }
        i += 1;
    }

    if pgn_files.is_empty() {
        return Err("no PGN files given".into());
    }

    std::fs::create_dir_all(&data_dir)?;
    let codec_path = data_dir.join(MOVE_DICT_FILE);
    let dataset_path = data_dir.join(DATASET_FILE);

    // Resume from existing artifacts when present.
    let mut codec = if codec_path.exists() {
        let codec = MoveCodec::load(&codec_path)?;
        eprintln!("Loaded existing move codec: {} labels", codec.len());
        codec
    } else {
        MoveCodec::default()
    };

    let mut dataset = if dataset_path.exists() {
        let dataset = Dataset::load(&dataset_path)?;
        eprintln!("Loaded existing dataset: {} samples", dataset.len());
        dataset
    } else {
        Dataset::new(NUM_FEATURES)
    };

    for pgn_file in &pgn_files {
        eprintln!("Processing file: {}", pgn_file.display());
        let added = ingest_file(pgn_file, max_games, &mut codec, &mut dataset)?;
        eprintln!("  {} samples added ({} total)", added, dataset.len());
    }

    dataset.grow_classes(codec.len());
    codec.save(&codec_path)?;
    dataset.save(&dataset_path)?;

    println!(
        "Done: {} samples, {} move labels, saved to {}",
        dataset.len(),
        codec.len(),
        data_dir.display()
    );
    Ok(())
}

/// Ingests one PGN file: extract samples, grow the codec, label the batch
/// and append it to the dataset.
fn ingest_file(
    path: &Path,
    max_games: usize,
    codec: &mut MoveCodec,
    dataset: &mut Dataset,
) -> Result<usize, Box<dyn std::error::Error>> {
    let file = File::open(path)?;
    let games = read_games(file, max_games)?;
    eprintln!("  {} games ingested", games.len());

    let moves: Vec<&str> = games
        .iter()
        .flat_map(|g| g.iter().map(|s| s.uci.as_str()))
        .collect();

    if codec.is_empty() {
        *codec = MoveCodec::build(moves);
    } else {
        let added = codec.merge(moves)?;
        if added > 0 {
            eprintln!("  {} new move labels", added);
        }
    }

    let mut batch = Dataset::new(NUM_FEATURES);
    for sample in games.into_iter().flatten() {
        // Every move was just fed into the codec, so encode cannot miss.
        let label = codec
            .encode(&sample.uci)
            .ok_or_else(|| format!("move {} missing from codec after merge", sample.uci))?;
        batch.push(sample.features, label)?;
    }

    let added = batch.len();
    dataset.append(batch)?;
    Ok(added)
}
