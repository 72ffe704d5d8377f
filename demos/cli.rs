//! Command-line host for the edoc library.
//!
//! Encodes a file or folder into an `.edoc` archive, or decodes an archive
//! back; the archive's first byte says which kind it is, so decoding needs
//! no mode flag.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use clap::Parser;
use edoc::Result;
use edoc::cipher::Cipher;
use edoc::formats::archive::{self, Mode};
use edoc::tree::{DirTreeReader, DirTreeWriter};

#[derive(Parser)]
#[command(name = "edoc", version, about = "Password-based file/folder encoder")]
struct Args {
    /// Encode the input into an archive.
    #[arg(short, long, conflicts_with = "decode")]
    encode: bool,

    /// Decode an archive (kind auto-detected from its first byte).
    #[arg(short, long)]
    decode: bool,

    /// Password keying the cipher.
    #[arg(short, long)]
    password: String,

    /// File or folder to encode, or archive to decode.
    #[arg(short, long)]
    file: PathBuf,

    /// Output path. Defaults to `<file>.edoc` when encoding and to `<file>`
    /// minus its extension when decoding.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Remove the input after a successful run.
    #[arg(long)]
    delete_input: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    if !args.encode && !args.decode {
        return Err(edoc::Error::Parse("pass --encode or --decode"));
    }
    let mut cipher = Cipher::new(args.password.as_bytes())?;
    let mut rng = rand::thread_rng();
    let mut progress = |done: u64, total: u64| {
        if total > 0 {
            eprint!("\r{:5.1}%", done as f64 * 100.0 / total as f64);
        }
    };

    if args.encode {
        let out_path = args
            .output
            .clone()
            .unwrap_or_else(|| append_ext(&args.file));
        let mut out = BufWriter::new(File::create(&out_path)?);
        if args.file.is_dir() {
            let mut tree = DirTreeReader::new(&args.file);
            archive::encode_folder(&mut cipher, &mut tree, &mut out, &mut rng, &mut progress)?;
        } else {
            let mut input = BufReader::new(File::open(&args.file)?);
            archive::encode_file(&mut cipher, &mut input, &mut out, &mut rng, &mut progress)?;
        }
        out.flush()?;
    } else {
        let mut input = BufReader::new(File::open(&args.file)?);
        let out_path = args.output.clone().unwrap_or_else(|| strip_ext(&args.file));
        match archive::read_mode(&mut input)? {
            Mode::File => {
                let mut out = BufWriter::new(File::create(&out_path)?);
                archive::decode_file_body(&mut cipher, &mut input, &mut out, &mut progress)?;
                out.flush()?;
            }
            Mode::Folder => {
                let mut tree = DirTreeWriter::new(&out_path);
                archive::decode_folder(&mut cipher, &mut input, &mut tree, &mut progress)?;
            }
        }
    }
    eprintln!();

    if args.delete_input {
        if args.file.is_dir() {
            fs::remove_dir_all(&args.file)?;
        } else {
            fs::remove_file(&args.file)?;
        }
    }
    Ok(())
}

fn append_ext(path: &PathBuf) -> PathBuf {
    let mut s = path.clone().into_os_string();
    s.push(".edoc");
    PathBuf::from(s)
}

fn strip_ext(path: &PathBuf) -> PathBuf {
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(_)) => path.with_file_name(stem),
        _ => path.with_extension("out"),
    }
}
