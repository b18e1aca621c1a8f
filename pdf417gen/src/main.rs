use std::borrow::Cow;

use anyhow::{Context, Result};
use clap::*;
use smolpdf417::*;

#[derive(Parser)]
struct Args {
    data: String,
    #[arg(short, long, default_value_t = 6)]
    columns: usize,
    #[arg(short, long, default_value_t = 2)]
    level: u8,
    #[arg(short, long, value_enum, default_value_t = _Encoding::Utf8)]
    encoding: _Encoding,
    /// Exact row count
    #[arg(short, long)]
    rows: Option<usize>,
    #[arg(long)]
    force_binary: bool,
    #[arg(long, default_value_t = 13)]
    numeric_threshold: usize,
    #[arg(long, default_value_t = 5)]
    text_threshold: usize,
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    output: OutputMode,
}

#[derive(Subcommand, Clone)]
enum OutputMode {
    Print,
    Gif {
        #[arg(long, short, default_value_t = 2)]
        scale: usize,
        /// Height of a row in modules
        #[arg(long, short, default_value_t = 3)]
        ratio: usize,
        /// Quiet zone in modules
        #[arg(long, short, default_value_t = 2)]
        padding: usize,
        #[arg(long, short, default_value = "ffffff")]
        white_color: String,
        #[arg(long, short, default_value = "000000")]
        black_color: String,
        path: String,
    },
    Codewords,
}

#[derive(ValueEnum, Clone)]
pub enum _Encoding {
    Utf8,
    Latin1,
}

impl From<_Encoding> for Encoding {
    fn from(value: _Encoding) -> Self {
        match value {
            _Encoding::Utf8 => Self::Utf8,
            _Encoding::Latin1 => Self::Latin1,
        }
    }
}

fn parse_color(color: &str) -> Result<[u8; 3]> {
    let c = u32::from_str_radix(color.trim_start_matches('#'), 16)
        .with_context(|| format!("failed to parse color {color:?}"))?;

    Ok([(c >> 16) as u8, (c >> 8) as u8, c as u8])
}

fn main() -> Result<()> {
    let args = Args::parse();

    let options = Options::default()
        .with_columns(args.columns)
        .with_security_level(args.level)
        .with_encoding(args.encoding.into())
        .with_thresholds(args.numeric_threshold, args.text_threshold)
        .with_force_binary(args.force_binary)
        .with_force_rows(args.rows);

    let symbol = options.encode_str(&args.data).context("failed to encode")?;

    if args.verbose {
        eprintln!(
            "{} rows, {} columns, security level {}, {} codewords",
            symbol.rows(),
            symbol.columns(),
            symbol.level(),
            symbol.rows() * symbol.columns(),
        );
    }

    match args.output {
        OutputMode::Print => print!("{symbol}"),
        OutputMode::Codewords => {
            for row in symbol.codewords() {
                let line = row.iter().map(|w| format!("{w:3}")).collect::<Vec<_>>().join(" ");
                println!("{line}");
            }
        },
        OutputMode::Gif { scale, ratio, padding, white_color, black_color, path } => {
            use gif::*;

            let width: u16 = ((symbol.width() + padding * 2) * scale)
                .try_into()
                .context("image too wide")?;
            let height: u16 = ((symbol.rows() * ratio + padding * 2) * scale)
                .try_into()
                .context("image too tall")?;

            let mut m = vec![0; width as usize * height as usize];
            for y in 0..symbol.rows() * ratio * scale {
                for x in 0..symbol.width() * scale {
                    if symbol.get(x / scale, y / (ratio * scale)) {
                        m[(y + padding * scale) * width as usize + x + padding * scale] = 1;
                    }
                }
            }

            let mut palette = parse_color(&white_color)?.to_vec();
            palette.extend(parse_color(&black_color)?);

            let mut image = std::fs::File::create(&path)
                .with_context(|| format!("failed to create {path}"))?;
            let mut encoder = Encoder::new(&mut image, width, height, &palette)?;

            let mut frame = Frame::default();
            frame.width = width;
            frame.height = height;
            frame.buffer = Cow::Owned(m);
            encoder.write_frame(&frame)?;
        },
    }

    Ok(())
}
