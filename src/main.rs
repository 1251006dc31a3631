use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, ValueEnum};

use docket_pdf::{
    DocumentKind, DocumentModel, Error, FontMetrics, LayoutConfig, PaperSize, StandardFonts,
    TrueTypeFonts,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    Quotation,
    Report,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Paper {
    A4,
    Letter,
}

/// Render a quotation or service report from a JSON document model.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    /// Document model (JSON)
    input: PathBuf,
    /// Output PDF path
    output: PathBuf,
    #[arg(long, value_enum, default_value_t = Kind::Quotation)]
    kind: Kind,
    /// Override the paper size of the chosen kind
    #[arg(long, value_enum)]
    paper: Option<Paper>,
    /// Layout configuration (JSON); missing fields use the kind's defaults
    #[arg(long)]
    config: Option<PathBuf>,
    /// Regular-weight TrueType/OpenType font to embed instead of Helvetica
    #[arg(long, requires = "font_bold")]
    font_regular: Option<PathBuf>,
    /// Bold-weight font, required with --font-regular
    #[arg(long, requires = "font_regular")]
    font_bold: Option<PathBuf>,
    /// Print a data: URI of the result for previewing
    #[arg(long)]
    preview: bool,
}

fn read(path: &Path) -> Result<Vec<u8>, Error> {
    std::fs::read(path).map_err(|e| {
        Error::Io(std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())))
    })
}

fn load_config(cli: &Cli) -> Result<LayoutConfig, Error> {
    let kind = match cli.kind {
        Kind::Quotation => DocumentKind::Quotation,
        Kind::Report => DocumentKind::ServiceReport,
    };
    let mut config = match &cli.config {
        Some(path) => {
            // Start from the kind's preset and overlay the file's fields.
            let preset = LayoutConfig::for_kind(kind);
            let overrides: serde_json::Value = serde_json::from_slice(&read(path)?)?;
            let mut merged = serde_json::to_value(&preset)?;
            if let (Some(base), Some(extra)) = (merged.as_object_mut(), overrides.as_object()) {
                for (k, v) in extra {
                    base.insert(k.clone(), v.clone());
                }
            }
            serde_json::from_value(merged)?
        }
        None => LayoutConfig::for_kind(kind),
    };
    if let Some(paper) = cli.paper {
        config = config.with_paper(match paper {
            Paper::A4 => PaperSize::A4,
            Paper::Letter => PaperSize::Letter,
        });
    }
    Ok(config)
}

fn run(cli: &Cli) -> Result<(), Error> {
    let model = DocumentModel::from_json(&read(&cli.input)?)?;
    let config = load_config(cli)?;

    let metrics: Box<dyn FontMetrics> = match (&cli.font_regular, &cli.font_bold) {
        (Some(regular), Some(bold)) => Box::new(TrueTypeFonts::from_files(regular, bold)?),
        _ => Box::new(StandardFonts),
    };

    if cli.preview {
        let bytes = docket_pdf::render(&model, &config, metrics.as_ref())?;
        std::fs::write(&cli.output, &bytes)?;
        println!("{}", docket_pdf::preview_data_uri(&bytes));
    } else {
        docket_pdf::write_document(&model, &config, metrics.as_ref(), &cli.output)?;
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
