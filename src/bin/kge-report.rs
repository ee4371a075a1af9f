//! Render the loss curves of a training log to `<log>.png`.

use std::path::PathBuf;

use kge_report::config;
use kge_report::logging;
use kge_report::report::{self, RenderOutcome, ReportRenderer};
use kge_report::training_log::{
    Count, LogRecord, StructureKind, UsesOntology, extract_log, format_duration,
};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone)]
struct CliOptions {
    log_path: PathBuf,
    force: bool,
    summary: bool,
    width: Option<u32>,
    height: Option<u32>,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let settings = config::load_or_default().map_err(|err| err.to_string())?;
    let renderer = ReportRenderer::new(
        options.width.unwrap_or(settings.report.width),
        options.height.unwrap_or(settings.report.height),
    );

    match report::generate_report(&options.log_path, &renderer, options.force)
        .map_err(|err| err.to_string())?
    {
        RenderOutcome::Written { path, record } => {
            println!("Wrote {}", path.display());
            if options.summary {
                print_summary(&record);
            }
        }
        RenderOutcome::Skipped { path } => {
            println!("{} already exists; use --force to overwrite", path.display());
            if options.summary {
                let record = extract_log(&options.log_path).map_err(|err| err.to_string())?;
                print_summary(&record);
            }
        }
    }
    Ok(())
}

fn print_summary(record: &LogRecord) {
    println!("log:             {}", record.source_name);
    println!("algorithm:       {}", record.algorithm);
    println!("entities:        {}", count_text(record.entity_count));
    println!("relation types:  {}", count_text(record.relation_type_count));
    println!("triples:         {}", record.triple_count);
    println!("batch size:      {}", record.batch_size);
    println!(
        "epochs:          {} logged, n_epochs = {}",
        record.epoch_series.len(),
        record
            .epoch_count
            .map_or_else(|| "unknown".to_string(), |n| n.to_string())
    );
    println!("best epoch:      {}", record.best_epoch);
    if let Some(loss) = record.best_valid_loss() {
        println!("best valid loss: {loss}");
    }
    println!("Hit@1:           {}", record.hit_at_1);
    let ontology = match record.uses_ontology {
        UsesOntology::Yes => "yes",
        UsesOntology::No => "no",
        UsesOntology::Unknown => "unknown",
    };
    println!("uses ontology:   {ontology}");
    let structure = match record.structure_kind {
        StructureKind::Direct => "direct",
        StructureKind::Indirect => "indirect",
        StructureKind::Unknown => "unknown",
    };
    println!("structure:       {structure}");
    for (label, duration) in [
        ("total time:     ", record.total_duration()),
        ("embedding time: ", record.embedding_duration()),
        ("classifier time:", record.classifier_duration()),
    ] {
        if let Some(duration) = duration {
            println!("{label} {}", format_duration(duration));
        }
    }
}

fn count_text(count: Option<Count>) -> String {
    match count {
        Some(Count::Known(value)) => value.to_string(),
        Some(Count::Ambiguous) => "ambiguous (runs disagree)".to_string(),
        None => "unknown".to_string(),
    }
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut log_path: Option<PathBuf> = None;
    let mut force = false;
    let mut summary = false;
    let mut width: Option<u32> = None;
    let mut height: Option<u32> = None;

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "--force" => force = true,
            "--summary" => summary = true,
            "--width" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--width requires a value".to_string())?;
                width = Some(parse_dimension("--width", value)?);
            }
            "--height" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--height requires a value".to_string())?;
                height = Some(parse_dimension("--height", value)?);
            }
            flag if flag.starts_with('-') => {
                return Err(format!("Unknown argument: {flag}\n\n{}", help_text()));
            }
            path => {
                if log_path.is_some() {
                    return Err(format!("Unexpected extra argument: {path}"));
                }
                log_path = Some(PathBuf::from(path));
            }
        }
        idx += 1;
    }

    let log_path = log_path.ok_or_else(|| format!("Missing log file\n\n{}", help_text()))?;
    Ok(CliOptions {
        log_path,
        force,
        summary,
        width,
        height,
    })
}

fn parse_dimension(flag: &str, value: &str) -> Result<u32, String> {
    value
        .parse::<u32>()
        .map_err(|_| format!("Invalid {flag} value: {value}"))
}

fn help_text() -> String {
    [
        "kge-report",
        "",
        "Draw the training and validation loss curves of a training log.",
        "",
        "Usage:",
        "  kge-report <log-file> [--force] [--summary] [--width <px>] [--height <px>]",
        "",
        "Options:",
        "  --force         Overwrite <log-file>.png if it already exists.",
        "  --summary       Print the extracted run details to stdout.",
        "  --width <px>    Image width, 240 to 4096 (default from config, 800).",
        "  --height <px>   Image height, 180 to 4096 (default from config, 600).",
    ]
    .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn parses_positional_log_and_flags() {
        let options = parse_args(args(&["run.log", "--force", "--width", "1024"])).unwrap();
        assert_eq!(options.log_path, PathBuf::from("run.log"));
        assert!(options.force);
        assert!(!options.summary);
        assert_eq!(options.width, Some(1024));
        assert_eq!(options.height, None);
    }

    #[test]
    fn missing_log_is_an_error() {
        assert!(parse_args(args(&["--summary"])).is_err());
    }

    #[test]
    fn rejects_unknown_flags_and_bad_sizes() {
        assert!(parse_args(args(&["run.log", "--color"])).is_err());
        assert!(parse_args(args(&["run.log", "--height", "tall"])).is_err());
        assert!(parse_args(args(&["a.log", "b.log"])).is_err());
    }
}
