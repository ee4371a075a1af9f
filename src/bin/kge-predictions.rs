//! Filter a prediction file by ontology membership and label its IRIs.

use std::path::PathBuf;
use std::time::Duration;

use kge_report::config;
use kge_report::logging;
use kge_report::prediction::{
    FilterCriterion, Ontology, filter_file, generate_query_file, humanize_file,
};
use kge_report::sparql::HttpEndpoint;

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Debug, Clone, Default)]
struct CliOptions {
    file: PathBuf,
    endpoint: Option<String>,
    nb_ancestors: Option<u32>,
    ontology: Option<String>,
    generate_query: bool,
    cutoff: Option<usize>,
    domains: Vec<String>,
}

fn run() -> Result<(), String> {
    let options = parse_args(std::env::args().skip(1).collect())?;
    if let Err(err) = logging::init() {
        eprintln!("Logging disabled: {err}");
    }
    let settings = config::load_or_default().map_err(|err| err.to_string())?;

    let endpoint_url = options.endpoint.unwrap_or(settings.endpoint.url);
    config::validate_endpoint(&endpoint_url).map_err(|err| err.to_string())?;
    let endpoint = HttpEndpoint::with_read_timeout(
        endpoint_url,
        Duration::from_secs(settings.endpoint.timeout_secs.max(1)),
    );

    let criterion = match options.nb_ancestors {
        Some(count) => {
            let name = options.ontology.unwrap_or(settings.prediction.ontology);
            let ontology = name.parse::<Ontology>().map_err(|err| err.to_string())?;
            FilterCriterion::MinAncestors { count, ontology }
        }
        None => {
            let domains = if options.domains.is_empty() {
                settings.prediction.domains
            } else {
                options.domains
            };
            FilterCriterion::domains(domains).map_err(|err| err.to_string())?
        }
    };

    let filtered =
        filter_file(&options.file, &criterion, &endpoint).map_err(|err| err.to_string())?;
    println!(
        "Kept {} of {} predictions -> {}",
        filtered.kept,
        filtered.kept + filtered.dropped,
        filtered.output.display()
    );

    if options.generate_query {
        let cutoff = options.cutoff.unwrap_or(settings.prediction.cutoff);
        let queries =
            generate_query_file(&filtered.output, cutoff).map_err(|err| err.to_string())?;
        println!("Wrote {} queries -> {}", queries.written, queries.path.display());
    }

    let tables = humanize_file(&filtered.output, &endpoint).map_err(|err| err.to_string())?;
    println!(
        "Wrote {} and {}",
        tables.markdown.display(),
        tables.csv.display()
    );
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<CliOptions, String> {
    let mut file: Option<PathBuf> = None;
    let mut options = CliOptions::default();

    let mut idx = 0usize;
    while idx < args.len() {
        match args[idx].as_str() {
            "-h" | "--help" => return Err(help_text()),
            "-f" | "--file" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--file requires a value".to_string())?;
                file = Some(PathBuf::from(value));
            }
            "-e" | "--endpoint" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--endpoint requires a value".to_string())?;
                options.endpoint = Some(value.to_string());
            }
            "-a" | "--nb-ancestors" | "--nb_ancestors" => {
                idx += 1;
                let value = args
                    .get(idx)
                    .ok_or_else(|| "--nb-ancestors requires a value".to_string())?;
                let count = value
                    .parse::<u32>()
                    .map_err(|_| format!("Invalid --nb-ancestors value: {value}"))?;
                options.nb_ancestors = Some(count);
            }
            "-o" | "--ontology" => {
                idx += 1;
                let value =
                    args.get(idx).ok_or_else(|| "--ontology requires a value".to_string())?;
                options.ontology = Some(value.to_string());
            }
            "-q" | "--generate-query" | "--generate_query" => options.generate_query = true,
            "-c" | "--cutoff" => {
                idx += 1;
                let value = args.get(idx).ok_or_else(|| "--cutoff requires a value".to_string())?;
                let cutoff = value
                    .parse::<usize>()
                    .map_err(|_| format!("Invalid --cutoff value: {value}"))?;
                options.cutoff = Some(cutoff);
            }
            "-d" | "--domains" => {
                let start = idx + 1;
                while args.get(idx + 1).is_some_and(|next| !next.starts_with('-')) {
                    idx += 1;
                    options.domains.push(args[idx].clone());
                }
                if idx < start {
                    return Err("--domains requires at least one term".to_string());
                }
            }
            unknown => return Err(format!("Unknown argument: {unknown}\n\n{}", help_text())),
        }
        idx += 1;
    }

    options.file = file.ok_or_else(|| format!("--file is required\n\n{}", help_text()))?;
    Ok(options)
}

fn help_text() -> String {
    [
        "kge-predictions",
        "",
        "Keep predictions whose phenotype qualifies against the ontology, then",
        "write Markdown and CSV copies with IRIs replaced by labels.",
        "",
        "Usage:",
        "  kge-predictions -f <file> [-e <url>] [-a <n> [-o <ontology>]] [-q [-c <n>]]",
        "                  [-d <term>...]",
        "",
        "Options:",
        "  -f, --file <file>          Prediction file to convert (required).",
        "  -e, --endpoint <url>       SPARQL endpoint (default from config).",
        "  -a, --nb-ancestors <n>     Keep terms with at least n ancestors.",
        "                             Without it, filter by ontology domain.",
        "  -o, --ontology <name>      Ontology for --nb-ancestors (default phenotype).",
        "  -q, --generate-query       Write a follow-up .rq query file.",
        "  -c, --cutoff <n>           Rows in the query file (default 50).",
        "  -d, --domains <term>...    Keep descendants of these terms (repeatable).",
    ]
    .join("\n")
}
