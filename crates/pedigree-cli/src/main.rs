use pedigree::{Anomaly, CoupleSet, LayoutConfig, Person, PersonGraph, audit, loader};
use serde::Serialize;
use std::io::Read;

#[derive(Debug)]
enum CliError {
    Usage(&'static str),
    Io(std::io::Error),
    Dataset(pedigree::Error),
    Json(serde_json::Error),
    AnomaliesFound(usize),
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Usage(msg) => write!(f, "{msg}"),
            CliError::Io(err) => write!(f, "I/O error: {err}"),
            CliError::Dataset(err) => write!(f, "{err}"),
            CliError::Json(err) => write!(f, "JSON error: {err}"),
            CliError::AnomaliesFound(n) => write!(f, "{n} dataset anomalies found"),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<pedigree::Error> for CliError {
    fn from(value: pedigree::Error) -> Self {
        Self::Dataset(value)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, Copy, Default)]
enum Command {
    #[default]
    Layout,
    Couples,
    Check,
}

#[derive(Debug, Default)]
struct Args {
    command: Command,
    input: Option<String>,
    pretty: bool,
    delimiter: Option<char>,
    canvas_width: Option<f64>,
    out: Option<String>,
}

fn usage() -> &'static str {
    "pedigree-cli\n\
\n\
USAGE:\n\
  pedigree-cli [layout] [--pretty] [--delimiter <char>] [--canvas-width <w>] [--out <path>] [<path>|-]\n\
  pedigree-cli couples [--pretty] [--delimiter <char>] [<path>|-]\n\
  pedigree-cli check [--delimiter <char>] [<path>|-]\n\
\n\
NOTES:\n\
  - If <path> is omitted or '-', input is read from stdin (JSON by default).\n\
  - Files ending in .json parse as a JSON record list; .csv and .tsv parse as\n\
    delimited tables. --delimiter forces the delimited form.\n\
  - layout prints positioned nodes, link segments, and couples as JSON;\n\
    use --out to write a file.\n\
  - check lists dataset anomalies and exits non-zero when any are found.\n\
"
}

fn parse_args(argv: &[String]) -> Result<Args, CliError> {
    let mut args = Args::default();

    let mut it = argv.iter().skip(1).peekable();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--help" | "-h" => return Err(CliError::Usage(usage())),
            "layout" => args.command = Command::Layout,
            "couples" => args.command = Command::Couples,
            "check" => args.command = Command::Check,
            "--pretty" => args.pretty = true,
            "--delimiter" => {
                let Some(raw) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let delim = match raw.as_str() {
                    "\\t" | "tab" => '\t',
                    s => {
                        let mut chars = s.chars();
                        match (chars.next(), chars.next()) {
                            (Some(c), None) => c,
                            _ => return Err(CliError::Usage(usage())),
                        }
                    }
                };
                args.delimiter = Some(delim);
            }
            "--canvas-width" => {
                let Some(w) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                let width = w.parse::<f64>().map_err(|_| CliError::Usage(usage()))?;
                if !(width.is_finite() && width > 0.0) {
                    return Err(CliError::Usage(usage()));
                }
                args.canvas_width = Some(width);
            }
            "--out" => {
                let Some(out) = it.next() else {
                    return Err(CliError::Usage(usage()));
                };
                args.out = Some(out.clone());
            }
            other if other.starts_with('-') && other != "-" => {
                return Err(CliError::Usage(usage()));
            }
            path => {
                if args.input.is_some() {
                    return Err(CliError::Usage(usage()));
                }
                args.input = Some(path.to_string());
            }
        }
    }

    Ok(args)
}

fn read_input(input: Option<&str>) -> Result<String, CliError> {
    match input {
        None | Some("-") => {
            let mut buf = String::new();
            std::io::stdin().read_to_string(&mut buf)?;
            Ok(buf)
        }
        Some(path) => Ok(std::fs::read_to_string(path)?),
    }
}

fn load_persons(text: &str, args: &Args) -> Result<Vec<Person>, CliError> {
    let delimiter = args.delimiter.or_else(|| {
        let path = args.input.as_deref()?;
        if path.ends_with(".csv") {
            Some(',')
        } else if path.ends_with(".tsv") {
            Some('\t')
        } else {
            None
        }
    });
    let persons = match delimiter {
        Some(delim) => loader::parse_delimited(text, delim),
        None => loader::parse_json(text),
    };
    persons.map_err(|e| CliError::Dataset(e.into()))
}

fn write_json(value: &impl Serialize, pretty: bool, out: Option<&str>) -> Result<(), CliError> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    match out {
        None => {
            println!("{text}");
            Ok(())
        }
        Some(path) => {
            std::fs::write(path, text)?;
            Ok(())
        }
    }
}

fn run(args: Args) -> Result<(), CliError> {
    let text = read_input(args.input.as_deref())?;
    let persons = load_persons(&text, &args)?;

    match args.command {
        Command::Layout => {
            let mut config = LayoutConfig::default();
            if let Some(width) = args.canvas_width {
                config.canvas_width = width;
            }
            let layout = pedigree::layout_family_tree(persons, &config)
                .map_err(|e| CliError::Dataset(e.into()))?;
            write_json(&layout, args.pretty, args.out.as_deref())
        }
        Command::Couples => {
            let graph = PersonGraph::new(persons);
            let couples = CoupleSet::resolve(&graph);
            write_json(&couples.couples().to_vec(), args.pretty, args.out.as_deref())
        }
        Command::Check => {
            let graph = PersonGraph::new(persons);
            let anomalies: Vec<Anomaly> = audit(&graph);
            if anomalies.is_empty() {
                println!("no anomalies found ({} people)", graph.len());
                return Ok(());
            }
            for anomaly in &anomalies {
                println!("{anomaly}");
            }
            Err(CliError::AnomaliesFound(anomalies.len()))
        }
    }
}

fn main() {
    let args = match parse_args(&std::env::args().collect::<Vec<_>>()) {
        Ok(v) => v,
        Err(CliError::Usage(msg)) => {
            eprintln!("{msg}");
            std::process::exit(2);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    };

    match run(args) {
        Ok(()) => {}
        Err(err @ CliError::AnomaliesFound(_)) => {
            eprintln!("{err}");
            std::process::exit(3);
        }
        Err(err) => {
            eprintln!("{err}");
            std::process::exit(1);
        }
    }
}
