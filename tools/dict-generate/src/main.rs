mod merge;
mod reverse;

use clap::{Arg, ArgAction, ArgMatches, Command};
use opencc_chain::Dictionary;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

const BLUE: &str = "\x1B[1;34m"; // Bold Blue
const RESET: &str = "\x1B[0m"; // Reset color
const DEFAULT_DICT_DIR: &str = "dictionary";

/// `*.txt` files directly under `dir`, sorted by name.
fn text_dictionaries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

fn compile(source: &Path, output_dir: &Path) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let stem = source
        .file_stem()
        .ok_or_else(|| format!("not a dictionary file: {}", source.display()))?;
    let target = output_dir.join(format!("{}.zst", stem.to_string_lossy()));

    let dict = Dictionary::load_text(source)?;
    dict.save_compressed(&target)?;
    info!(
        source = %source.display(),
        target = %target.display(),
        entries = dict.len(),
        "compiled dictionary"
    );
    Ok(target)
}

fn dict_dir_arg() -> Arg {
    Arg::new("input_dir")
        .short('d')
        .long("input-dir")
        .value_name("dir")
        .default_value(DEFAULT_DICT_DIR)
        .help("Directory holding the *.txt dictionaries.")
}

fn dict_dir(matches: &ArgMatches) -> Result<PathBuf, Box<dyn std::error::Error>> {
    let dir = PathBuf::from(
        matches
            .get_one::<String>("input_dir")
            .map(String::as_str)
            .unwrap_or(DEFAULT_DICT_DIR),
    );
    if !dir.is_dir() {
        return Err(format!("dictionary directory not found: {}", dir.display()).into());
    }
    Ok(dir)
}

fn run_compile(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let input_dir = dict_dir(matches)?;
    let output_dir = matches
        .get_one::<String>("output_dir")
        .map(PathBuf::from)
        .unwrap_or_else(|| input_dir.clone());
    fs::create_dir_all(&output_dir)?;

    let sources: Vec<PathBuf> = match matches.get_many::<String>("files") {
        Some(files) => files.map(|f| input_dir.join(f)).collect(),
        None => text_dictionaries(&input_dir)?,
    };
    if sources.is_empty() {
        return Err(format!("no *.txt dictionaries under {}", input_dir.display()).into());
    }

    for source in &sources {
        let target = compile(source, &output_dir)?;
        eprintln!("{BLUE}{} -> {}{RESET}", source.display(), target.display());
    }
    eprintln!("{BLUE}Compiled {} dictionaries.{RESET}", sources.len());
    Ok(())
}

fn run_reverse(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let dir = dict_dir(matches)?;
    let names: Vec<String> = match matches.get_many::<String>("names") {
        Some(names) => names.cloned().collect(),
        None => reverse::DEFAULT_INPUTS.iter().map(|n| n.to_string()).collect(),
    };

    for name in &names {
        let input = dir.join(format!("{name}.txt"));
        let output = dir.join(format!("{name}Rev.txt"));
        let entries = reverse::reverse_file(&input, &output)?;
        info!(input = %input.display(), output = %output.display(), entries, "reversed dictionary");
        eprintln!("{BLUE}{} -> {}{RESET}", input.display(), output.display());
    }
    Ok(())
}

fn run_merge(matches: &ArgMatches) -> Result<(), Box<dyn std::error::Error>> {
    let dir = dict_dir(matches)?;
    let inputs: Vec<PathBuf> = match matches.get_many::<String>("inputs") {
        Some(files) => files.map(|f| dir.join(f)).collect(),
        None => merge::DEFAULT_INPUTS.iter().map(|f| dir.join(f)).collect(),
    };
    let output = dir.join(
        matches
            .get_one::<String>("output")
            .map(String::as_str)
            .unwrap_or(merge::DEFAULT_OUTPUT),
    );

    let entries = merge::merge_files(&inputs, &output)?;
    info!(inputs = inputs.len(), output = %output.display(), entries, "merged dictionaries");
    eprintln!("{BLUE}Merged {} files -> {}{RESET}", inputs.len(), output.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let matches = Command::new("Dictionary Generator")
        .about(format!(
            "{BLUE}Dict Generator: compile, reverse and merge key<TAB>value dictionaries{RESET}"
        ))
        .after_help(
            "Examples:\n\
         \n\
         dict-generate --input-dir dictionary\n\
         dict-generate -d dictionary -o compiled STPhrases.txt STCharacters.txt\n\
         dict-generate reverse -d dictionary TWVariants TWPhrases\n\
         dict-generate merge -d dictionary -o TWPhrases.txt TWPhrasesIT.txt TWPhrasesName.txt\n\
         \n\
         Reference compiled output from a conversion config with {\"type\": \"zst\", \"file\": \"STPhrases.zst\"}.\n",
        )
        .args_conflicts_with_subcommands(true)
        .arg(dict_dir_arg())
        .arg(
            Arg::new("output_dir")
                .short('o')
                .long("output-dir")
                .value_name("dir")
                .help("Write .zst files to <dir>. Defaults to the input directory."),
        )
        .arg(
            Arg::new("files")
                .value_name("file")
                .action(ArgAction::Append)
                .help("Dictionary files to compile, relative to the input directory. All *.txt when omitted."),
        )
        .subcommand(
            Command::new("reverse")
                .about("Write <name>Rev.txt mapping every value back to its keys.")
                .arg(dict_dir_arg())
                .arg(
                    Arg::new("names")
                        .value_name("name")
                        .action(ArgAction::Append)
                        .help("Dictionary names without .txt. Defaults to TWVariants TWPhrases HKVariants."),
                ),
        )
        .subcommand(
            Command::new("merge")
                .about("Concatenate dictionaries into one file.")
                .arg(dict_dir_arg())
                .arg(
                    Arg::new("output")
                        .short('o')
                        .long("output")
                        .value_name("file")
                        .help("Merged file name in the input directory. Defaults to TWPhrases.txt."),
                )
                .arg(
                    Arg::new("inputs")
                        .value_name("file")
                        .action(ArgAction::Append)
                        .help("Files to merge, in order. Defaults to TWPhrasesIT.txt TWPhrasesName.txt TWPhrasesOther.txt."),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("reverse", sub)) => run_reverse(sub),
        Some(("merge", sub)) => run_merge(sub),
        _ => run_compile(&matches),
    }
}
