use std::fs::File;
use std::io::{self, BufReader, BufWriter, IsTerminal, Read, Write};
use std::path::PathBuf;

use clap::{Arg, ArgAction, Command};
use encoding_rs::Encoding;
use encoding_rs_io::DecodeReaderBytesBuilder;
use tracing::info;
use tracing_subscriber::EnvFilter;

use opencc_chain::{EngineConfig, OpenCC, OpenccError};

const BLUE: &str = "\x1B[1;34m";
const RESET: &str = "\x1B[0m";

fn read_input(input: &mut dyn Read, is_console: bool) -> Result<Vec<u8>, io::Error> {
    let mut buffer = Vec::new();

    if is_console {
        // Read chunks of data when input is from the console
        let mut chunk = [0; 1024];
        loop {
            let bytes_read = input.read(&mut chunk)?;
            if bytes_read == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..bytes_read]);
        }
    } else {
        input.read_to_end(&mut buffer)?;
    }

    Ok(buffer)
}

fn is_utf8(label: &str) -> bool {
    label.eq_ignore_ascii_case("UTF-8") || label.eq_ignore_ascii_case("UTF8")
}

fn decode_input(buffer: &[u8], in_enc: &str) -> Result<String, io::Error> {
    if is_utf8(in_enc) {
        return String::from_utf8(buffer.to_vec()).map_err(|err| {
            io::Error::new(
                io::ErrorKind::InvalidData,
                format!("Input is not valid UTF-8: {}", err.utf8_error()),
            )
        });
    }
    let encoding = Encoding::for_label(in_enc.as_bytes()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unsupported input encoding: {}", in_enc),
        )
    })?;
    let mut decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(encoding))
        .build(buffer);
    let mut decoded = String::new();
    decoder.read_to_string(&mut decoded)?;
    Ok(decoded)
}

fn encode_and_write_output(
    output_str: &str,
    out_enc: &str,
    output: &mut dyn Write,
) -> Result<(), io::Error> {
    if is_utf8(out_enc) {
        return output.write_all(output_str.as_bytes());
    }
    let encoding = Encoding::for_label(out_enc.as_bytes()).ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("Unsupported output encoding: {}", out_enc),
        )
    })?;
    let (encoded_bytes, _, _) = encoding.encode(output_str);
    output.write_all(&encoded_bytes)
}

fn remove_utf8_bom(input: &mut Vec<u8>) {
    // UTF-8 BOM: EF BB BF
    if input.starts_with(&[0xEF, 0xBB, 0xBF]) {
        input.drain(0..3);
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let matches = Command::new("opencc-chain")
        .arg(
            Arg::new("input")
                .short('i')
                .long("input")
                .value_name("file")
                .help("Read original text from <file>."),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("file")
                .help("Write converted text to <file>."),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("conversion")
                .help("Conversion name, e.g. s2t, t2s, s2twp (a <conversion>.json in the config directory)")
                .required(true),
        )
        .arg(
            Arg::new("in_enc")
                .long("in-enc")
                .value_name("encoding")
                .default_value("UTF-8")
                .help("Encoding for input: UTF-8|GB2312|GBK|gb18030|BIG5"),
        )
        .arg(
            Arg::new("out_enc")
                .long("out-enc")
                .value_name("encoding")
                .default_value("UTF-8")
                .help("Encoding for output: UTF-8|GB2312|GBK|gb18030|BIG5"),
        )
        .arg(
            Arg::new("config_dir")
                .long("config-dir")
                .value_name("dir")
                .help("Directory of conversion configs [env: OPENCC_CONFIG_DIR, default: ./config]"),
        )
        .arg(
            Arg::new("dict_dir")
                .long("dict-dir")
                .value_name("dir")
                .help("Base directory for dictionaries [env: OPENCC_DICT_DIR, default: ./dictionary]"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .action(ArgAction::SetTrue)
                .help("Convert text runs in parallel."),
        )
        .about(format!(
            "{BLUE}opencc-chain: dictionary-chain Chinese text converter{RESET}"
        ))
        .get_matches();

    let input_file = matches.get_one::<String>("input");
    let output_file = matches.get_one::<String>("output");
    let conversion = matches
        .get_one::<String>("config")
        .ok_or("missing --config")?;
    let in_enc = matches
        .get_one::<String>("in_enc")
        .map(String::as_str)
        .unwrap_or("UTF-8");
    let out_enc = matches
        .get_one::<String>("out_enc")
        .map(String::as_str)
        .unwrap_or("UTF-8");

    let mut settings = EngineConfig::from_env().with_parallel(matches.get_flag("parallel"));
    if let Some(dir) = matches.get_one::<String>("config_dir") {
        settings.config_dir = PathBuf::from(dir);
    }
    if let Some(dir) = matches.get_one::<String>("dict_dir") {
        settings.dict_dir = PathBuf::from(dir);
    }

    // Build the chain before touching any input so a bad name fails fast.
    let mut opencc = OpenCC::with_config(settings);
    opencc.set_conversion(conversion);
    if let Err(err) = opencc.prepare() {
        if let OpenccError::ConversionNotFound { .. } = err {
            if let Ok(names) = opencc.available_conversions() {
                eprintln!("Valid conversions: {:?}", names);
            }
        }
        return Err(err.into());
    }

    let mut input: Box<dyn Read> = match input_file {
        Some(file_name) => Box::new(BufReader::new(File::open(file_name)?)),
        None => {
            if io::stdin().is_terminal() {
                eprintln!("{BLUE}Input text to convert, <ctrl-z> or <ctrl-d> to submit:{RESET}");
            }
            Box::new(io::stdin())
        }
    };

    let is_console = input_file.is_none();
    let mut buffer = read_input(&mut *input, is_console)?;

    if is_utf8(in_enc) {
        remove_utf8_bom(&mut buffer);
    }

    let input_str = decode_input(&buffer, in_enc)?;
    let output_str = opencc.convert(&input_str)?;

    let mut output = BufWriter::new(match output_file {
        Some(file_name) => Box::new(File::create(file_name)?) as Box<dyn Write>,
        None => Box::new(io::stdout()) as Box<dyn Write>,
    });
    encode_and_write_output(&output_str, out_enc, &mut output)?;
    output.flush()?;

    info!(
        conversion = %conversion,
        input = input_file.map_or("<stdin>", String::as_str),
        output = output_file.map_or("<stdout>", String::as_str),
        "conversion completed"
    );

    Ok(())
}
