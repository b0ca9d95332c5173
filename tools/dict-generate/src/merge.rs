//! Merging split phrase lists into one dictionary file.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use opencc_chain::Dictionary;

/// Inputs merged when none are given, in order.
pub const DEFAULT_INPUTS: [&str; 3] = ["TWPhrasesIT.txt", "TWPhrasesName.txt", "TWPhrasesOther.txt"];
pub const DEFAULT_OUTPUT: &str = "TWPhrases.txt";

/// Concatenates dictionary texts in order. A part missing its final newline
/// gets one, so its last line never fuses with the next part's first.
pub fn merge_texts<'a, I>(parts: I) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut merged = String::new();
    for part in parts {
        merged.push_str(part);
        if !part.is_empty() && !part.ends_with('\n') {
            merged.push('\n');
        }
    }
    merged
}

/// Merges `inputs` into `output`. The merged text is parsed before anything
/// is written, so a malformed input leaves `output` untouched. Returns the
/// number of distinct keys.
pub fn merge_files(inputs: &[PathBuf], output: &Path) -> Result<usize, Box<dyn Error>> {
    let texts = inputs
        .iter()
        .map(|path| {
            fs::read_to_string(path).map_err(|err| format!("{}: {err}", path.display()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    let merged = merge_texts(texts.iter().map(String::as_str));

    let dict = Dictionary::from_text(&merged, output)?;
    fs::write(output, merged)?;
    Ok(dict.len())
}
