//! Reversed dictionaries: every alternative of a value becomes a key that maps
//! back to the source keys it came from.
//!
//! `TWVariants.txt` reversed gives `TWVariantsRev.txt`, which the Taiwan to
//! Simplified conversions read.

use std::collections::BTreeMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use opencc_chain::Dictionary;

/// Dictionaries reversed when no names are given.
pub const DEFAULT_INPUTS: [&str; 3] = ["TWVariants", "TWPhrases", "HKVariants"];

/// Reverses `dict`. Source keys sharing a target are joined with a space, in
/// key order; output is sorted by the new key.
pub fn reverse_entries(dict: &Dictionary) -> Vec<(String, String)> {
    let mut reversed: BTreeMap<&str, Vec<String>> = BTreeMap::new();
    for (key, value) in dict.entries() {
        for target in value.split(' ').filter(|t| !t.is_empty()) {
            reversed.entry(target).or_default().push(key.clone());
        }
    }
    reversed
        .into_iter()
        .map(|(target, sources)| (target.to_string(), sources.join(" ")))
        .collect()
}

/// Renders entries in `key<TAB>value` dictionary format.
pub fn to_text(entries: &[(String, String)]) -> String {
    let mut out = String::new();
    for (key, value) in entries {
        out.push_str(key);
        out.push('\t');
        out.push_str(value);
        out.push('\n');
    }
    out
}

/// Reads `input`, writes its reverse to `output`, returns the entry count.
pub fn reverse_file(input: &Path, output: &Path) -> Result<usize, Box<dyn Error>> {
    let dict = Dictionary::load_text(input)?;
    let entries = reverse_entries(&dict);
    fs::write(output, to_text(&entries))?;
    Ok(entries.len())
}
