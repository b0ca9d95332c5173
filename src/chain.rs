//! Conversion chains: the ordered dictionary steps one named conversion applies.

use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::Deserialize;
use tracing::debug;

use crate::config::{ConversionConfig, DictDescriptor, EngineConfig};
use crate::dictionary_lib::{DictFormat, Dictionary, DictionaryCache};
use crate::error::{OpenccError, Result};
use crate::matcher;
use crate::segmenter::{segment, Token};

/// How the members of a [`DictGroup`] share a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupPolicy {
    /// The first member that matches anything in the run is applied to the
    /// whole run; later members are skipped for that run.
    #[default]
    FirstMatch,
    /// Each member only sees the spans earlier members left unmatched.
    PerSegment,
}

/// Ordered alternative dictionaries applied as one step.
#[derive(Debug, Clone)]
pub struct DictGroup {
    dicts: Vec<Arc<Dictionary>>,
    policy: GroupPolicy,
}

impl DictGroup {
    pub fn new(dicts: Vec<Arc<Dictionary>>, policy: GroupPolicy) -> Self {
        Self { dicts, policy }
    }

    pub fn dicts(&self) -> &[Arc<Dictionary>] {
        &self.dicts
    }

    pub fn policy(&self) -> GroupPolicy {
        self.policy
    }
}

/// One step of a conversion chain.
#[derive(Debug, Clone)]
pub enum ChainStep {
    Single(Arc<Dictionary>),
    Group(DictGroup),
}

/// An immutable, fully loaded conversion.
///
/// Built once by [`ConversionChain::build`]; afterwards it only reads its
/// dictionaries, so a shared `Arc<ConversionChain>` can convert from many
/// threads at once.
#[derive(Debug, Clone)]
pub struct ConversionChain {
    name: String,
    display_name: String,
    steps: Vec<ChainStep>,
}

impl ConversionChain {
    pub fn new(name: impl Into<String>, display_name: impl Into<String>, steps: Vec<ChainStep>) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            steps,
        }
    }

    /// Assembles the chain described by `config`, loading every referenced
    /// dictionary through `cache`.
    ///
    /// Leaves become [`ChainStep::Single`]; groups become
    /// [`ChainStep::Group`] with members in listed order. Groups nested in
    /// groups and empty groups are rejected with
    /// [`OpenccError::InvalidChain`].
    pub fn build(
        name: &str,
        config: &ConversionConfig,
        settings: &EngineConfig,
        cache: &mut DictionaryCache,
    ) -> Result<Self> {
        let mut steps = Vec::with_capacity(config.conversion_chain.len());

        for entry in &config.conversion_chain {
            let step = match entry.descriptor() {
                DictDescriptor::Group { dicts, policy } => {
                    if dicts.is_empty() {
                        return Err(OpenccError::invalid_chain(name, "group has no dictionaries"));
                    }
                    let members = dicts
                        .iter()
                        .map(|member| load_leaf(name, member, settings, cache))
                        .collect::<Result<Vec<_>>>()?;
                    ChainStep::Group(DictGroup::new(members, *policy))
                }
                leaf => ChainStep::Single(load_leaf(name, leaf, settings, cache)?),
            };
            steps.push(step);
        }

        debug!(conversion = name, steps = steps.len(), "built conversion chain");
        Ok(Self::new(name, config.name.clone(), steps))
    }

    /// Conversion key, e.g. `"s2twp"`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The `name` field of the config.
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn steps(&self) -> &[ChainStep] {
        &self.steps
    }

    /// Converts one delimiter-free run.
    pub fn convert_run(&self, run: &str) -> String {
        matcher::apply_chain(run, &self.steps)
    }

    /// Segments `text`, converts each text run, and re-interleaves the
    /// separators. With `parallel`, runs are converted on the rayon pool;
    /// the output is identical either way.
    pub fn convert(&self, text: &str, parallel: bool) -> String {
        let tokens = segment(text);

        if parallel {
            let pieces: Vec<Cow<'_, str>> = tokens
                .par_iter()
                .map(|token| self.convert_token(token))
                .collect();
            return pieces.concat();
        }

        let mut out = String::with_capacity(text.len());
        for token in &tokens {
            out.push_str(&self.convert_token(token));
        }
        out
    }

    fn convert_token<'a>(&self, token: &Token<'a>) -> Cow<'a, str> {
        match *token {
            Token::Text(run) => Cow::Owned(self.convert_run(run)),
            Token::Separator(sep) => Cow::Borrowed(sep),
        }
    }
}

fn load_leaf(
    name: &str,
    descriptor: &DictDescriptor,
    settings: &EngineConfig,
    cache: &mut DictionaryCache,
) -> Result<Arc<Dictionary>> {
    let (file, format): (&Path, DictFormat) = match descriptor {
        DictDescriptor::Txt { file } => (file.as_path(), DictFormat::Text),
        DictDescriptor::Zst { file } => (file.as_path(), DictFormat::Compressed),
        DictDescriptor::Group { .. } => {
            return Err(OpenccError::invalid_chain(name, "groups cannot be nested"));
        }
    };
    cache.load_with(settings.dict_path(file), format)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn write(dir: &Path, file: &str, content: &str) {
        fs::write(dir.join(file), content).unwrap();
    }

    #[test]
    fn build_mirrors_config_nesting_and_shares_cached_dictionaries() {
        let dir = tempdir().unwrap();
        write(dir.path(), "P.txt", "烟草\t菸草\n");
        write(dir.path(), "C.txt", "为\t爲\n");
        let json = r#"{"name": "demo", "conversion_chain": [
            {"dict": {"type": "group", "policy": "per_segment", "dicts": [
                {"type": "txt", "file": "P.txt"}, {"type": "txt", "file": "C.txt"}]}},
            {"dict": {"type": "txt", "file": "C.txt"}}
        ]}"#;
        let config = ConversionConfig::from_json("demo", json).unwrap();
        let settings = EngineConfig::new(dir.path(), dir.path());
        let mut cache = DictionaryCache::new();

        let chain = ConversionChain::build("demo", &config, &settings, &mut cache).unwrap();
        assert_eq!(chain.name(), "demo");
        assert_eq!(chain.display_name(), "demo");
        assert_eq!(chain.steps().len(), 2);
        assert_eq!(cache.len(), 2);

        let (ChainStep::Group(group), ChainStep::Single(single)) = (&chain.steps()[0], &chain.steps()[1]) else {
            panic!("unexpected step layout: {:?}", chain.steps());
        };
        assert_eq!(group.policy(), GroupPolicy::PerSegment);
        assert!(Arc::ptr_eq(&group.dicts()[1], single));

        assert_eq!(chain.convert("为烟草。", false), "爲菸草。");
    }

    #[test]
    fn nested_and_empty_groups_are_rejected() {
        let dir = tempdir().unwrap();
        write(dir.path(), "A.txt", "a\tb\n");
        let settings = EngineConfig::new(dir.path(), dir.path());
        let mut cache = DictionaryCache::new();

        let nested = r#"{"conversion_chain": [{"type": "group", "dicts": [
            {"type": "group", "dicts": [{"type": "txt", "file": "A.txt"}]}]}]}"#;
        let config = ConversionConfig::from_json("n", nested).unwrap();
        let err = ConversionChain::build("n", &config, &settings, &mut cache).unwrap_err();
        assert!(matches!(err, OpenccError::InvalidChain { .. }));

        let empty = r#"{"conversion_chain": [{"type": "group", "dicts": []}]}"#;
        let config = ConversionConfig::from_json("e", empty).unwrap();
        let err = ConversionChain::build("e", &config, &settings, &mut cache).unwrap_err();
        assert!(matches!(err, OpenccError::InvalidChain { .. }));
    }

    #[test]
    fn missing_dictionary_aborts_the_build() {
        let dir = tempdir().unwrap();
        let settings = EngineConfig::new(dir.path(), dir.path());
        let config =
            ConversionConfig::from_json("m", r#"{"conversion_chain": [{"type": "txt", "file": "Missing.txt"}]}"#)
                .unwrap();
        let mut cache = DictionaryCache::new();
        let err = ConversionChain::build("m", &config, &settings, &mut cache).unwrap_err();
        assert!(matches!(err, OpenccError::DictionaryNotFound { .. }));
    }

    #[test]
    fn parallel_and_sequential_output_match() {
        let d = Dictionary::from_text("鼠标\t滑鼠\n电脑\t電腦\n", "t").unwrap();
        let chain = ConversionChain::new("t", "t", vec![ChainStep::Single(Arc::new(d))]);
        let text = "鼠标，电脑。鼠标 电脑\n".repeat(200);
        let sequential = chain.convert(&text, false);
        assert_eq!(chain.convert(&text, true), sequential);
        assert!(sequential.starts_with("滑鼠，電腦。滑鼠 電腦\n"));
    }
}
