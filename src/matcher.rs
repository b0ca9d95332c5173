//! Greedy longest-match substitution over a single text run.
//!
//! Applying one dictionary works on an explicit worklist of char intervals
//! instead of a tree of substrings. Each unmatched interval is searched for
//! the longest key, scanning lengths from long to short and, at each length,
//! offsets from left to right. A hit is recorded as a [`Replacement`]; the
//! text to its left and right goes back on the worklist as two independent
//! intervals. An interval with no hit is copied through literally.
//!
//! The result is the same as recursively splitting the run around each match
//! and reading the pieces back in order, without recursion depth or
//! per-node allocation.

use crate::chain::{ChainStep, DictGroup, GroupPolicy};
use crate::dictionary_lib::Dictionary;

/// Half-open char range `[start, end)` still to be searched.
///
/// `cap` bounds the candidate length: a remainder split off a match of length
/// `n` cannot contain a longer key, since the parent scan already tried every
/// offset at every length above `n`.
#[derive(Debug, Clone, Copy)]
struct Interval {
    start: usize,
    end: usize,
    cap: usize,
}

impl Interval {
    fn whole(len: usize) -> Self {
        Interval {
            start: 0,
            end: len,
            cap: usize::MAX,
        }
    }
}

/// A matched span `[start, end)` and the phrase that replaces it.
#[derive(Debug, Clone, Copy)]
struct Replacement<'d> {
    start: usize,
    end: usize,
    value: &'d str,
}

/// Finds the longest, then leftmost, key inside `iv`.
fn find_longest<'d>(text: &[char], iv: Interval, dict: &'d Dictionary) -> Option<Replacement<'d>> {
    if dict.is_empty() {
        return None;
    }
    let min_len = dict.min_len().max(1);
    let mut len = (iv.end - iv.start).min(dict.max_len()).min(iv.cap);

    while len >= min_len {
        for offset in iv.start..=(iv.end - len) {
            if dict.starter_cap(text[offset]) < len {
                continue;
            }
            if let Some(value) = dict.lookup(&text[offset..offset + len]) {
                return Some(Replacement {
                    start: offset,
                    end: offset + len,
                    value,
                });
            }
        }
        len -= 1;
    }
    None
}

/// Runs one dictionary over `pending` until every interval is either matched
/// or exhausted. Matches are appended to `matched`; intervals this dictionary
/// could not match are returned, with their caps cleared.
fn match_intervals<'d>(
    text: &[char],
    pending: Vec<Interval>,
    dict: &'d Dictionary,
    matched: &mut Vec<Replacement<'d>>,
) -> Vec<Interval> {
    let mut work = pending;
    let mut unmatched = Vec::new();

    while let Some(iv) = work.pop() {
        match find_longest(text, iv, dict) {
            Some(hit) => {
                let len = hit.end - hit.start;
                if hit.start > iv.start {
                    work.push(Interval {
                        start: iv.start,
                        end: hit.start,
                        cap: len,
                    });
                }
                if hit.end < iv.end {
                    work.push(Interval {
                        start: hit.end,
                        end: iv.end,
                        cap: len,
                    });
                }
                matched.push(hit);
            }
            None => unmatched.push(Interval {
                cap: usize::MAX,
                ..iv
            }),
        }
    }

    unmatched
}

/// Reassembles the run: replacements in order, literal text in the gaps.
fn render(text: &[char], matched: &mut [Replacement<'_>]) -> String {
    matched.sort_unstable_by_key(|r| r.start);

    let mut out = String::with_capacity(text.len() * 3);
    let mut pos = 0;
    for r in matched.iter() {
        out.extend(&text[pos..r.start]);
        out.push_str(r.value);
        pos = r.end;
    }
    out.extend(&text[pos..]);
    out
}

/// Applies a single dictionary to `run`.
///
/// Returns `None` when nothing in the run matched, so callers can tell "no
/// match" apart from "matched and produced identical text".
pub fn apply_dictionary(run: &str, dict: &Dictionary) -> Option<String> {
    let text: Vec<char> = run.chars().collect();
    if text.is_empty() {
        return None;
    }
    let mut matched = Vec::new();
    match_intervals(&text, vec![Interval::whole(text.len())], dict, &mut matched);
    if matched.is_empty() {
        None
    } else {
        Some(render(&text, &mut matched))
    }
}

fn apply_group(run: &str, group: &DictGroup) -> String {
    match group.policy() {
        GroupPolicy::FirstMatch => group
            .dicts()
            .iter()
            .find_map(|dict| apply_dictionary(run, dict))
            .unwrap_or_else(|| run.to_owned()),
        GroupPolicy::PerSegment => {
            let text: Vec<char> = run.chars().collect();
            if text.is_empty() {
                return String::new();
            }
            let mut matched = Vec::new();
            let mut pending = vec![Interval::whole(text.len())];
            for dict in group.dicts() {
                pending = match_intervals(&text, pending, dict, &mut matched);
                if pending.is_empty() {
                    break;
                }
            }
            render(&text, &mut matched)
        }
    }
}

/// Applies one chain step to `run`.
pub fn apply_step(run: &str, step: &ChainStep) -> String {
    match step {
        ChainStep::Single(dict) => apply_dictionary(run, dict).unwrap_or_else(|| run.to_owned()),
        ChainStep::Group(group) => apply_group(run, group),
    }
}

/// Applies every step in order; each step sees the previous step's output.
pub fn apply_chain(run: &str, steps: &[ChainStep]) -> String {
    let mut current = run.to_owned();
    for step in steps {
        current = apply_step(&current, step);
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn dict(pairs: &[(&str, &str)]) -> Arc<Dictionary> {
        Arc::new(Dictionary::build_from_pairs(
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())),
        ))
    }

    fn single(pairs: &[(&str, &str)]) -> ChainStep {
        ChainStep::Single(dict(pairs))
    }

    fn group(policy: GroupPolicy, members: &[&[(&str, &str)]]) -> ChainStep {
        ChainStep::Group(DictGroup::new(
            members.iter().map(|p| dict(p)).collect(),
            policy,
        ))
    }

    #[test]
    fn longer_key_beats_shorter_at_same_offset() {
        let step = single(&[("AB", "X"), ("A", "Y")]);
        assert_eq!(apply_step("AB", &step), "X");
        assert_eq!(apply_step("ABB", &step), "XB");
    }

    #[test]
    fn leftmost_wins_among_equal_lengths() {
        let step = single(&[("AB", "1"), ("BC", "2")]);
        assert_eq!(apply_step("ABC", &step), "1C");
    }

    #[test]
    fn longest_anywhere_beats_earlier_shorter() {
        // Length is searched before offset: "BCD" wins although "A" starts earlier.
        let step = single(&[("A", "a"), ("BCD", "x")]);
        assert_eq!(apply_step("ABCD", &step), "ax");
    }

    #[test]
    fn remainders_are_searched_independently() {
        let step = single(&[("电脑", "電腦"), ("鼠标", "滑鼠"), ("设", "設")]);
        assert_eq!(
            apply_step("鼠标是电脑输入设备", &step),
            "滑鼠是電腦输入設备"
        );
    }

    #[test]
    fn output_of_a_match_is_not_rematched_by_the_same_dictionary() {
        // "A" -> "B" must not be followed by "B" -> "C" within one step.
        let step = single(&[("A", "B"), ("B", "C")]);
        assert_eq!(apply_step("AB", &step), "BC");
    }

    #[test]
    fn later_steps_see_earlier_output() {
        let steps = [single(&[("A", "B")]), single(&[("B", "C")])];
        assert_eq!(apply_chain("AB", &steps), "CC");
    }

    #[test]
    fn first_alternative_is_used() {
        let step = single(&[("儘", "尽 侭")]);
        assert_eq!(apply_step("儘", &step), "尽");
    }

    #[test]
    fn no_match_returns_input_unchanged() {
        let step = single(&[("鼠标", "滑鼠")]);
        assert_eq!(apply_step("Cigarette", &step), "Cigarette");
        assert_eq!(apply_dictionary("Cigarette", &dict(&[("鼠标", "滑鼠")])), None);
    }

    #[test]
    fn empty_run_stays_empty() {
        let steps = [
            single(&[("A", "B")]),
            group(GroupPolicy::PerSegment, &[&[("A", "B")]]),
            group(GroupPolicy::FirstMatch, &[&[("A", "B")]]),
        ];
        assert_eq!(apply_chain("", &steps), "");
    }

    #[test]
    fn min_len_bound_is_enforced() {
        // Shortest key is two chars: a one-char run never matches.
        let d = dict(&[("AB", "x"), ("ABC", "y")]);
        assert_eq!(d.min_len(), 2);
        assert_eq!(apply_dictionary("A", &d), None);
        assert_eq!(apply_dictionary("ZABQ", &d).as_deref(), Some("ZxQ"));
    }

    #[test]
    fn astral_characters_match_as_single_chars() {
        let step = single(&[("𠁞", "𠀾"), ("種", "种")]);
        assert_eq!(apply_step("𠁞種", &step), "𠀾种");
    }

    #[test]
    fn first_match_group_uses_only_the_first_dictionary_that_matches() {
        let step = group(GroupPolicy::FirstMatch, &[&[("X", "p")], &[("X", "q")]]);
        assert_eq!(apply_step("X", &step), "p");

        // dictA matched something, so dictB is skipped for the whole run,
        // even for "Y" which only dictB knows.
        let step = group(
            GroupPolicy::FirstMatch,
            &[&[("X", "p")], &[("X", "q"), ("Y", "r")]],
        );
        assert_eq!(apply_step("XY", &step), "pY");

        // dictA matches nothing, so dictB applies.
        assert_eq!(apply_step("Y", &step), "r");
    }

    #[test]
    fn per_segment_group_hands_leftovers_to_the_next_dictionary() {
        let step = group(
            GroupPolicy::PerSegment,
            &[
                &[("烟草", "菸草"), ("制品", "製品")],
                &[("为", "爲"), ("种", "種"), ("烟", "煙"), ("草", "X")],
            ],
        );
        // "草" inside the phrase match is never offered to the character table.
        assert_eq!(apply_step("为烟草制品的一种", &step), "爲菸草製品的一種");
    }

    /// Recursive longest-then-leftmost split with no length cap and no
    /// starter pruning. Spans that member `i` cannot match fall through to
    /// member `i + 1`.
    fn unpruned(text: &[char], dicts: &[Arc<Dictionary>], i: usize) -> String {
        let Some(dict) = dicts.get(i) else {
            return text.iter().collect();
        };
        for len in (1..=text.len()).rev() {
            for start in 0..=(text.len() - len) {
                if let Some(value) = dict.lookup(&text[start..start + len]) {
                    let mut out = unpruned(&text[..start], dicts, i);
                    out.push_str(value);
                    out.push_str(&unpruned(&text[start + len..], dicts, i));
                    return out;
                }
            }
        }
        unpruned(text, dicts, i + 1)
    }

    fn xorshift64(state: &mut u64) -> u64 {
        let mut x = *state;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        *state = x;
        x
    }

    #[test]
    fn pruned_scan_matches_unpruned_recursion() {
        const ALPHABET: [char; 5] = ['a', 'b', 'c', 'd', '𠁞'];
        let mut rng = 0x9E37_79B9_7F4A_7C15u64;
        let mut pick = |n: usize| (xorshift64(&mut rng) % n as u64) as usize;

        for round in 0..5_000 {
            let dicts: Vec<Arc<Dictionary>> = (0..1 + pick(3))
                .map(|d| {
                    let pairs: Vec<(String, String)> = (0..1 + pick(5))
                        .map(|k| {
                            let key: String = (0..1 + pick(3)).map(|_| ALPHABET[pick(5)]).collect();
                            let value = if pick(4) == 0 {
                                format!("X{d}{k} Y{d}{k}")
                            } else {
                                format!("X{d}{k}")
                            };
                            (key, value)
                        })
                        .collect();
                    Arc::new(Dictionary::build_from_pairs(pairs))
                })
                .collect();
            let text: Vec<char> = (0..pick(9)).map(|_| ALPHABET[pick(5)]).collect();
            let run: String = text.iter().collect();

            let expected = unpruned(&text, &dicts, 0);
            let step = ChainStep::Group(DictGroup::new(dicts.clone(), GroupPolicy::PerSegment));
            assert_eq!(apply_step(&run, &step), expected, "round {round}, run {run:?}");

            let first = ChainStep::Single(Arc::clone(&dicts[0]));
            assert_eq!(
                apply_step(&run, &first),
                unpruned(&text, &dicts[..1], 0),
                "round {round}, run {run:?}"
            );
        }
    }

    #[test]
    fn adversarial_all_single_char_matches() {
        let step = single(&[("a", "b")]);
        let run = "a".repeat(10_000);
        assert_eq!(apply_step(&run, &step), "b".repeat(10_000));
    }
}
