//! The two entry paths of a command.
//!
//! Free text goes through the primary pool's phrase search first; whatever
//! the entity phrase does not consume is tokenized and offered to each
//! check in order. Structured input skips the tokenizer and hands each
//! value to the check bound to its key. Both paths end in the same
//! finalize step, which collapses unambiguous searches into entity ids and
//! records a [`PendingPick`] for each ambiguous one.

use std::collections::BTreeMap;

use codex_foundation::{Error, ErrorContext, Result, is_level_run, split_list, tokenize};
use codex_pool::{SearchContext, SearchResult};
use tracing::{debug, trace, warn};

use crate::check::{Check, CheckKind};
use crate::command::{Command, LEVEL_KEY, NAME_KEY};
use crate::params::ParameterValue;
use crate::resolution::{PendingPick, PickSlot};
use crate::value::{InputValue, OptionMap, OptionUpdate, OptionValue, apply_updates};

/// Bare words that may introduce a level run.
const LEVEL_WORDS: &[&str] = &["lvl", "lv", "level"];

/// Output of the parse phase.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Parsed {
    /// Option map; ambiguous searches are still [`OptionValue::Search`]
    pub options: OptionMap,
    /// Words no check claimed
    pub unmatched: Vec<String>,
    /// Searches that need a user pick, in map order
    pub picks: Vec<PendingPick>,
}

impl Parsed {
    /// Returns true if a user has to pick before the options are final.
    #[must_use]
    pub fn needs_picks(&self) -> bool {
        !self.picks.is_empty()
    }
}

/// Free text split on the exclamation and comparison markers.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct Segments<'t> {
    pub(crate) exclaimed: Option<&'t str>,
    pub(crate) primary: &'t str,
    pub(crate) compared: Vec<&'t str>,
}

/// Splits at the first `marker`, unless it is missing or leads the text.
pub(crate) fn split_at_marker(text: &str, marker: char) -> Option<(&str, &str)> {
    match text.find(marker) {
        Some(at) if at > 0 => Some((&text[..at], &text[at + marker.len_utf8()..])),
        _ => None,
    }
}

impl Command {
    /// Splits on commas first, then takes the exclamation head off the
    /// primary segment. Compared segments keep their own `!`.
    pub(crate) fn segments<'t>(&self, text: &'t str) -> Segments<'t> {
        let text = text.trim();
        let (head, compared) = match self.comma.as_ref().filter(|_| split_at_marker(text, ',').is_some()) {
            Some(comma) => {
                let mut pieces = text.split(',').map(str::trim);
                let head = pieces.next().unwrap_or_default();
                let compared = pieces.filter(|piece| !piece.is_empty()).take(comma.size - 1).collect();
                (head, compared)
            }
            None => (text, Vec::new()),
        };
        let (exclaimed, primary) = self.exclaimed(head);
        Segments {
            exclaimed,
            primary,
            compared,
        }
    }

    /// Splits `segment` at its first `!` when the command takes one.
    fn exclaimed<'t>(&self, segment: &'t str) -> (Option<&'t str>, &'t str) {
        match self.exclamation.as_ref().and_then(|_| split_at_marker(segment, '!')) {
            Some((head, rest)) => (Some(head.trim()), rest.trim()),
            None => (None, segment),
        }
    }

    /// Stores an exclamation head under the command's exclamation key.
    fn apply_exclaimed(&self, options: &mut OptionMap, head: Option<&str>, ctx: &SearchContext) {
        let (Some(key), Some(head)) = (&self.exclamation, head) else {
            return;
        };
        let updates = match self.check(key) {
            Some(check) => check.extract_from_tokens(&ParameterValue::new(key, "", head), ctx),
            None => vec![OptionUpdate::Set(key.clone(), OptionValue::Text(head.to_string()))],
        };
        apply_updates(options, updates);
    }

    /// Parses one free-text query.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::NotFound`](codex_foundation::ErrorKind::NotFound)
    /// if no primary entity or a named nested entity matches nothing.
    pub fn parse_free_text(&self, text: &str, ctx: &SearchContext) -> Result<Parsed> {
        self.parse_text(text, ctx, None)
    }

    /// Parses free text with the primary entity already chosen.
    pub(crate) fn parse_text(&self, text: &str, ctx: &SearchContext, chosen: Option<SearchResult>) -> Result<Parsed> {
        let segments = self.segments(text);
        let (mut options, mut unmatched) = self.parse_segment(segments.primary, ctx, chosen);
        if !options.contains_key(NAME_KEY) {
            return Err(Error::not_found(NAME_KEY, segments.primary));
        }

        self.apply_exclaimed(&mut options, segments.exclaimed, ctx);

        if let Some(comma) = &self.comma {
            let mut entries = Vec::new();
            for segment in segments.compared {
                let (head, body) = self.exclaimed(segment);
                let (mut entry, rest) = self.parse_segment(body, ctx, None);
                if entry.contains_key(NAME_KEY) {
                    self.apply_exclaimed(&mut entry, head, ctx);
                    entries.push(OptionValue::Options(entry));
                    unmatched.extend(rest);
                } else {
                    debug!(command = %self.name, segment, "comparison segment matched nothing");
                    unmatched.extend(tokenize(segment));
                }
            }
            if !entries.is_empty() {
                options.insert(comma.name.clone(), OptionValue::List(entries));
            }
        }

        let picks = finalize(&mut options, None)?;
        debug!(
            command = %self.name,
            options = options.len(),
            picks = picks.len(),
            unmatched = unmatched.len(),
            "free text parsed"
        );
        Ok(Parsed {
            options,
            unmatched,
            picks,
        })
    }

    /// Primary entity phrase plus parameters of one segment.
    fn parse_segment(&self, text: &str, ctx: &SearchContext, chosen: Option<SearchResult>) -> (OptionMap, Vec<String>) {
        let words = tokenize(text);
        let list = self.primary.search_list(&words, Some(ctx));
        let (search, rest) = match list.search {
            Some(search) => (Some(search), list.invalid_word),
            None => (None, words),
        };

        let mut options = OptionMap::new();
        if let Some(search) = chosen.or(search) {
            options.insert(NAME_KEY.to_string(), OptionValue::Search(search));
        }
        let unmatched = self.parse_parameters(&rest, &mut options, ctx);
        (options, unmatched)
    }

    /// Offers leftover words to the checks, then to the level run and the
    /// attach pools. Returns what nobody claimed.
    fn parse_parameters(&self, words: &[String], options: &mut OptionMap, ctx: &SearchContext) -> Vec<String> {
        let tokenized = self.tokenizer.tokenize(words);
        let mut unmatched = Vec::new();

        for parameter in tokenized.values {
            let raw = format!("{}{}", parameter.start, parameter.key);
            let key = self.canonical_key(&parameter.key).to_string();
            let parameter = ParameterValue { key, ..parameter };

            match self.checks.iter().find(|check| check.matches_parameter(&parameter, &*options)) {
                Some(check) => {
                    trace!(key = %check.key(), token = %raw, "parameter matched");
                    let updates = self.accumulate(check.extract_from_tokens(&parameter, ctx));
                    apply_updates(options, updates);
                }
                None => {
                    unmatched.push(raw);
                    unmatched.extend(tokenize(&parameter.value));
                }
            }
        }

        let mut rest = tokenized.unmatched;
        self.take_level(&mut rest, options);
        unmatched.extend(self.take_attached(rest, options, ctx));
        unmatched
    }

    /// Turns `Set` into `Push` for keys collecting several values.
    fn accumulate(&self, updates: Vec<OptionUpdate>) -> Vec<OptionUpdate> {
        updates
            .into_iter()
            .map(|update| match update {
                OptionUpdate::Set(key, value) if self.is_multiple(&key) => OptionUpdate::Push(key, value),
                other => other,
            })
            .collect()
    }

    /// Consumes the first bare run of levels, with an optional `lvl` word
    /// in front of it.
    fn take_level(&self, words: &mut Vec<String>, options: &mut OptionMap) {
        let Some(CheckKind::Level(level)) = self.check(LEVEL_KEY).map(Check::kind) else {
            return;
        };
        let Some(start) = words.iter().position(|word| is_level_run(word)) else {
            return;
        };
        let end = start + words[start..].iter().take_while(|word| is_level_run(word)).count();
        let levels = level.parse(&words[start..end].join(" "));
        if levels.is_empty() {
            return;
        }

        let from = match start.checked_sub(1) {
            Some(before) if LEVEL_WORDS.contains(&words[before].to_lowercase().as_str()) => before,
            _ => start,
        };
        words.drain(from..end);
        trace!(levels = ?levels, "bare level run");
        let levels = levels.into_iter().map(OptionValue::Int).collect();
        apply_updates(options, [OptionUpdate::Set(LEVEL_KEY.to_string(), OptionValue::List(levels))]);
    }

    /// Repeatedly matches leftover words against the attach pools.
    fn take_attached(&self, words: Vec<String>, options: &mut OptionMap, ctx: &SearchContext) -> Vec<String> {
        let Some(attach) = &self.attach else {
            return words;
        };

        let mut unmatched = Vec::new();
        let mut rest = words;
        while !rest.is_empty() {
            let list = attach.pool.search_list(&rest, Some(ctx));
            let target = list.search.as_ref().and_then(|search| {
                let section = &search.first()?.section;
                let key = attach.keys.get(section)?;
                Some((key.clone(), section.clone()))
            });
            let (Some(search), Some((key, section))) = (list.search, target) else {
                unmatched.push(rest.remove(0));
                continue;
            };

            let finds = search
                .finds
                .iter()
                .filter(|entity| entity.section == section)
                .cloned()
                .collect();
            let value = OptionValue::Search(SearchResult::new(finds, section, search.text));
            trace!(key = %key, phrase = %list.text, "attached");
            let update = if self.is_multiple(&key) {
                OptionUpdate::Push(key, value)
            } else {
                OptionUpdate::SetIfAbsent(key, value)
            };
            apply_updates(options, [update]);
            rest = list.invalid_word;
        }
        unmatched
    }

    /// Parses already-keyed input.
    ///
    /// Unknown keys pass through unchanged. A value a check cannot coerce
    /// is dropped with a warning, unless `strict` is set.
    ///
    /// # Errors
    ///
    /// Returns a malformed-parameter error for a missing required key or,
    /// in strict mode, for the first value that cannot be coerced. Returns
    /// a not-found error for an entity reference that matches nothing.
    pub fn parse_structured(
        &self,
        input: BTreeMap<String, InputValue>,
        ctx: &SearchContext,
        strict: bool,
    ) -> Result<Parsed> {
        let mut options = OptionMap::new();

        for (raw, value) in input {
            let lowered = raw.to_lowercase();
            let key = self.canonical_key(&lowered).to_string();
            let value = match value {
                InputValue::Text(text) if self.is_multiple(&key) && text.contains(',') => {
                    InputValue::List(split_list(&text, ',').into_iter().map(InputValue::Text).collect())
                }
                other => other,
            };

            if let Some(comma) = self.comma.as_ref().filter(|comma| comma.name == key) {
                let entries = self.structured_comparison(&value, comma.size - 1, ctx);
                if !entries.is_empty() {
                    options.insert(key, OptionValue::List(entries));
                }
                continue;
            }

            let Some(check) = self.check(&key) else {
                trace!(key = %key, "unchecked option passed through");
                options.insert(key, value.into_option());
                continue;
            };

            let shown = value.to_text().unwrap_or_default();
            match check.extract_from_structured(value, ctx) {
                Ok(updates) => apply_updates(&mut options, updates),
                Err(err) if strict => {
                    let context = ErrorContext::new()
                        .with_command(self.name.as_str())
                        .with_scope(self.scope.as_str())
                        .with_option(key.as_str(), shown);
                    return Err(err.with_context(context));
                }
                Err(err) => warn!(command = %self.name, key = %key, error = %err, "malformed option dropped"),
            }
        }

        let required = std::iter::once(NAME_KEY).chain(self.required.iter().map(String::as_str));
        for key in required {
            if !options.contains_key(key) {
                return Err(Error::malformed(key, "required option missing"));
            }
        }

        let picks = finalize(&mut options, None)?;
        debug!(command = %self.name, options = options.len(), picks = picks.len(), "structured input parsed");
        Ok(Parsed {
            options,
            unmatched: Vec::new(),
            picks,
        })
    }

    fn structured_comparison(&self, value: &InputValue, limit: usize, ctx: &SearchContext) -> Vec<OptionValue> {
        let names = match value {
            InputValue::List(values) => values.iter().filter_map(InputValue::to_text).collect(),
            other => other
                .to_text()
                .map(|text| split_list(&text, ','))
                .unwrap_or_default(),
        };
        names
            .iter()
            .take(limit)
            .map(|name| {
                let search = self.primary.search(name, Some(ctx));
                OptionValue::Options(OptionMap::from([(NAME_KEY.to_string(), OptionValue::Search(search))]))
            })
            .collect()
    }
}

/// Collapses searches, records picks, and drops empty collections.
fn finalize(options: &mut OptionMap, parent: Option<(&str, usize)>) -> Result<Vec<PendingPick>> {
    let mut picks = Vec::new();
    let keys: Vec<String> = options.keys().cloned().collect();

    for key in keys {
        let Some(value) = options.remove(&key) else {
            continue;
        };
        let value = match value {
            OptionValue::Search(search) => collapse(&key, None, search, parent, &mut picks)?,
            OptionValue::List(values) => {
                let mut out = Vec::with_capacity(values.len());
                for (index, value) in values.into_iter().enumerate() {
                    out.push(match value {
                        OptionValue::Search(search) => collapse(&key, Some(index), search, parent, &mut picks)?,
                        OptionValue::Options(mut entry) => {
                            picks.extend(finalize(&mut entry, Some((key.as_str(), index)))?);
                            OptionValue::Options(entry)
                        }
                        other => other,
                    });
                }
                OptionValue::List(out)
            }
            other => other,
        };
        if !value.is_empty_collection() {
            options.insert(key, value);
        }
    }
    Ok(picks)
}

fn collapse(
    key: &str,
    index: Option<usize>,
    search: SearchResult,
    parent: Option<(&str, usize)>,
    picks: &mut Vec<PendingPick>,
) -> Result<OptionValue> {
    if search.is_empty() {
        return Err(Error::not_found(key, search.text));
    }
    if !search.is_multiple() {
        return Ok(OptionValue::from_search(search));
    }
    picks.push(PendingPick {
        slot: PickSlot {
            key: key.to_string(),
            index,
            parent: parent.map(|(key, index)| (key.to_string(), index)),
        },
        search: search.clone(),
    });
    Ok(OptionValue::Search(search))
}
