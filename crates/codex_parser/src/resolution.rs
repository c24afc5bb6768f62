//! Two-phase entity picking.
//!
//! Parsing never blocks on a user. It returns the option map together with
//! one [`PendingPick`] per ambiguous search; a caller collects the chosen
//! ids and folds them back with [`apply_picks`]. [`Resolution`] wraps the
//! protocol as a small state machine:
//!
//! ```text
//! Parsing ──parsed──▶ AwaitingPicks ──answer(Chosen)──▶ ... ──▶ Resolved
//!    │                     │
//!    └──(no picks)──▶ Resolved   └──answer(Timeout | Cancelled)──▶ Abandoned
//! ```

use std::sync::Arc;

use codex_foundation::{Error, Result};
use codex_pool::{Entity, SearchResult};
use tracing::debug;

use crate::parser::Parsed;
use crate::value::{OptionMap, OptionValue};

/// Most candidates shown to a user at once.
pub const DEFAULT_PICK_CAP: usize = 25;

/// Where an ambiguous search sits in an option map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickSlot {
    /// Option key holding the search
    pub key: String,
    /// Position inside a list value, if the key holds a list
    pub index: Option<usize>,
    /// Comparison key and entry index, for searches inside a comparison
    pub parent: Option<(String, usize)>,
}

impl PickSlot {
    /// A slot directly under `key`.
    #[must_use]
    pub fn top(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            index: None,
            parent: None,
        }
    }
}

/// An ambiguous search waiting for a user choice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingPick {
    /// Location of the search
    pub slot: PickSlot,
    /// The ambiguous search
    pub search: SearchResult,
}

/// Replaces every pending search with the entity chosen for it.
///
/// `ids` pairs with `picks` by position.
///
/// # Errors
///
/// Returns an error if the counts differ, an id is not one of its search's
/// candidates, or a slot no longer points at a search.
pub fn apply_picks(mut options: OptionMap, picks: &[PendingPick], ids: &[String]) -> Result<OptionMap> {
    if picks.len() != ids.len() {
        return Err(Error::internal(format!(
            "{} picks pending but {} ids supplied",
            picks.len(),
            ids.len()
        )));
    }

    for (pick, id) in picks.iter().zip(ids) {
        if pick.search.choose_id(id).is_none() {
            return Err(Error::malformed(pick.slot.key.clone(), format!("'{id}' is not a candidate")));
        }
        let slot = locate(&mut options, &pick.slot)
            .ok_or_else(|| Error::internal(format!("no pending search under '{}'", pick.slot.key)))?;
        *slot = OptionValue::Entity(id.clone());
    }
    Ok(options)
}

fn locate<'a>(options: &'a mut OptionMap, slot: &PickSlot) -> Option<&'a mut OptionValue> {
    let map = match &slot.parent {
        Some((key, index)) => match options.get_mut(key)? {
            OptionValue::List(entries) => match entries.get_mut(*index)? {
                OptionValue::Options(map) => map,
                _ => return None,
            },
            _ => return None,
        },
        None => options,
    };

    let value = map.get_mut(&slot.key)?;
    let value = match slot.index {
        Some(index) => match value {
            OptionValue::List(values) => values.get_mut(index)?,
            _ => return None,
        },
        None => value,
    };
    matches!(value, OptionValue::Search(_)).then_some(value)
}

/// What is shown to a user for one pick.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PickRequest {
    /// Option key being resolved
    pub key: String,
    /// Query that matched several entities
    pub text: String,
    /// Candidates shown, in pool order
    pub candidates: Vec<Arc<Entity>>,
    /// Candidates left out by the cap
    pub overflow: usize,
}

impl PickRequest {
    fn new(pick: &PendingPick, cap: usize) -> Self {
        let (shown, overflow) = pick.search.candidates(cap);
        Self {
            key: pick.slot.key.clone(),
            text: pick.search.text.clone(),
            candidates: shown.to_vec(),
            overflow,
        }
    }
}

/// A user's answer to a [`PickRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PickResponse {
    /// Id of the chosen entity
    Chosen(String),
    /// No answer in time
    Timeout,
    /// Explicit refusal, or an answer that is not a candidate
    Cancelled,
}

/// Anything that can put a pick in front of a user.
pub trait Disambiguator {
    /// Shows `request` and waits for an answer.
    fn pick(&mut self, request: &PickRequest) -> PickResponse;
}

/// Resolution state of one request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Resolution {
    /// Waiting for the parse
    #[default]
    Parsing,
    /// Some searches still need a pick
    AwaitingPicks {
        /// The parse being resolved
        parsed: Parsed,
        /// Ids chosen so far, in pick order
        chosen: Vec<String>,
    },
    /// Final option map
    Resolved(OptionMap),
    /// Dropped; nothing is executed
    Abandoned,
}

impl Resolution {
    /// Starts a resolution.
    #[must_use]
    pub fn new() -> Self {
        Self::Parsing
    }

    /// Feeds the parse result.
    ///
    /// # Errors
    ///
    /// Returns an internal error if the resolution is past parsing.
    pub fn parsed(self, parsed: Parsed) -> Result<Self> {
        match self {
            Self::Parsing if parsed.picks.is_empty() => Ok(Self::Resolved(parsed.options)),
            Self::Parsing => Ok(Self::AwaitingPicks {
                parsed,
                chosen: Vec::new(),
            }),
            _ => Err(Error::internal("parse fed to a resolution past parsing")),
        }
    }

    /// The next pick to show, if one is pending.
    #[must_use]
    pub fn next_pick(&self, cap: usize) -> Option<PickRequest> {
        match self {
            Self::AwaitingPicks { parsed, chosen } => parsed
                .picks
                .get(chosen.len())
                .map(|pick| PickRequest::new(pick, cap)),
            _ => None,
        }
    }

    /// Applies an answer to the current pick.
    ///
    /// An id that is not a candidate abandons the request like a timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if no pick is pending, or if folding the chosen ids
    /// back into the option map fails.
    pub fn answer(self, response: PickResponse) -> Result<Self> {
        let Self::AwaitingPicks { parsed, mut chosen } = self else {
            return Err(Error::internal("answer without a pending pick"));
        };
        let Some(pick) = parsed.picks.get(chosen.len()) else {
            return Err(Error::internal("answer without a pending pick"));
        };

        let id = match response {
            PickResponse::Chosen(id) if pick.search.choose_id(&id).is_some() => id,
            other => {
                debug!(key = %pick.slot.key, response = ?other, "pick abandoned");
                return Ok(Self::Abandoned);
            }
        };
        chosen.push(id);

        if chosen.len() < parsed.picks.len() {
            return Ok(Self::AwaitingPicks { parsed, chosen });
        }
        let options = apply_picks(parsed.options, &parsed.picks, &chosen)?;
        Ok(Self::Resolved(options))
    }

    /// Returns true once resolved or abandoned.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        matches!(self, Self::Resolved(_) | Self::Abandoned)
    }

    /// The final option map.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Abandoned`](codex_foundation::ErrorKind::Abandoned)
    /// for an abandoned request, or an internal error if resolution is not
    /// finished.
    pub fn into_options(self) -> Result<OptionMap> {
        match self {
            Self::Resolved(options) => Ok(options),
            Self::Abandoned => Err(Error::abandoned()),
            _ => Err(Error::internal("resolution not finished")),
        }
    }
}

/// Drives a parse to its final option map, asking `picker` for each pick.
///
/// # Errors
///
/// Returns [`ErrorKind::Abandoned`](codex_foundation::ErrorKind::Abandoned)
/// if any pick times out or is cancelled.
pub fn resolve(parsed: Parsed, picker: &mut dyn Disambiguator, cap: usize) -> Result<OptionMap> {
    let mut resolution = Resolution::new().parsed(parsed)?;
    while let Some(request) = resolution.next_pick(cap) {
        let response = picker.pick(&request);
        resolution = resolution.answer(response)?;
    }
    resolution.into_options()
}
