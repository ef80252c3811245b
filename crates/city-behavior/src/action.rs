//! The closed action set and the oracle's reply type.
//!
//! The oracle answers with an [`OracleReply`]: one variant per allowed action
//! plus a single `Unrecognized` catch-all for anything the kernel cannot map.
//! The engine turns a reply into an [`Action`] only after validating it
//! against the decision context (see `BehaviorEngine::validate_reply`).

use std::fmt;

use city_core::{CitizenId, Position};

// ── ActionKind ────────────────────────────────────────────────────────────────

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ActionKind {
    Move,
    Converse,
    Work,
    Rest,
    Socialize,
    Idle,
}

impl ActionKind {
    pub const ALL: [ActionKind; 6] = [
        ActionKind::Move,
        ActionKind::Converse,
        ActionKind::Work,
        ActionKind::Rest,
        ActionKind::Socialize,
        ActionKind::Idle,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ActionKind::Move      => "move",
            ActionKind::Converse  => "converse",
            ActionKind::Work      => "work",
            ActionKind::Rest      => "rest",
            ActionKind::Socialize => "socialize",
            ActionKind::Idle      => "idle",
        }
    }

    /// Case-insensitive parse of the labels produced by [`ActionKind::as_str`].
    pub fn parse(s: &str) -> Option<ActionKind> {
        let s = s.trim();
        ActionKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
    }

    /// Position in [`ActionKind::ALL`]; used for per-kind counters.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── OracleReply ───────────────────────────────────────────────────────────────

/// What the decision oracle asked for.
///
/// Durations are in ticks.  Nothing here is trusted until validated.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum OracleReply {
    Move { target: Position, duration: u32 },
    Converse { with: CitizenId, sentiment: f32, duration: u32, topic: Option<String> },
    Work { duration: u32 },
    Rest { duration: u32 },
    /// Mingle with every co-located citizen in the neighbor snapshot.
    Socialize { sentiment: f32, duration: u32 },
    Idle { duration: u32 },
    /// Anything outside the closed action set, kept verbatim for logging.
    Unrecognized { raw: String },
}

impl OracleReply {
    /// The action kind, or `None` for `Unrecognized`.
    pub fn kind(&self) -> Option<ActionKind> {
        Some(match self {
            OracleReply::Move { .. }         => ActionKind::Move,
            OracleReply::Converse { .. }     => ActionKind::Converse,
            OracleReply::Work { .. }         => ActionKind::Work,
            OracleReply::Rest { .. }         => ActionKind::Rest,
            OracleReply::Socialize { .. }    => ActionKind::Socialize,
            OracleReply::Idle { .. }         => ActionKind::Idle,
            OracleReply::Unrecognized { .. } => return None,
        })
    }

    pub fn duration(&self) -> Option<u32> {
        match *self {
            OracleReply::Move { duration, .. }
            | OracleReply::Converse { duration, .. }
            | OracleReply::Work { duration }
            | OracleReply::Rest { duration }
            | OracleReply::Socialize { duration, .. }
            | OracleReply::Idle { duration } => Some(duration),
            OracleReply::Unrecognized { .. } => None,
        }
    }
}

// ── Action ────────────────────────────────────────────────────────────────────

/// A validated action, stored in `BehaviorState::Acting`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Action {
    Move { target: Position },
    Converse { with: CitizenId, sentiment: f32, topic: Option<String> },
    Work,
    Rest,
    Socialize { with: Vec<CitizenId>, sentiment: f32 },
    Idle,
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Move { .. }      => ActionKind::Move,
            Action::Converse { .. }  => ActionKind::Converse,
            Action::Work             => ActionKind::Work,
            Action::Rest             => ActionKind::Rest,
            Action::Socialize { .. } => ActionKind::Socialize,
            Action::Idle             => ActionKind::Idle,
        }
    }
}

// ── RawDecision ───────────────────────────────────────────────────────────────

/// Loosely typed wire form of a decision, as a remote oracle would send it.
///
/// ```json
/// { "kind": "converse", "with": 4, "sentiment": 0.6, "duration": 2 }
/// ```
///
/// Only `kind` is required by the format; which other fields matter depends
/// on the kind.  [`RawDecision::into_reply`] never fails: anything it cannot
/// map becomes `OracleReply::Unrecognized`.
#[cfg(feature = "serde")]
#[derive(Clone, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RawDecision {
    pub kind:      String,
    pub target:    Option<Position>,
    pub with:      Option<u32>,
    pub sentiment: Option<f32>,
    pub duration:  Option<u32>,
    pub topic:     Option<String>,
}

#[cfg(feature = "serde")]
impl RawDecision {
    /// Duration assumed when the wire form omits one.
    pub const DEFAULT_DURATION: u32 = 1;

    /// Map onto the closed action set.
    pub fn into_reply(self) -> OracleReply {
        let duration = self.duration.unwrap_or(Self::DEFAULT_DURATION);
        let sentiment = self.sentiment.unwrap_or(0.0);
        match (ActionKind::parse(&self.kind), self.target, self.with) {
            (Some(ActionKind::Move), Some(target), _) => OracleReply::Move { target, duration },
            (Some(ActionKind::Converse), _, Some(with)) => OracleReply::Converse {
                with: CitizenId(with),
                sentiment,
                duration,
                topic: self.topic,
            },
            (Some(ActionKind::Work), ..)      => OracleReply::Work { duration },
            (Some(ActionKind::Rest), ..)      => OracleReply::Rest { duration },
            (Some(ActionKind::Socialize), ..) => OracleReply::Socialize { sentiment, duration },
            (Some(ActionKind::Idle), ..)      => OracleReply::Idle { duration },
            _ => OracleReply::Unrecognized {
                raw: serde_json::to_string(&self).unwrap_or_else(|_| self.kind.clone()),
            },
        }
    }

    /// Parse a JSON reply.  Text that is not a decision object comes back as
    /// `Unrecognized` carrying the original text.
    pub fn parse_reply(text: &str) -> OracleReply {
        match serde_json::from_str::<RawDecision>(text) {
            Ok(raw) => raw.into_reply(),
            Err(_) => OracleReply::Unrecognized { raw: text.to_string() },
        }
    }
}
