use crate::error::{Error, Result};
use axum::routing::MethodFilter;
use strum_macros::{Display, EnumString};

/// HTTP verb a route can be registered under
///
/// `All` is a sentinel that matches every verb.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
    All,
}

impl Verb {
    /// Every concrete verb the router can dispatch
    pub const ROUTABLE: [Verb; 7] = [
        Verb::Get,
        Verb::Post,
        Verb::Put,
        Verb::Patch,
        Verb::Delete,
        Verb::Head,
        Verb::Options,
    ];

    pub(crate) fn filter(self) -> Option<MethodFilter> {
        match self {
            Verb::Get => Some(MethodFilter::GET),
            Verb::Post => Some(MethodFilter::POST),
            Verb::Put => Some(MethodFilter::PUT),
            Verb::Patch => Some(MethodFilter::PATCH),
            Verb::Delete => Some(MethodFilter::DELETE),
            Verb::Head => Some(MethodFilter::HEAD),
            Verb::Options => Some(MethodFilter::OPTIONS),
            Verb::All => None,
        }
    }
}

/// Verbs a route answers to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Methods {
    /// Wildcard registration matching every verb
    All,
    /// Non-empty, duplicate-free list in declaration order
    Verbs(Vec<Verb>),
}

impl Methods {
    /// Normalize a declared verb list
    ///
    /// Any occurrence of [`Verb::All`] turns the whole list into the
    /// wildcard. An empty list is a configuration error.
    pub fn from_verbs(verbs: impl IntoIterator<Item = Verb>) -> Result<Self> {
        let mut list: Vec<Verb> = Vec::new();
        for verb in verbs {
            if verb == Verb::All {
                return Ok(Methods::All);
            }
            if !list.contains(&verb) {
                list.push(verb);
            }
        }
        if list.is_empty() {
            return Err(Error::configuration("a route needs at least one HTTP method"));
        }
        Ok(Methods::Verbs(list))
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Methods::All)
    }

    /// Concrete verbs matched by this set
    pub fn verbs(&self) -> Vec<Verb> {
        match self {
            Methods::All => Verb::ROUTABLE.to_vec(),
            Methods::Verbs(verbs) => verbs.clone(),
        }
    }
}
