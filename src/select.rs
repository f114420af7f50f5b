//! Selection strategies
//!
//! A title or person search can return many candidates. When the client is
//! configured with a selection strategy, the candidates are handed to a
//! [`Selector`] which picks exactly one of them, or aborts.

use crate::record::{Movie, Person};
use crate::{Result, TmdbError};
use std::fmt;

/// Display summary of a search result offered to a selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// TMDB id of the movie or person
    pub id: Option<String>,
    /// Movie title or person name
    pub title: String,
    /// Disambiguating detail such as the release year
    pub detail: Option<String>,
}

impl Candidate {
    /// One-line label used by interactive prompts
    pub fn label(&self) -> String {
        match &self.detail {
            Some(detail) => format!("{} ({})", self.title, detail),
            None => self.title.clone(),
        }
    }
}

impl From<&Movie> for Candidate {
    fn from(movie: &Movie) -> Self {
        Self {
            id: movie.id.clone(),
            title: movie.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            detail: movie
                .released
                .as_deref()
                .map(|released| released.chars().take(4).collect()),
        }
    }
}

impl From<&Person> for Candidate {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id.clone(),
            title: person.name.clone().unwrap_or_else(|| "Unknown".to_string()),
            detail: person.birthday.clone(),
        }
    }
}

/// Trait for strategies that pick one candidate out of a search result.
pub trait Selector {
    /// Picks one candidate and returns its index
    ///
    /// # Errors
    ///
    /// Returns `TmdbError::UiAbort` when no candidate was chosen.
    fn select(&self, candidates: &[Candidate]) -> Result<usize>;
}

/// Always selects the first (most likely) candidate.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstSelector;

impl Selector for FirstSelector {
    fn select(&self, candidates: &[Candidate]) -> Result<usize> {
        if candidates.is_empty() {
            return Err(TmdbError::UiAbort("No candidates to select from".to_string()));
        }
        Ok(0)
    }
}

/// Lets the user pick a candidate from a console menu.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleSelector;

impl Selector for ConsoleSelector {
    fn select(&self, candidates: &[Candidate]) -> Result<usize> {
        let labels: Vec<String> = candidates.iter().map(Candidate::label).collect();

        dialoguer::Select::new()
            .with_prompt("Select the matching entry (Esc to abort)")
            .items(&labels)
            .default(0)
            .interact_opt()
            .map_err(|e| TmdbError::UiAbort(e.to_string()))?
            .ok_or_else(|| TmdbError::UiAbort("Selection aborted by user".to_string()))
    }
}

/// Delegates selection to a caller supplied closure.
pub struct CallbackSelector<F>
where
    F: Fn(&[Candidate]) -> Result<usize>,
{
    callback: F,
}

impl<F> CallbackSelector<F>
where
    F: Fn(&[Candidate]) -> Result<usize>,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> Selector for CallbackSelector<F>
where
    F: Fn(&[Candidate]) -> Result<usize>,
{
    fn select(&self, candidates: &[Candidate]) -> Result<usize> {
        (self.callback)(candidates)
    }
}

impl<F> fmt::Debug for CallbackSelector<F>
where
    F: Fn(&[Candidate]) -> Result<usize>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("CallbackSelector")
    }
}

/// How multi-result searches are narrowed down to one result
#[derive(Default)]
pub enum Selection {
    /// Return every result unfiltered
    #[default]
    None,
    /// Automatically take the first result
    First,
    /// Prompt on the console
    Interactive,
    /// Use a custom strategy
    Custom(Box<dyn Selector>),
}

impl Selection {
    /// Wraps a closure as a custom selection strategy
    pub fn custom<F>(callback: F) -> Self
    where
        F: Fn(&[Candidate]) -> Result<usize> + 'static,
    {
        Selection::Custom(Box::new(CallbackSelector::new(callback)))
    }

    /// The selector to use, or `None` when results are returned unfiltered
    pub(crate) fn selector(&self) -> Option<&dyn Selector> {
        match self {
            Selection::None => None,
            Selection::First => Some(&FirstSelector),
            Selection::Interactive => Some(&ConsoleSelector),
            Selection::Custom(selector) => Some(selector.as_ref()),
        }
    }
}

impl fmt::Debug for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::None => f.write_str("None"),
            Selection::First => f.write_str("First"),
            Selection::Interactive => f.write_str("Interactive"),
            Selection::Custom(_) => f.write_str("Custom"),
        }
    }
}

/// Runs `selector` over `records` and returns the chosen record.
///
/// A selector answering with an index outside the candidate list is misuse
/// and reported as `TmdbError::Base`.
pub(crate) fn choose<T>(selector: &dyn Selector, mut records: Vec<T>) -> Result<T>
where
    for<'a> &'a T: Into<Candidate>,
{
    let candidates: Vec<Candidate> = records.iter().map(Into::into).collect();
    let index = selector.select(&candidates)?;

    if index >= records.len() {
        return Err(TmdbError::Base(format!(
            "Selector returned index {} for {} candidates",
            index,
            records.len()
        )));
    }

    Ok(records.swap_remove(index))
}
