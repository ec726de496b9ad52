//! PhoneDirectory: people routed by first name, then last name, then
//! stored in a number-ordered tree.
//!
//! ```text
//! FixedHashTable            first name
//!   └─ FixedHashTable       last name
//!        └─ BalancedTree    number -> Person
//! ```
//!
//! People sharing both names coexist as long as their numbers differ; a
//! second person with an already-stored number under the same names is
//! rejected.

use crate::avl_tree::{BalancedTree, InsertOutcome};
use crate::bucket::Bucket;
use crate::fixed_hash_table::FixedHashTable;
use core::fmt;
use std::io::BufRead;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Person {
    pub first_name: String,
    pub last_name: String,
    pub number: String,
}

/// Why a single input line was not a record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("expected two single-quoted fields, found {0}")]
    MissingField(usize),

    #[error("name is empty")]
    EmptyName,

    #[error("name {0:?} has no last name")]
    MissingLastName(String),

    #[error("number is empty")]
    EmptyNumber,
}

#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("failed to read directory input")]
    Io(#[from] std::io::Error),

    #[error("line {line}: {source}")]
    Parse {
        line: usize,
        #[source]
        source: ParseError,
    },
}

impl Person {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            number: number.into(),
        }
    }

    /// Parses `'First Last', 'number'`. The first word of the name is the
    /// first name and everything after it is the last name, so
    /// `'Mary Ann Lee'` has last name `Ann Lee`. Text outside the quotes
    /// is ignored.
    pub fn parse(line: &str) -> Result<Self, ParseError> {
        let fields: Vec<&str> = line.split('\'').collect();
        if fields.len() < 5 {
            return Err(ParseError::MissingField(fields.len().saturating_sub(1) / 2));
        }

        let name = fields[1].trim();
        if name.is_empty() {
            return Err(ParseError::EmptyName);
        }
        let (first, last) = name
            .split_once(char::is_whitespace)
            .map(|(f, l)| (f, l.trim()))
            .filter(|(_, l)| !l.is_empty())
            .ok_or_else(|| ParseError::MissingLastName(name.to_string()))?;

        let number = fields[3].trim();
        if number.is_empty() {
            return Err(ParseError::EmptyNumber);
        }
        Ok(Self::new(first, last, number))
    }
}

impl fmt::Display for Person {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} : {}", self.first_name, self.last_name, self.number)
    }
}

type NumberTree = BalancedTree<String, Person>;
type LastNameTable = FixedHashTable<NumberTree>;

/// Counts from [`PhoneDirectory::load`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub inserted: usize,
    /// Lines whose number was already stored under the same names.
    pub duplicates: usize,
}

pub struct PhoneDirectory {
    table: FixedHashTable<LastNameTable>,
}

/// First-name count a default directory is sized for.
pub const DEFAULT_FIRST_NAMES: usize = 11;

impl PhoneDirectory {
    /// Directory whose first-name level is sized for `expected_first_names`.
    /// Last-name tables use the default table size.
    pub fn new(expected_first_names: usize) -> Self {
        Self {
            table: FixedHashTable::new(expected_first_names),
        }
    }

    pub fn len(&self) -> usize {
        self.table.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&mut self, person: Person) -> InsertOutcome<Person> {
        self.table
            .retrieve(&person.first_name)
            .retrieve(&person.last_name)
            .insert(person.number.clone(), person)
    }

    pub fn find(&self, first_name: &str, last_name: &str, number: &str) -> Option<&Person> {
        self.table.get(first_name).get(last_name).search(number)
    }

    pub fn remove(&mut self, first_name: &str, last_name: &str, number: &str) -> Option<Person> {
        self.table
            .retrieve(first_name)
            .retrieve(last_name)
            .remove(number)
            .map(|(_, person)| person)
    }

    /// Removes everyone named `first_name last_name`. Only the tree those
    /// names route to is visited.
    pub fn remove_name(&mut self, first_name: &str, last_name: &str) -> usize {
        let removed = self
            .table
            .retrieve(first_name)
            .retrieve(last_name)
            .remove_matching(|_, p| p.first_name == first_name && p.last_name == last_name);
        tracing::trace!(first_name, last_name, removed, "remove_name");
        removed
    }

    /// Everyone with `first_name`, from the one last-name table it routes
    /// to, in bucket order and by number within a bucket.
    pub fn with_first_name(&self, first_name: &str) -> Vec<&Person> {
        self.table
            .get(first_name)
            .buckets()
            .flat_map(|tree| tree.iter().map(|(_, p)| p))
            .filter(|p| p.first_name == first_name)
            .collect()
    }

    /// Everyone, in table order.
    pub fn iter(&self) -> impl Iterator<Item = &Person> + '_ {
        self.table
            .buckets()
            .flat_map(|names| names.buckets())
            .flat_map(|tree| tree.iter().map(|(_, p)| p))
    }

    /// Reads one record per non-blank line. Duplicates are counted, not
    /// failed; the first malformed line aborts the load with its 1-based
    /// line number, leaving earlier lines inserted.
    pub fn load<R: BufRead>(&mut self, reader: R) -> Result<LoadSummary, DirectoryError> {
        let mut summary = LoadSummary::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let person = Person::parse(&line)
                .map_err(|source| DirectoryError::Parse { line: i + 1, source })?;
            match self.insert(person) {
                InsertOutcome::Inserted => summary.inserted += 1,
                InsertOutcome::AlreadyPresent(_) => summary.duplicates += 1,
            }
        }
        tracing::debug!(
            inserted = summary.inserted,
            duplicates = summary.duplicates,
            "directory loaded"
        );
        Ok(summary)
    }

    /// Listing of everyone, in table order.
    pub fn report(&self) -> Listing<'_> {
        Listing(self.iter().collect())
    }

    /// Listing of everyone with `first_name`.
    pub fn first_name_report(&self, first_name: &str) -> Listing<'_> {
        Listing(self.with_first_name(first_name))
    }
}

impl Default for PhoneDirectory {
    fn default() -> Self {
        Self::new(DEFAULT_FIRST_NAMES)
    }
}

impl Extend<Person> for PhoneDirectory {
    /// Duplicates are dropped.
    fn extend<I: IntoIterator<Item = Person>>(&mut self, iter: I) {
        for person in iter {
            let _ = self.insert(person);
        }
    }
}

impl fmt::Debug for PhoneDirectory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// `Display` adapter rendering people as `First Last : number`, separated
/// by ` || `.
#[derive(Debug, Clone)]
pub struct Listing<'a>(Vec<&'a Person>);

impl<'a> Listing<'a> {
    pub fn people(&self) -> &[&'a Person] {
        &self.0
    }
}

impl fmt::Display for Listing<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, person) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(" || ")?;
            }
            write!(f, "{person}")?;
        }
        Ok(())
    }
}
