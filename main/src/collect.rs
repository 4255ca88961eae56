// Copyright 2023-2024, Offchain Labs, Inc.
// For licensing, see https://github.com/OffchainLabs/sol-deploy/blob/main/licenses/COPYRIGHT.md

//! State machine for gathering constructor arguments before a deployment.

use crate::abi::{
    coerce_strict, validate_as, CoerceError, CoercedArgument, ConstructorSchema, Validation,
};
use std::fmt;
use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CollectState {
    Closed,
    Collecting,
    Submitting,
    Confirmed,
    Cancelled,
}

impl fmt::Display for CollectState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Closed => "closed",
            Self::Collecting => "collecting",
            Self::Submitting => "submitting",
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Raw text entered so far, index-aligned with the schema.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ArgumentDraft {
    pub values: Vec<String>,
    pub touched: Vec<bool>,
}

impl ArgumentDraft {
    fn sized(len: usize) -> Self {
        Self {
            values: vec![String::new(); len],
            touched: vec![false; len],
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub index: usize,
    pub message: String,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "argument {}: {}", self.index + 1, self.message)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CollectError {
    #[error("cannot {action} while {state}")]
    InvalidState { action: &'static str, state: CollectState },
    #[error("no argument at position {index} (constructor takes {len})")]
    OutOfRange { index: usize, len: usize },
    #[error("{} invalid argument(s)", .0.len())]
    Rejected(Vec<FieldError>),
    #[error(transparent)]
    Coerce(#[from] CoerceError),
}

/// Collects one set of constructor arguments for a single compiled contract.
///
/// Each collector is single use: once confirmed or cancelled it stays that way, and a fresh
/// compilation gets a fresh collector.
#[derive(Debug)]
pub struct ArgumentCollector {
    schema: ConstructorSchema,
    state: CollectState,
    draft: ArgumentDraft,
    validations: Vec<Validation>,
}

impl ArgumentCollector {
    pub fn new(schema: ConstructorSchema) -> Self {
        Self {
            schema,
            state: CollectState::Closed,
            draft: ArgumentDraft::default(),
            validations: vec![],
        }
    }

    pub fn state(&self) -> CollectState {
        self.state
    }

    pub fn schema(&self) -> &ConstructorSchema {
        &self.schema
    }

    pub fn draft(&self) -> &ArgumentDraft {
        &self.draft
    }

    /// Starts collecting with an empty draft.
    ///
    /// A constructor without inputs needs no collection, so it confirms immediately and returns
    /// the empty argument list.
    pub fn open(&mut self) -> Result<Option<Vec<CoercedArgument>>, CollectError> {
        self.expect_state(CollectState::Closed, "open")?;
        if self.schema.is_empty() {
            self.state = CollectState::Confirmed;
            return Ok(Some(vec![]));
        }
        self.draft = ArgumentDraft::sized(self.schema.len());
        self.state = CollectState::Collecting;
        self.revalidate();
        Ok(None)
    }

    /// Replaces the text of one field. Every other field keeps its value.
    pub fn set_value(&mut self, index: usize, text: impl Into<String>) -> Result<(), CollectError> {
        self.expect_state(CollectState::Collecting, "edit")?;
        self.check_index(index)?;
        self.draft.values[index] = text.into();
        self.revalidate();
        Ok(())
    }

    /// Marks a field as visited so its errors become visible.
    pub fn touch(&mut self, index: usize) -> Result<(), CollectError> {
        self.expect_state(CollectState::Collecting, "touch")?;
        self.check_index(index)?;
        self.draft.touched[index] = true;
        Ok(())
    }

    /// The validation result of every field, touched or not.
    pub fn validations(&self) -> &[Validation] {
        &self.validations
    }

    /// Errors for fields the user has already visited.
    pub fn visible_errors(&self) -> Vec<FieldError> {
        self.errors(|index| self.draft.touched[index])
    }

    pub fn can_submit(&self) -> bool {
        self.state == CollectState::Collecting && self.validations.iter().all(Validation::is_valid)
    }

    /// Submits the draft.
    ///
    /// All fields become touched. If any is invalid the collector keeps collecting and the errors
    /// are returned. Otherwise the values are strictly coerced; a coercion failure also returns to
    /// collecting so that nothing malformed is ever confirmed.
    pub fn confirm(&mut self) -> Result<Vec<CoercedArgument>, CollectError> {
        self.expect_state(CollectState::Collecting, "confirm")?;
        self.draft.touched.iter_mut().for_each(|t| *t = true);
        self.revalidate();

        let errors = self.errors(|_| true);
        if !errors.is_empty() {
            return Err(CollectError::Rejected(errors));
        }

        self.state = CollectState::Submitting;
        match coerce_strict(&self.schema, &self.draft.values) {
            Ok(args) => {
                self.state = CollectState::Confirmed;
                Ok(args)
            }
            Err(err) => {
                self.state = CollectState::Collecting;
                Err(err.into())
            }
        }
    }

    /// Abandons collection and discards the draft.
    pub fn cancel(&mut self) -> Result<(), CollectError> {
        self.expect_state(CollectState::Collecting, "cancel")?;
        self.draft = ArgumentDraft::default();
        self.validations.clear();
        self.state = CollectState::Cancelled;
        Ok(())
    }

    fn revalidate(&mut self) {
        self.validations = self
            .schema
            .iter()
            .zip(&self.draft.values)
            .map(|(param, value)| validate_as(&param.abi_type(), value))
            .collect();
    }

    fn errors(&self, include: impl Fn(usize) -> bool) -> Vec<FieldError> {
        self.validations
            .iter()
            .enumerate()
            .filter(|(index, _)| include(*index))
            .filter_map(|(index, validation)| {
                validation.reason().map(|reason| FieldError {
                    index,
                    message: reason.to_owned(),
                })
            })
            .collect()
    }

    fn expect_state(&self, want: CollectState, action: &'static str) -> Result<(), CollectError> {
        if self.state != want {
            return Err(CollectError::InvalidState {
                action,
                state: self.state,
            });
        }
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), CollectError> {
        let len = self.schema.len();
        if index >= len {
            return Err(CollectError::OutOfRange { index, len });
        }
        Ok(())
    }
}
