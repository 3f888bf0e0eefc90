//! Driven port supplying candidate public ids.
//!
//! The store checks candidates for collisions; sources only propose.

use std::collections::VecDeque;
use std::sync::Mutex;

use rand::Rng;

use crate::domain::{IdentityValidationError, PUBLIC_ID_MAX, PUBLIC_ID_MIN, PublicId};

#[cfg_attr(test, mockall::automock)]
pub trait PublicIdSource: Send + Sync {
    /// Propose an id. Sources that cannot produce one in range report why.
    fn candidate(&self) -> Result<PublicId, IdentityValidationError>;
}

/// Uniformly random eight-digit ids from the thread-local RNG.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPublicIds;

impl PublicIdSource for RandomPublicIds {
    fn candidate(&self) -> Result<PublicId, IdentityValidationError> {
        PublicId::new(rand::thread_rng().gen_range(PUBLIC_ID_MIN..=PUBLIC_ID_MAX))
    }
}

/// Replays a fixed script of ids, then counts upward from the last one.
#[derive(Debug)]
pub struct ScriptedPublicIds {
    script: Mutex<VecDeque<u32>>,
    next: Mutex<u32>,
}

impl ScriptedPublicIds {
    pub fn new(script: impl IntoIterator<Item = u32>) -> Self {
        let script: VecDeque<u32> = script.into_iter().collect();
        let next = script.back().map_or(PUBLIC_ID_MIN, |last| last + 1);
        Self {
            script: Mutex::new(script),
            next: Mutex::new(next),
        }
    }

    /// Ids counting up from [`PUBLIC_ID_MIN`].
    pub fn sequential() -> Self {
        Self::new([])
    }
}

impl PublicIdSource for ScriptedPublicIds {
    fn candidate(&self) -> Result<PublicId, IdentityValidationError> {
        let scripted = self
            .script
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .pop_front();
        let raw = scripted.unwrap_or_else(|| {
            let mut next = self
                .next
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            let raw = *next;
            *next = if raw >= PUBLIC_ID_MAX { PUBLIC_ID_MIN } else { raw + 1 };
            raw
        });
        PublicId::new(raw)
    }
}
