//! In-process session tokens.
//!
//! A session is an opaque 8-character token mapped to the user who logged in. Sessions live only
//! in this process: restarting the server logs everyone out.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use rand::prelude::RngExt;
use rand::rng;
use tracing::{debug, trace};

use crate::types::UserId;

/// Length of a session token.
pub const TOKEN_LENGTH: usize = 8;

const TOKEN_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// Largest multiple of the alphabet size that fits in a byte; bytes at or above it are rejected
// so every symbol is equally likely.
const REJECTION_BOUND: u8 = 252;

#[derive(Debug, Clone, Copy)]
struct Session {
    user_id: UserId,
    expires_at: Instant,
}

/// Token to user-id map behind a single mutex.
///
/// Reads and writes take the same exclusive lock. Expired tokens are evicted when they are
/// looked up, and swept whenever a new session is created.
#[derive(Debug)]
pub struct SessionStore {
    ttl: Duration,
    sessions: Mutex<HashMap<String, Session>>,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Start a session for `user_id` and return its token.
    pub fn create(&self, user_id: UserId) -> String {
        let now = Instant::now();
        let mut sessions = self.sessions();
        sessions.retain(|_, session| session.expires_at > now);

        let token = loop {
            let candidate = generate_token();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
            trace!("Session token collision, regenerating");
        };

        sessions.insert(
            token.clone(),
            Session {
                user_id,
                expires_at: now + self.ttl,
            },
        );
        debug!(user_id, active = sessions.len(), "Created session");
        token
    }

    /// The user a live token belongs to. Unknown and expired tokens yield `None`.
    pub fn lookup(&self, token: &str) -> Option<UserId> {
        let mut sessions = self.sessions();
        let session = *sessions.get(token)?;

        if session.expires_at <= Instant::now() {
            sessions.remove(token);
            debug!(user_id = session.user_id, "Evicted expired session");
            return None;
        }
        Some(session.user_id)
    }

    pub fn len(&self) -> usize {
        self.sessions().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // A panic while holding the lock cannot leave the map half-written, so poisoning is ignored.
    fn sessions(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Whether `token` has the shape of a session token.
pub fn is_well_formed(token: &str) -> bool {
    token.len() == TOKEN_LENGTH && token.bytes().all(|b| TOKEN_ALPHABET.contains(&b))
}

fn generate_token() -> String {
    let mut token = String::with_capacity(TOKEN_LENGTH);
    let mut bytes = [0u8; TOKEN_LENGTH * 2];

    while token.len() < TOKEN_LENGTH {
        rng().fill(&mut bytes);
        for b in bytes.iter().filter(|b| **b < REJECTION_BOUND) {
            if token.len() == TOKEN_LENGTH {
                break;
            }
            token.push(TOKEN_ALPHABET[usize::from(*b) % TOKEN_ALPHABET.len()] as char);
        }
    }
    token
}
