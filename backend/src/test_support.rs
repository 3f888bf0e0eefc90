//! Test utilities shared by unit tests (in `src/`) and integration tests (in
//! `tests/`). Compiled for tests and behind the `test-support` feature.

use std::sync::Mutex;

use chrono::{DateTime, Local, TimeDelta, Utc};
use hmac::Mac;
use mockable::Clock;

use crate::domain::launch::{data_check_string, derive_secret};

pub use crate::inbound::http::launch::LAUNCH_HEADER;

/// Build a URL-encoded launch payload signed for `bot_token`.
///
/// # Examples
///
/// ```rust
/// use companion::domain::LaunchVerifier;
/// use companion::test_support::signed_launch_payload;
///
/// let raw = signed_launch_payload("1:abc", &[("user", r#"{"id":7,"first_name":"Ada"}"#)]);
/// let verifier = LaunchVerifier::new("1:abc", false).expect("verifier");
/// assert!(verifier.verify(&raw).is_ok());
/// ```
pub fn signed_launch_payload(bot_token: &str, fields: &[(&str, &str)]) -> String {
    let mut owned: Vec<(String, String)> = fields
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect();
    let secret = match derive_secret(bot_token) {
        Ok(secret) => secret,
        Err(error) => panic!("secret derivation failed: {error}"),
    };
    let mut mac = match hmac::Hmac::<sha2::Sha256>::new_from_slice(&secret) {
        Ok(mac) => mac,
        Err(error) => panic!("hmac rejected key: {error}"),
    };
    mac.update(data_check_string(&mut owned).as_bytes());
    let hash = hex::encode(mac.finalize().into_bytes());

    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in fields {
        serializer.append_pair(key, value);
    }
    serializer.append_pair("hash", &hash);
    serializer.finish()
}

/// Launch payload for a platform user with the given id and first name.
pub fn launch_payload_for(bot_token: &str, platform_id: i64, first_name: &str) -> String {
    let user = serde_json::json!({ "id": platform_id, "first_name": first_name }).to_string();
    signed_launch_payload(bot_token, &[("auth_date", "1700000000"), ("user", &user)])
}

/// Clock whose time only moves when told to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        self.0
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub mod cap_fs {
    //! Capability-scoped file helpers for record store tests.

    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Write `contents` to `relative` under `root`, creating parent
    /// directories.
    pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> io::Result<()> {
        let dir = Dir::open_ambient_dir(root, ambient_authority())?;
        match Path::new(relative).parent() {
            Some(parent) if !parent.as_os_str().is_empty() => dir.create_dir_all(parent)?,
            _ => {}
        }
        dir.write(relative, contents)
    }

    pub fn read_file_to_string(root: &Path, relative: &str) -> io::Result<String> {
        Dir::open_ambient_dir(root, ambient_authority())?.read_to_string(relative)
    }

    pub fn path_exists(root: &Path, relative: &str) -> bool {
        Dir::open_ambient_dir(root, ambient_authority())
            .map(|dir| dir.exists(relative))
            .unwrap_or(false)
    }
}
